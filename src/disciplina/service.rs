use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::DisciplinaModel,
    repository::DisciplinaRepository,
    types::{DisciplinaCreate, DisciplinaUpdate},
};
use crate::professor::repository::ProfessorRepository;
use crate::shared::{require_non_blank, AppError, Pagination};

/// Service for courses. Any authenticated user may change them; handlers enforce that.
pub struct DisciplinaService {
    repository: Arc<dyn DisciplinaRepository + Send + Sync>,
    professor_repository: Arc<dyn ProfessorRepository + Send + Sync>,
}

impl DisciplinaService {
    pub fn new(
        repository: Arc<dyn DisciplinaRepository + Send + Sync>,
        professor_repository: Arc<dyn ProfessorRepository + Send + Sync>,
    ) -> Self {
        Self {
            repository,
            professor_repository,
        }
    }

    async fn ensure_professor_exists(&self, professor_id: i32) -> Result<(), AppError> {
        match self.professor_repository.get_professor(professor_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound("Professor not found".to_string())),
        }
    }

    #[instrument(skip(self, request))]
    pub async fn create_disciplina(
        &self,
        request: DisciplinaCreate,
    ) -> Result<DisciplinaModel, AppError> {
        require_non_blank("nome_disciplina", &request.nome_disciplina)?;
        if let Some(professor_id) = request.professor_id {
            self.ensure_professor_exists(professor_id).await?;
        }

        let disciplina = self.repository.create_disciplina(&request).await?;
        info!(
            disciplina_id = disciplina.disciplina_id,
            nome = %disciplina.nome_disciplina,
            "Disciplina created"
        );
        Ok(disciplina)
    }

    pub async fn list_disciplinas(
        &self,
        pagination: Pagination,
    ) -> Result<Vec<DisciplinaModel>, AppError> {
        self.repository
            .list_disciplinas(pagination.validate()?)
            .await
    }

    pub async fn get_disciplina(&self, disciplina_id: i32) -> Result<DisciplinaModel, AppError> {
        self.repository
            .get_disciplina(disciplina_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Disciplina not found".to_string()))
    }

    pub async fn list_by_professor(
        &self,
        professor_id: i32,
    ) -> Result<Vec<DisciplinaModel>, AppError> {
        self.repository.list_by_professor(professor_id).await
    }

    #[instrument(skip(self))]
    pub async fn search(&self, term: &str) -> Result<Vec<DisciplinaModel>, AppError> {
        self.repository.search_by_name(term.trim()).await
    }

    #[instrument(skip(self, update))]
    pub async fn update_disciplina(
        &self,
        disciplina_id: i32,
        update: DisciplinaUpdate,
    ) -> Result<DisciplinaModel, AppError> {
        if let Some(nome) = update.nome_disciplina.as_set() {
            require_non_blank("nome_disciplina", nome)?;
        }
        self.get_disciplina(disciplina_id).await?;
        if let Some(Some(professor_id)) = update.professor_id.as_set() {
            self.ensure_professor_exists(*professor_id).await?;
        }

        let disciplina = self
            .repository
            .update_disciplina(disciplina_id, update)
            .await?;
        info!(disciplina_id, "Disciplina updated");
        Ok(disciplina)
    }

    #[instrument(skip(self))]
    pub async fn delete_disciplina(&self, disciplina_id: i32) -> Result<(), AppError> {
        self.repository.delete_disciplina(disciplina_id).await?;
        info!(disciplina_id, "Disciplina deleted");
        Ok(())
    }
}
