use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::ProjetoModel,
    repository::ProjetoRepository,
    types::{ProjetoCreate, ProjetoUpdate},
};
use crate::disciplina::repository::DisciplinaRepository;
use crate::ong::repository::OngRepository;
use crate::shared::{require_non_blank, AppError, Pagination};

/// A project may not end before it starts
fn check_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), AppError> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            warn!(%start, %end, "Projeto ends before it starts");
            return Err(AppError::BadRequest(
                "end_date must not be before start_date".to_string(),
            ));
        }
    }
    Ok(())
}

pub struct ProjetoService {
    repository: Arc<dyn ProjetoRepository + Send + Sync>,
    disciplina_repository: Arc<dyn DisciplinaRepository + Send + Sync>,
    ong_repository: Arc<dyn OngRepository + Send + Sync>,
}

impl ProjetoService {
    pub fn new(
        repository: Arc<dyn ProjetoRepository + Send + Sync>,
        disciplina_repository: Arc<dyn DisciplinaRepository + Send + Sync>,
        ong_repository: Arc<dyn OngRepository + Send + Sync>,
    ) -> Self {
        Self {
            repository,
            disciplina_repository,
            ong_repository,
        }
    }

    async fn ensure_references(
        &self,
        disciplina_id: Option<i32>,
        ngo_id: Option<i32>,
    ) -> Result<(), AppError> {
        if let Some(disciplina_id) = disciplina_id {
            if self
                .disciplina_repository
                .get_disciplina(disciplina_id)
                .await?
                .is_none()
            {
                return Err(AppError::NotFound("Disciplina not found".to_string()));
            }
        }
        if let Some(ngo_id) = ngo_id {
            if self.ong_repository.get_ong(ngo_id).await?.is_none() {
                return Err(AppError::NotFound("ONG not found".to_string()));
            }
        }
        Ok(())
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_projeto(&self, request: ProjetoCreate) -> Result<ProjetoModel, AppError> {
        require_non_blank("name", &request.name)?;
        check_dates(request.start_date, request.end_date)?;
        self.ensure_references(request.disciplina_id, request.ngo_id)
            .await?;

        let projeto = self.repository.create_projeto(&request).await?;
        info!(projeto_id = projeto.projeto_id, "Projeto created");
        Ok(projeto)
    }

    pub async fn list_projetos(&self, pagination: Pagination) -> Result<Vec<ProjetoModel>, AppError> {
        self.repository.list_projetos(pagination.validate()?).await
    }

    pub async fn get_projeto(&self, projeto_id: i32) -> Result<ProjetoModel, AppError> {
        self.repository
            .get_projeto(projeto_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Projeto not found".to_string()))
    }

    pub async fn list_by_disciplina(
        &self,
        disciplina_id: i32,
    ) -> Result<Vec<ProjetoModel>, AppError> {
        self.repository.list_by_disciplina(disciplina_id).await
    }

    pub async fn list_by_ong(&self, ngo_id: i32) -> Result<Vec<ProjetoModel>, AppError> {
        self.repository.list_by_ong(ngo_id).await
    }

    /// The date rule is checked against the record as it will look after the update
    #[instrument(skip(self, update))]
    pub async fn update_projeto(
        &self,
        projeto_id: i32,
        update: ProjetoUpdate,
    ) -> Result<ProjetoModel, AppError> {
        let current = self.get_projeto(projeto_id).await?;

        if let Some(name) = update.name.as_set() {
            require_non_blank("name", name)?;
        }
        check_dates(
            *update.start_date.merged(&current.start_date),
            *update.end_date.merged(&current.end_date),
        )?;
        self.ensure_references(
            update.disciplina_id.as_set().copied().flatten(),
            update.ngo_id.as_set().copied().flatten(),
        )
        .await?;

        let projeto = self.repository.update_projeto(projeto_id, update).await?;
        info!(projeto_id, "Projeto updated");
        Ok(projeto)
    }

    #[instrument(skip(self))]
    pub async fn delete_projeto(&self, projeto_id: i32) -> Result<(), AppError> {
        self.repository.delete_projeto(projeto_id).await?;
        info!(projeto_id, "Projeto deleted");
        Ok(())
    }
}
