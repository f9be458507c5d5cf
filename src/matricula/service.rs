use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::MatriculaModel,
    repository::MatriculaRepository,
    types::{MatriculaCreate, MatriculaUpdate},
};
use crate::estudante::repository::EstudanteRepository;
use crate::projeto::repository::ProjetoRepository;
use crate::shared::{AppError, Pagination};

/// Service for student enrollments in projects
pub struct MatriculaService {
    repository: Arc<dyn MatriculaRepository + Send + Sync>,
    estudante_repository: Arc<dyn EstudanteRepository + Send + Sync>,
    projeto_repository: Arc<dyn ProjetoRepository + Send + Sync>,
}

impl MatriculaService {
    pub fn new(
        repository: Arc<dyn MatriculaRepository + Send + Sync>,
        estudante_repository: Arc<dyn EstudanteRepository + Send + Sync>,
        projeto_repository: Arc<dyn ProjetoRepository + Send + Sync>,
    ) -> Self {
        Self {
            repository,
            estudante_repository,
            projeto_repository,
        }
    }

    /// Checks both parents, then lets the store's uniqueness rule decide duplicates
    #[instrument(skip(self, request), fields(student_id = request.student_id, projeto_id = request.projeto_id))]
    pub async fn create_matricula(
        &self,
        request: MatriculaCreate,
    ) -> Result<MatriculaModel, AppError> {
        if self
            .estudante_repository
            .get_estudante(request.student_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("Student not found".to_string()));
        }
        if self
            .projeto_repository
            .get_projeto(request.projeto_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("Project not found".to_string()));
        }

        let matricula = self.repository.create_matricula(&request).await?;
        info!(matricula_id = matricula.matricula_id, "Student enrolled in projeto");
        Ok(matricula)
    }

    pub async fn list_matriculas(
        &self,
        pagination: Pagination,
    ) -> Result<Vec<MatriculaModel>, AppError> {
        self.repository
            .list_matriculas(pagination.validate()?)
            .await
    }

    pub async fn get_matricula(&self, matricula_id: i32) -> Result<MatriculaModel, AppError> {
        self.repository
            .get_matricula(matricula_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Matricula not found".to_string()))
    }

    pub async fn list_by_student(&self, student_id: i32) -> Result<Vec<MatriculaModel>, AppError> {
        self.repository.list_by_student(student_id).await
    }

    pub async fn list_by_projeto(&self, projeto_id: i32) -> Result<Vec<MatriculaModel>, AppError> {
        self.repository.list_by_projeto(projeto_id).await
    }

    #[instrument(skip(self, update))]
    pub async fn update_matricula(
        &self,
        matricula_id: i32,
        update: MatriculaUpdate,
    ) -> Result<MatriculaModel, AppError> {
        let matricula = self.repository.update_matricula(matricula_id, update).await?;
        info!(matricula_id, "Matricula updated");
        Ok(matricula)
    }

    #[instrument(skip(self))]
    pub async fn delete_matricula(&self, matricula_id: i32) -> Result<(), AppError> {
        self.repository.delete_matricula(matricula_id).await?;
        info!(matricula_id, "Matricula deleted");
        Ok(())
    }
}
