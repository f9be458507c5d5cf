use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::TaskEstudanteModel,
    repository::TaskEstudanteRepository,
    types::{TaskEstudanteCreate, TaskEstudanteUpdate},
};
use crate::estudante::repository::EstudanteRepository;
use crate::shared::{AppError, Pagination};
use crate::task::repository::TaskRepository;

/// Service for assigning tasks to students
pub struct TaskEstudanteService {
    repository: Arc<dyn TaskEstudanteRepository + Send + Sync>,
    estudante_repository: Arc<dyn EstudanteRepository + Send + Sync>,
    task_repository: Arc<dyn TaskRepository + Send + Sync>,
}

impl TaskEstudanteService {
    pub fn new(
        repository: Arc<dyn TaskEstudanteRepository + Send + Sync>,
        estudante_repository: Arc<dyn EstudanteRepository + Send + Sync>,
        task_repository: Arc<dyn TaskRepository + Send + Sync>,
    ) -> Self {
        Self {
            repository,
            estudante_repository,
            task_repository,
        }
    }

    #[instrument(skip(self, request), fields(student_id = request.student_id, task_id = request.task_id))]
    pub async fn create_task_estudante(
        &self,
        request: TaskEstudanteCreate,
    ) -> Result<TaskEstudanteModel, AppError> {
        if self
            .estudante_repository
            .get_estudante(request.student_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("Student not found".to_string()));
        }
        if self.task_repository.get_task(request.task_id).await?.is_none() {
            return Err(AppError::NotFound("Task not found".to_string()));
        }

        let assignment = self.repository.create_task_estudante(&request).await?;
        info!(
            estud_task_id = assignment.estud_task_id,
            "Task assigned to student"
        );
        Ok(assignment)
    }

    pub async fn list_task_estudantes(
        &self,
        pagination: Pagination,
    ) -> Result<Vec<TaskEstudanteModel>, AppError> {
        self.repository
            .list_task_estudantes(pagination.validate()?)
            .await
    }

    pub async fn get_task_estudante(
        &self,
        estud_task_id: i32,
    ) -> Result<TaskEstudanteModel, AppError> {
        self.repository
            .get_task_estudante(estud_task_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task assignment not found".to_string()))
    }

    pub async fn list_by_student(
        &self,
        student_id: i32,
    ) -> Result<Vec<TaskEstudanteModel>, AppError> {
        self.repository.list_by_student(student_id).await
    }

    pub async fn list_by_task(&self, task_id: i32) -> Result<Vec<TaskEstudanteModel>, AppError> {
        self.repository.list_by_task(task_id).await
    }

    pub async fn list_by_status(&self, status: &str) -> Result<Vec<TaskEstudanteModel>, AppError> {
        self.repository.list_by_status(status).await
    }

    #[instrument(skip(self, update))]
    pub async fn update_task_estudante(
        &self,
        estud_task_id: i32,
        update: TaskEstudanteUpdate,
    ) -> Result<TaskEstudanteModel, AppError> {
        let assignment = self
            .repository
            .update_task_estudante(estud_task_id, update)
            .await?;
        info!(estud_task_id, "Task assignment updated");
        Ok(assignment)
    }

    #[instrument(skip(self))]
    pub async fn delete_task_estudante(&self, estud_task_id: i32) -> Result<(), AppError> {
        self.repository.delete_task_estudante(estud_task_id).await?;
        info!(estud_task_id, "Task assignment deleted");
        Ok(())
    }
}
