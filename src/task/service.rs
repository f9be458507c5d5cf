use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::TaskModel,
    repository::TaskRepository,
    types::{TaskCreate, TaskUpdate},
};
use crate::projeto::repository::ProjetoRepository;
use crate::shared::{require_non_blank, AppError, Pagination};

pub struct TaskService {
    repository: Arc<dyn TaskRepository + Send + Sync>,
    projeto_repository: Arc<dyn ProjetoRepository + Send + Sync>,
}

impl TaskService {
    pub fn new(
        repository: Arc<dyn TaskRepository + Send + Sync>,
        projeto_repository: Arc<dyn ProjetoRepository + Send + Sync>,
    ) -> Self {
        Self {
            repository,
            projeto_repository,
        }
    }

    #[instrument(skip(self, request), fields(projeto_id = request.projeto_id))]
    pub async fn create_task(&self, request: TaskCreate) -> Result<TaskModel, AppError> {
        require_non_blank("name", &request.name)?;
        if self
            .projeto_repository
            .get_projeto(request.projeto_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("Project not found".to_string()));
        }

        let task = self.repository.create_task(&request).await?;
        info!(task_id = task.task_id, "Task created");
        Ok(task)
    }

    pub async fn list_tasks(&self, pagination: Pagination) -> Result<Vec<TaskModel>, AppError> {
        self.repository.list_tasks(pagination.validate()?).await
    }

    pub async fn get_task(&self, task_id: i32) -> Result<TaskModel, AppError> {
        self.repository
            .get_task(task_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".to_string()))
    }

    pub async fn list_by_projeto(&self, projeto_id: i32) -> Result<Vec<TaskModel>, AppError> {
        self.repository.list_by_projeto(projeto_id).await
    }

    pub async fn list_by_status(&self, status: &str) -> Result<Vec<TaskModel>, AppError> {
        self.repository.list_by_status(status).await
    }

    #[instrument(skip(self, update))]
    pub async fn update_task(&self, task_id: i32, update: TaskUpdate) -> Result<TaskModel, AppError> {
        if let Some(name) = update.name.as_set() {
            require_non_blank("name", name)?;
        }

        let task = self.repository.update_task(task_id, update).await?;
        info!(task_id, "Task updated");
        Ok(task)
    }

    #[instrument(skip(self))]
    pub async fn delete_task(&self, task_id: i32) -> Result<(), AppError> {
        self.repository.delete_task(task_id).await?;
        info!(task_id, "Task deleted");
        Ok(())
    }
}
