use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};

use super::{
    models::TaskModel,
    types::{TaskCreate, TaskUpdate},
};
use crate::db::{constraint_error, database_error, memory::MemoryDatabase, UpdateBuilder};
use crate::shared::{AppError, Pagination};

/// Trait for task repository operations
#[async_trait]
pub trait TaskRepository {
    async fn create_task(&self, task: &TaskCreate) -> Result<TaskModel, AppError>;
    async fn get_task(&self, task_id: i32) -> Result<Option<TaskModel>, AppError>;
    async fn list_tasks(&self, pagination: Pagination) -> Result<Vec<TaskModel>, AppError>;
    async fn list_by_projeto(&self, projeto_id: i32) -> Result<Vec<TaskModel>, AppError>;
    async fn list_by_status(&self, status: &str) -> Result<Vec<TaskModel>, AppError>;
    async fn update_task(&self, task_id: i32, update: TaskUpdate) -> Result<TaskModel, AppError>;
    /// Removes the task's student assignments too
    async fn delete_task(&self, task_id: i32) -> Result<(), AppError>;
}

/// In-memory implementation of TaskRepository for development and testing
pub struct InMemoryTaskRepository {
    db: MemoryDatabase,
}

impl InMemoryTaskRepository {
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    #[instrument(skip(self, task), fields(projeto_id = task.projeto_id))]
    async fn create_task(&self, task: &TaskCreate) -> Result<TaskModel, AppError> {
        let mut tables = self.db.lock()?;
        if !tables.projetos.contains(task.projeto_id) {
            return Err(AppError::NotFound("Project not found".to_string()));
        }

        let task_id = tables.tasks.next_id();
        let now = Utc::now();
        let created = tables.tasks.insert(
            task_id,
            TaskModel {
                task_id,
                projeto_id: task.projeto_id,
                name: task.name.clone(),
                description: task.description.clone(),
                task_type: task.task_type.clone(),
                status: task.status.clone(),
                created_at: now,
                updated_at: now,
            },
        );

        debug!(task_id, "Task created in memory");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get_task(&self, task_id: i32) -> Result<Option<TaskModel>, AppError> {
        Ok(self.db.lock()?.tasks.get(task_id))
    }

    #[instrument(skip(self))]
    async fn list_tasks(&self, pagination: Pagination) -> Result<Vec<TaskModel>, AppError> {
        Ok(self.db.lock()?.tasks.page(&pagination))
    }

    #[instrument(skip(self))]
    async fn list_by_projeto(&self, projeto_id: i32) -> Result<Vec<TaskModel>, AppError> {
        Ok(self.db.lock()?.tasks.filter(|t| t.projeto_id == projeto_id))
    }

    #[instrument(skip(self))]
    async fn list_by_status(&self, status: &str) -> Result<Vec<TaskModel>, AppError> {
        Ok(self
            .db
            .lock()?
            .tasks
            .filter(|t| t.status.as_deref() == Some(status)))
    }

    #[instrument(skip(self, update))]
    async fn update_task(&self, task_id: i32, update: TaskUpdate) -> Result<TaskModel, AppError> {
        let mut tables = self.db.lock()?;
        let task = tables
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

        update.name.apply_to(&mut task.name);
        update.description.apply_to(&mut task.description);
        update.task_type.apply_to(&mut task.task_type);
        update.status.apply_to(&mut task.status);
        task.updated_at = Utc::now();

        Ok(task.clone())
    }

    #[instrument(skip(self))]
    async fn delete_task(&self, task_id: i32) -> Result<(), AppError> {
        if !self.db.lock()?.delete_task(task_id) {
            warn!(task_id, "Task not found for deletion in memory");
            return Err(AppError::NotFound("Task not found".to_string()));
        }
        Ok(())
    }
}

/// PostgreSQL implementation of task repository
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    #[instrument(skip(self, task), fields(projeto_id = task.projeto_id))]
    async fn create_task(&self, task: &TaskCreate) -> Result<TaskModel, AppError> {
        sqlx::query_as::<_, TaskModel>(
            r#"INSERT INTO tasks (projeto_id, name, description, "type", status)
               VALUES ($1, $2, $3, $4, $5) RETURNING *"#,
        )
        .bind(task.projeto_id)
        .bind(&task.name)
        .bind(&task.description)
        .bind(&task.task_type)
        .bind(&task.status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "Task already exists", "Project not found"))
    }

    #[instrument(skip(self))]
    async fn get_task(&self, task_id: i32) -> Result<Option<TaskModel>, AppError> {
        sqlx::query_as::<_, TaskModel>("SELECT * FROM tasks WHERE task_id = $1")
            .bind(task_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error(e, "Failed to fetch task"))
    }

    #[instrument(skip(self))]
    async fn list_tasks(&self, pagination: Pagination) -> Result<Vec<TaskModel>, AppError> {
        sqlx::query_as::<_, TaskModel>("SELECT * FROM tasks ORDER BY task_id OFFSET $1 LIMIT $2")
            .bind(pagination.skip)
            .bind(pagination.limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database_error(e, "Failed to list tasks"))
    }

    #[instrument(skip(self))]
    async fn list_by_projeto(&self, projeto_id: i32) -> Result<Vec<TaskModel>, AppError> {
        sqlx::query_as::<_, TaskModel>(
            "SELECT * FROM tasks WHERE projeto_id = $1 ORDER BY task_id",
        )
        .bind(projeto_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error(e, "Failed to list tasks by projeto"))
    }

    #[instrument(skip(self))]
    async fn list_by_status(&self, status: &str) -> Result<Vec<TaskModel>, AppError> {
        sqlx::query_as::<_, TaskModel>("SELECT * FROM tasks WHERE status = $1 ORDER BY task_id")
            .bind(status)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database_error(e, "Failed to list tasks by status"))
    }

    #[instrument(skip(self, update))]
    async fn update_task(&self, task_id: i32, update: TaskUpdate) -> Result<TaskModel, AppError> {
        let mut builder = UpdateBuilder::new("tasks");
        builder
            .set("name", update.name)
            .set("description", update.description)
            .set(r#""type""#, update.task_type)
            .set("status", update.status);
        let mut query = builder.finish("task_id", task_id);

        query
            .build_query_as::<TaskModel>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error(e, "Failed to update task"))?
            .ok_or_else(|| AppError::NotFound("Task not found".to_string()))
    }

    #[instrument(skip(self))]
    async fn delete_task(&self, task_id: i32) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE task_id = $1")
            .bind(task_id)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error(e, "Failed to delete task"))?;

        if result.rows_affected() == 0 {
            warn!(task_id, "Task not found for deletion");
            return Err(AppError::NotFound("Task not found".to_string()));
        }
        Ok(())
    }
}
