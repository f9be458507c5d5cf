use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};

use super::{
    models::TaskEstudanteModel,
    types::{TaskEstudanteCreate, TaskEstudanteUpdate},
};
use crate::db::{constraint_error, database_error, memory::MemoryDatabase, UpdateBuilder};
use crate::shared::{AppError, Pagination};

pub const ALREADY_ASSIGNED: &str = "Student is already assigned to this task";

/// Trait for task assignment repository operations
#[async_trait]
pub trait TaskEstudanteRepository {
    /// Fails with `Conflict` when the student already holds the task
    async fn create_task_estudante(
        &self,
        assignment: &TaskEstudanteCreate,
    ) -> Result<TaskEstudanteModel, AppError>;
    async fn get_task_estudante(
        &self,
        estud_task_id: i32,
    ) -> Result<Option<TaskEstudanteModel>, AppError>;
    async fn list_task_estudantes(
        &self,
        pagination: Pagination,
    ) -> Result<Vec<TaskEstudanteModel>, AppError>;
    async fn list_by_student(&self, student_id: i32)
        -> Result<Vec<TaskEstudanteModel>, AppError>;
    async fn list_by_task(&self, task_id: i32) -> Result<Vec<TaskEstudanteModel>, AppError>;
    async fn list_by_status(&self, status: &str) -> Result<Vec<TaskEstudanteModel>, AppError>;
    async fn update_task_estudante(
        &self,
        estud_task_id: i32,
        update: TaskEstudanteUpdate,
    ) -> Result<TaskEstudanteModel, AppError>;
    async fn delete_task_estudante(&self, estud_task_id: i32) -> Result<(), AppError>;
}

pub struct InMemoryTaskEstudanteRepository {
    db: MemoryDatabase,
}

impl InMemoryTaskEstudanteRepository {
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskEstudanteRepository for InMemoryTaskEstudanteRepository {
    #[instrument(skip(self, assignment), fields(student_id = assignment.student_id, task_id = assignment.task_id))]
    async fn create_task_estudante(
        &self,
        assignment: &TaskEstudanteCreate,
    ) -> Result<TaskEstudanteModel, AppError> {
        let mut tables = self.db.lock()?;

        if !tables.estudantes.contains(assignment.student_id) {
            return Err(AppError::NotFound("Student not found".to_string()));
        }
        if !tables.tasks.contains(assignment.task_id) {
            return Err(AppError::NotFound("Task not found".to_string()));
        }
        if tables.task_estudantes.any(|t| {
            t.student_id == assignment.student_id && t.task_id == assignment.task_id
        }) {
            warn!("Duplicate task assignment rejected");
            return Err(AppError::Conflict(ALREADY_ASSIGNED.to_string()));
        }

        let estud_task_id = tables.task_estudantes.next_id();
        let now = Utc::now();
        let created = tables.task_estudantes.insert(
            estud_task_id,
            TaskEstudanteModel {
                estud_task_id,
                student_id: assignment.student_id,
                task_id: assignment.task_id,
                assigned_date: assignment.assigned_date,
                deadline_date: assignment.deadline_date,
                status: assignment.status.clone(),
                description: assignment.description.clone(),
                created_at: now,
                updated_at: now,
            },
        );

        debug!(estud_task_id, "Task assignment created in memory");
        Ok(created)
    }

    async fn get_task_estudante(
        &self,
        estud_task_id: i32,
    ) -> Result<Option<TaskEstudanteModel>, AppError> {
        Ok(self.db.lock()?.task_estudantes.get(estud_task_id))
    }

    async fn list_task_estudantes(
        &self,
        pagination: Pagination,
    ) -> Result<Vec<TaskEstudanteModel>, AppError> {
        Ok(self.db.lock()?.task_estudantes.page(&pagination))
    }

    async fn list_by_student(
        &self,
        student_id: i32,
    ) -> Result<Vec<TaskEstudanteModel>, AppError> {
        Ok(self
            .db
            .lock()?
            .task_estudantes
            .filter(|t| t.student_id == student_id))
    }

    async fn list_by_task(&self, task_id: i32) -> Result<Vec<TaskEstudanteModel>, AppError> {
        Ok(self.db.lock()?.task_estudantes.filter(|t| t.task_id == task_id))
    }

    async fn list_by_status(&self, status: &str) -> Result<Vec<TaskEstudanteModel>, AppError> {
        Ok(self
            .db
            .lock()?
            .task_estudantes
            .filter(|t| t.status.as_deref() == Some(status)))
    }

    #[instrument(skip(self, update))]
    async fn update_task_estudante(
        &self,
        estud_task_id: i32,
        update: TaskEstudanteUpdate,
    ) -> Result<TaskEstudanteModel, AppError> {
        let mut tables = self.db.lock()?;
        let assignment = tables
            .task_estudantes
            .get_mut(estud_task_id)
            .ok_or_else(|| AppError::NotFound("Task assignment not found".to_string()))?;

        update.assigned_date.apply_to(&mut assignment.assigned_date);
        update.deadline_date.apply_to(&mut assignment.deadline_date);
        update.status.apply_to(&mut assignment.status);
        update.description.apply_to(&mut assignment.description);
        assignment.updated_at = Utc::now();

        Ok(assignment.clone())
    }

    #[instrument(skip(self))]
    async fn delete_task_estudante(&self, estud_task_id: i32) -> Result<(), AppError> {
        if self
            .db
            .lock()?
            .task_estudantes
            .remove(estud_task_id)
            .is_none()
        {
            warn!(estud_task_id, "Task assignment not found for deletion in memory");
            return Err(AppError::NotFound("Task assignment not found".to_string()));
        }
        Ok(())
    }
}

fn assignment_constraint_error(error: sqlx::Error) -> AppError {
    let missing = match &error {
        sqlx::Error::Database(db_error)
            if db_error.constraint() == Some("task_estudantes_student_id_fkey") =>
        {
            "Student not found"
        }
        _ => "Task not found",
    };
    constraint_error(error, ALREADY_ASSIGNED, missing)
}

pub struct PostgresTaskEstudanteRepository {
    pool: PgPool,
}

impl PostgresTaskEstudanteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskEstudanteRepository for PostgresTaskEstudanteRepository {
    #[instrument(skip(self, assignment), fields(student_id = assignment.student_id, task_id = assignment.task_id))]
    async fn create_task_estudante(
        &self,
        assignment: &TaskEstudanteCreate,
    ) -> Result<TaskEstudanteModel, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| database_error(e, "Failed to begin assignment transaction"))?;

        let inserted = sqlx::query_as::<_, TaskEstudanteModel>(
            "INSERT INTO task_estudantes \
             (student_id, task_id, assigned_date, deadline_date, status, description) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(assignment.student_id)
        .bind(assignment.task_id)
        .bind(assignment.assigned_date)
        .bind(assignment.deadline_date)
        .bind(&assignment.status)
        .bind(&assignment.description)
        .fetch_one(&mut *tx)
        .await;

        match inserted {
            Ok(created) => {
                tx.commit()
                    .await
                    .map_err(|e| database_error(e, "Failed to commit assignment"))?;
                Ok(created)
            }
            Err(e) => {
                tx.rollback()
                    .await
                    .map_err(|e| database_error(e, "Failed to roll back assignment"))?;
                info!("Assignment transaction rolled back");
                Err(assignment_constraint_error(e))
            }
        }
    }

    async fn get_task_estudante(
        &self,
        estud_task_id: i32,
    ) -> Result<Option<TaskEstudanteModel>, AppError> {
        sqlx::query_as::<_, TaskEstudanteModel>(
            "SELECT * FROM task_estudantes WHERE estud_task_id = $1",
        )
        .bind(estud_task_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error(e, "Failed to fetch task assignment"))
    }

    async fn list_task_estudantes(
        &self,
        pagination: Pagination,
    ) -> Result<Vec<TaskEstudanteModel>, AppError> {
        sqlx::query_as::<_, TaskEstudanteModel>(
            "SELECT * FROM task_estudantes ORDER BY estud_task_id OFFSET $1 LIMIT $2",
        )
        .bind(pagination.skip)
        .bind(pagination.limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error(e, "Failed to list task assignments"))
    }

    async fn list_by_student(
        &self,
        student_id: i32,
    ) -> Result<Vec<TaskEstudanteModel>, AppError> {
        sqlx::query_as::<_, TaskEstudanteModel>(
            "SELECT * FROM task_estudantes WHERE student_id = $1 ORDER BY estud_task_id",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error(e, "Failed to list assignments by student"))
    }

    async fn list_by_task(&self, task_id: i32) -> Result<Vec<TaskEstudanteModel>, AppError> {
        sqlx::query_as::<_, TaskEstudanteModel>(
            "SELECT * FROM task_estudantes WHERE task_id = $1 ORDER BY estud_task_id",
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error(e, "Failed to list assignments by task"))
    }

    async fn list_by_status(&self, status: &str) -> Result<Vec<TaskEstudanteModel>, AppError> {
        sqlx::query_as::<_, TaskEstudanteModel>(
            "SELECT * FROM task_estudantes WHERE status = $1 ORDER BY estud_task_id",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error(e, "Failed to list assignments by status"))
    }

    #[instrument(skip(self, update))]
    async fn update_task_estudante(
        &self,
        estud_task_id: i32,
        update: TaskEstudanteUpdate,
    ) -> Result<TaskEstudanteModel, AppError> {
        let mut builder = UpdateBuilder::new("task_estudantes");
        builder
            .set("assigned_date", update.assigned_date)
            .set("deadline_date", update.deadline_date)
            .set("status", update.status)
            .set("description", update.description);
        let mut query = builder.finish("estud_task_id", estud_task_id);

        query
            .build_query_as::<TaskEstudanteModel>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error(e, "Failed to update task assignment"))?
            .ok_or_else(|| AppError::NotFound("Task assignment not found".to_string()))
    }

    #[instrument(skip(self))]
    async fn delete_task_estudante(&self, estud_task_id: i32) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM task_estudantes WHERE estud_task_id = $1")
            .bind(estud_task_id)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error(e, "Failed to delete task assignment"))?;

        if result.rows_affected() == 0 {
            warn!(estud_task_id, "Task assignment not found for deletion");
            return Err(AppError::NotFound("Task assignment not found".to_string()));
        }
        Ok(())
    }
}
