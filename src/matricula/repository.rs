use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};

use super::{
    models::MatriculaModel,
    types::{MatriculaCreate, MatriculaUpdate},
};
use crate::db::{constraint_error, database_error, memory::MemoryDatabase, UpdateBuilder};
use crate::shared::{AppError, Pagination};

pub const ALREADY_ENROLLED: &str = "Student is already enrolled in this project";

/// Trait for enrollment repository operations
#[async_trait]
pub trait MatriculaRepository {
    /// Fails with `Conflict` when the student is already enrolled in the project
    async fn create_matricula(
        &self,
        matricula: &MatriculaCreate,
    ) -> Result<MatriculaModel, AppError>;
    async fn get_matricula(&self, matricula_id: i32) -> Result<Option<MatriculaModel>, AppError>;
    async fn list_matriculas(&self, pagination: Pagination)
        -> Result<Vec<MatriculaModel>, AppError>;
    async fn list_by_student(&self, student_id: i32) -> Result<Vec<MatriculaModel>, AppError>;
    async fn list_by_projeto(&self, projeto_id: i32) -> Result<Vec<MatriculaModel>, AppError>;
    async fn update_matricula(
        &self,
        matricula_id: i32,
        update: MatriculaUpdate,
    ) -> Result<MatriculaModel, AppError>;
    async fn delete_matricula(&self, matricula_id: i32) -> Result<(), AppError>;
}

/// In-memory implementation of MatriculaRepository.
///
/// The existence checks and the uniqueness check run under the same lock as the
/// insert, so two concurrent enrollments of the same pair cannot both succeed.
pub struct InMemoryMatriculaRepository {
    db: MemoryDatabase,
}

impl InMemoryMatriculaRepository {
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MatriculaRepository for InMemoryMatriculaRepository {
    #[instrument(skip(self, matricula), fields(student_id = matricula.student_id, projeto_id = matricula.projeto_id))]
    async fn create_matricula(
        &self,
        matricula: &MatriculaCreate,
    ) -> Result<MatriculaModel, AppError> {
        let mut tables = self.db.lock()?;

        if !tables.estudantes.contains(matricula.student_id) {
            return Err(AppError::NotFound("Student not found".to_string()));
        }
        if !tables.projetos.contains(matricula.projeto_id) {
            return Err(AppError::NotFound("Project not found".to_string()));
        }
        if tables.matriculas.any(|m| {
            m.student_id == matricula.student_id && m.projeto_id == matricula.projeto_id
        }) {
            warn!("Duplicate enrollment rejected");
            return Err(AppError::Conflict(ALREADY_ENROLLED.to_string()));
        }

        let matricula_id = tables.matriculas.next_id();
        let now = Utc::now();
        let created = tables.matriculas.insert(
            matricula_id,
            MatriculaModel {
                matricula_id,
                student_id: matricula.student_id,
                projeto_id: matricula.projeto_id,
                matricula_date: matricula.matricula_date.unwrap_or(now),
                status: matricula.status.clone(),
                created_at: now,
                updated_at: now,
            },
        );

        debug!(matricula_id, "Matricula created in memory");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get_matricula(&self, matricula_id: i32) -> Result<Option<MatriculaModel>, AppError> {
        Ok(self.db.lock()?.matriculas.get(matricula_id))
    }

    #[instrument(skip(self))]
    async fn list_matriculas(
        &self,
        pagination: Pagination,
    ) -> Result<Vec<MatriculaModel>, AppError> {
        Ok(self.db.lock()?.matriculas.page(&pagination))
    }

    #[instrument(skip(self))]
    async fn list_by_student(&self, student_id: i32) -> Result<Vec<MatriculaModel>, AppError> {
        Ok(self
            .db
            .lock()?
            .matriculas
            .filter(|m| m.student_id == student_id))
    }

    #[instrument(skip(self))]
    async fn list_by_projeto(&self, projeto_id: i32) -> Result<Vec<MatriculaModel>, AppError> {
        Ok(self
            .db
            .lock()?
            .matriculas
            .filter(|m| m.projeto_id == projeto_id))
    }

    #[instrument(skip(self, update))]
    async fn update_matricula(
        &self,
        matricula_id: i32,
        update: MatriculaUpdate,
    ) -> Result<MatriculaModel, AppError> {
        let mut tables = self.db.lock()?;
        let matricula = tables
            .matriculas
            .get_mut(matricula_id)
            .ok_or_else(|| AppError::NotFound("Matricula not found".to_string()))?;

        update.matricula_date.apply_to(&mut matricula.matricula_date);
        update.status.apply_to(&mut matricula.status);
        matricula.updated_at = Utc::now();

        Ok(matricula.clone())
    }

    #[instrument(skip(self))]
    async fn delete_matricula(&self, matricula_id: i32) -> Result<(), AppError> {
        if self.db.lock()?.matriculas.remove(matricula_id).is_none() {
            warn!(matricula_id, "Matricula not found for deletion in memory");
            return Err(AppError::NotFound("Matricula not found".to_string()));
        }
        Ok(())
    }
}

fn matricula_constraint_error(error: sqlx::Error) -> AppError {
    let missing = match &error {
        sqlx::Error::Database(db_error)
            if db_error.constraint() == Some("matricula_projetos_student_id_fkey") =>
        {
            "Student not found"
        }
        _ => "Project not found",
    };
    constraint_error(error, ALREADY_ENROLLED, missing)
}

/// PostgreSQL implementation of enrollment repository
pub struct PostgresMatriculaRepository {
    pool: PgPool,
}

impl PostgresMatriculaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MatriculaRepository for PostgresMatriculaRepository {
    /// Inserts inside a transaction. A unique violation on (student_id, projeto_id)
    /// rolls it back and surfaces as `Conflict`.
    #[instrument(skip(self, matricula), fields(student_id = matricula.student_id, projeto_id = matricula.projeto_id))]
    async fn create_matricula(
        &self,
        matricula: &MatriculaCreate,
    ) -> Result<MatriculaModel, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| database_error(e, "Failed to begin enrollment transaction"))?;

        let inserted = sqlx::query_as::<_, MatriculaModel>(
            "INSERT INTO matricula_projetos (student_id, projeto_id, matricula_date, status) \
             VALUES ($1, $2, COALESCE($3, NOW()), $4) RETURNING *",
        )
        .bind(matricula.student_id)
        .bind(matricula.projeto_id)
        .bind(matricula.matricula_date)
        .bind(&matricula.status)
        .fetch_one(&mut *tx)
        .await;

        match inserted {
            Ok(created) => {
                tx.commit()
                    .await
                    .map_err(|e| database_error(e, "Failed to commit enrollment"))?;
                debug!(matricula_id = created.matricula_id, "Matricula created in database");
                Ok(created)
            }
            Err(e) => {
                tx.rollback()
                    .await
                    .map_err(|e| database_error(e, "Failed to roll back enrollment"))?;
                info!("Enrollment transaction rolled back");
                Err(matricula_constraint_error(e))
            }
        }
    }

    #[instrument(skip(self))]
    async fn get_matricula(&self, matricula_id: i32) -> Result<Option<MatriculaModel>, AppError> {
        sqlx::query_as::<_, MatriculaModel>(
            "SELECT * FROM matricula_projetos WHERE matricula_id = $1",
        )
        .bind(matricula_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error(e, "Failed to fetch matricula"))
    }

    #[instrument(skip(self))]
    async fn list_matriculas(
        &self,
        pagination: Pagination,
    ) -> Result<Vec<MatriculaModel>, AppError> {
        sqlx::query_as::<_, MatriculaModel>(
            "SELECT * FROM matricula_projetos ORDER BY matricula_id OFFSET $1 LIMIT $2",
        )
        .bind(pagination.skip)
        .bind(pagination.limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error(e, "Failed to list matriculas"))
    }

    #[instrument(skip(self))]
    async fn list_by_student(&self, student_id: i32) -> Result<Vec<MatriculaModel>, AppError> {
        sqlx::query_as::<_, MatriculaModel>(
            "SELECT * FROM matricula_projetos WHERE student_id = $1 ORDER BY matricula_id",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error(e, "Failed to list matriculas by student"))
    }

    #[instrument(skip(self))]
    async fn list_by_projeto(&self, projeto_id: i32) -> Result<Vec<MatriculaModel>, AppError> {
        sqlx::query_as::<_, MatriculaModel>(
            "SELECT * FROM matricula_projetos WHERE projeto_id = $1 ORDER BY matricula_id",
        )
        .bind(projeto_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error(e, "Failed to list matriculas by projeto"))
    }

    #[instrument(skip(self, update))]
    async fn update_matricula(
        &self,
        matricula_id: i32,
        update: MatriculaUpdate,
    ) -> Result<MatriculaModel, AppError> {
        let mut builder = UpdateBuilder::new("matricula_projetos");
        builder
            .set("matricula_date", update.matricula_date)
            .set("status", update.status);
        let mut query = builder.finish("matricula_id", matricula_id);

        query
            .build_query_as::<MatriculaModel>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error(e, "Failed to update matricula"))?
            .ok_or_else(|| AppError::NotFound("Matricula not found".to_string()))
    }

    #[instrument(skip(self))]
    async fn delete_matricula(&self, matricula_id: i32) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM matricula_projetos WHERE matricula_id = $1")
            .bind(matricula_id)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error(e, "Failed to delete matricula"))?;

        if result.rows_affected() == 0 {
            warn!(matricula_id, "Matricula not found for deletion");
            return Err(AppError::NotFound("Matricula not found".to_string()));
        }
        Ok(())
    }
}
