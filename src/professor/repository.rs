use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};

use super::{
    models::ProfessorModel,
    types::{ProfessorCreate, ProfessorUpdate},
};
use crate::db::{constraint_error, database_error, memory::MemoryDatabase, UpdateBuilder};
use crate::shared::{AppError, Pagination};

const DUPLICATE_PROFILE: &str = "User already has a professor profile";

/// Trait for professor repository operations
#[async_trait]
pub trait ProfessorRepository {
    async fn create_professor(&self, professor: &ProfessorCreate)
        -> Result<ProfessorModel, AppError>;
    async fn get_professor(&self, professor_id: i32) -> Result<Option<ProfessorModel>, AppError>;
    async fn get_professor_by_user(&self, user_id: i32)
        -> Result<Option<ProfessorModel>, AppError>;
    async fn list_professores(&self, pagination: Pagination)
        -> Result<Vec<ProfessorModel>, AppError>;
    async fn update_professor(
        &self,
        professor_id: i32,
        update: ProfessorUpdate,
    ) -> Result<ProfessorModel, AppError>;
    /// Disciplinas taught by the professor keep existing without one
    async fn delete_professor(&self, professor_id: i32) -> Result<(), AppError>;
}

/// In-memory implementation of ProfessorRepository for development and testing
pub struct InMemoryProfessorRepository {
    db: MemoryDatabase,
}

impl InMemoryProfessorRepository {
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfessorRepository for InMemoryProfessorRepository {
    #[instrument(skip(self, professor), fields(user_id = professor.user_id))]
    async fn create_professor(
        &self,
        professor: &ProfessorCreate,
    ) -> Result<ProfessorModel, AppError> {
        let mut tables = self.db.lock()?;

        if !tables.users.contains(professor.user_id) {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        if tables.professores.any(|p| p.user_id == professor.user_id) {
            warn!("Professor profile already exists in memory");
            return Err(AppError::Conflict(DUPLICATE_PROFILE.to_string()));
        }

        let professor_id = tables.professores.next_id();
        let now = Utc::now();
        let created = tables.professores.insert(
            professor_id,
            ProfessorModel {
                professor_id,
                user_id: professor.user_id,
                full_name: professor.full_name.clone(),
                vinculo: professor.vinculo.clone(),
                departamento: professor.departamento.clone(),
                created_at: now,
                updated_at: now,
            },
        );

        debug!(professor_id, "Professor created in memory");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get_professor(&self, professor_id: i32) -> Result<Option<ProfessorModel>, AppError> {
        Ok(self.db.lock()?.professores.get(professor_id))
    }

    #[instrument(skip(self))]
    async fn get_professor_by_user(
        &self,
        user_id: i32,
    ) -> Result<Option<ProfessorModel>, AppError> {
        Ok(self.db.lock()?.professores.find(|p| p.user_id == user_id))
    }

    #[instrument(skip(self))]
    async fn list_professores(
        &self,
        pagination: Pagination,
    ) -> Result<Vec<ProfessorModel>, AppError> {
        Ok(self.db.lock()?.professores.page(&pagination))
    }

    #[instrument(skip(self, update))]
    async fn update_professor(
        &self,
        professor_id: i32,
        update: ProfessorUpdate,
    ) -> Result<ProfessorModel, AppError> {
        let mut tables = self.db.lock()?;
        let professor = tables.professores.get_mut(professor_id).ok_or_else(|| {
            warn!(professor_id, "Professor not found for update in memory");
            AppError::NotFound("Professor not found".to_string())
        })?;

        update.full_name.apply_to(&mut professor.full_name);
        update.vinculo.apply_to(&mut professor.vinculo);
        update.departamento.apply_to(&mut professor.departamento);
        professor.updated_at = Utc::now();

        Ok(professor.clone())
    }

    #[instrument(skip(self))]
    async fn delete_professor(&self, professor_id: i32) -> Result<(), AppError> {
        if !self.db.lock()?.delete_professor(professor_id) {
            warn!(professor_id, "Professor not found for deletion in memory");
            return Err(AppError::NotFound("Professor not found".to_string()));
        }
        Ok(())
    }
}

/// PostgreSQL implementation of professor repository
pub struct PostgresProfessorRepository {
    pool: PgPool,
}

impl PostgresProfessorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfessorRepository for PostgresProfessorRepository {
    #[instrument(skip(self, professor), fields(user_id = professor.user_id))]
    async fn create_professor(
        &self,
        professor: &ProfessorCreate,
    ) -> Result<ProfessorModel, AppError> {
        let created = sqlx::query_as::<_, ProfessorModel>(
            "INSERT INTO professores (user_id, full_name, vinculo, departamento) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(professor.user_id)
        .bind(&professor.full_name)
        .bind(&professor.vinculo)
        .bind(&professor.departamento)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_error(e, DUPLICATE_PROFILE, "User not found"))?;

        debug!(professor_id = created.professor_id, "Professor created in database");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get_professor(&self, professor_id: i32) -> Result<Option<ProfessorModel>, AppError> {
        sqlx::query_as::<_, ProfessorModel>("SELECT * FROM professores WHERE professor_id = $1")
            .bind(professor_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error(e, "Failed to fetch professor"))
    }

    #[instrument(skip(self))]
    async fn get_professor_by_user(
        &self,
        user_id: i32,
    ) -> Result<Option<ProfessorModel>, AppError> {
        sqlx::query_as::<_, ProfessorModel>("SELECT * FROM professores WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error(e, "Failed to fetch professor by user"))
    }

    #[instrument(skip(self))]
    async fn list_professores(
        &self,
        pagination: Pagination,
    ) -> Result<Vec<ProfessorModel>, AppError> {
        sqlx::query_as::<_, ProfessorModel>(
            "SELECT * FROM professores ORDER BY professor_id OFFSET $1 LIMIT $2",
        )
        .bind(pagination.skip)
        .bind(pagination.limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error(e, "Failed to list professores"))
    }

    #[instrument(skip(self, update))]
    async fn update_professor(
        &self,
        professor_id: i32,
        update: ProfessorUpdate,
    ) -> Result<ProfessorModel, AppError> {
        let mut builder = UpdateBuilder::new("professores");
        builder
            .set("full_name", update.full_name)
            .set("vinculo", update.vinculo)
            .set("departamento", update.departamento);
        let mut query = builder.finish("professor_id", professor_id);

        query
            .build_query_as::<ProfessorModel>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error(e, "Failed to update professor"))?
            .ok_or_else(|| AppError::NotFound("Professor not found".to_string()))
    }

    #[instrument(skip(self))]
    async fn delete_professor(&self, professor_id: i32) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM professores WHERE professor_id = $1")
            .bind(professor_id)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error(e, "Failed to delete professor"))?;

        if result.rows_affected() == 0 {
            warn!(professor_id, "Professor not found for deletion");
            return Err(AppError::NotFound("Professor not found".to_string()));
        }
        Ok(())
    }
}
