use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};

use super::{
    models::EstudanteModel,
    types::{EstudanteCreate, EstudanteUpdate},
};
use crate::db::{constraint_error, database_error, memory::MemoryDatabase, UpdateBuilder};
use crate::shared::{AppError, Pagination};

const DUPLICATE_PROFILE: &str = "User already has a student profile";

/// Trait for estudante repository operations
#[async_trait]
pub trait EstudanteRepository {
    async fn create_estudante(&self, estudante: &EstudanteCreate)
        -> Result<EstudanteModel, AppError>;
    async fn get_estudante(&self, student_id: i32) -> Result<Option<EstudanteModel>, AppError>;
    async fn get_estudante_by_user(&self, user_id: i32)
        -> Result<Option<EstudanteModel>, AppError>;
    async fn list_estudantes(&self, pagination: Pagination)
        -> Result<Vec<EstudanteModel>, AppError>;
    async fn update_estudante(
        &self,
        student_id: i32,
        update: EstudanteUpdate,
    ) -> Result<EstudanteModel, AppError>;
    /// Cascades to the student's enrollments and task assignments
    async fn delete_estudante(&self, student_id: i32) -> Result<(), AppError>;
}

/// In-memory implementation of EstudanteRepository for development and testing
pub struct InMemoryEstudanteRepository {
    db: MemoryDatabase,
}

impl InMemoryEstudanteRepository {
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EstudanteRepository for InMemoryEstudanteRepository {
    #[instrument(skip(self, estudante), fields(user_id = estudante.user_id))]
    async fn create_estudante(
        &self,
        estudante: &EstudanteCreate,
    ) -> Result<EstudanteModel, AppError> {
        let mut tables = self.db.lock()?;

        if !tables.users.contains(estudante.user_id) {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        if tables.estudantes.any(|p| p.user_id == estudante.user_id) {
            warn!("Estudante profile already exists in memory");
            return Err(AppError::Conflict(DUPLICATE_PROFILE.to_string()));
        }

        let student_id = tables.estudantes.next_id();
        let now = Utc::now();
        let created = tables.estudantes.insert(
            student_id,
            EstudanteModel {
                student_id,
                user_id: estudante.user_id,
                full_name: estudante.full_name.clone(),
                vinculo: estudante.vinculo.clone(),
                curso: estudante.curso.clone(),
                created_at: now,
                updated_at: now,
            },
        );

        debug!(student_id, "Estudante created in memory");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get_estudante(&self, student_id: i32) -> Result<Option<EstudanteModel>, AppError> {
        Ok(self.db.lock()?.estudantes.get(student_id))
    }

    #[instrument(skip(self))]
    async fn get_estudante_by_user(
        &self,
        user_id: i32,
    ) -> Result<Option<EstudanteModel>, AppError> {
        Ok(self.db.lock()?.estudantes.find(|p| p.user_id == user_id))
    }

    #[instrument(skip(self))]
    async fn list_estudantes(
        &self,
        pagination: Pagination,
    ) -> Result<Vec<EstudanteModel>, AppError> {
        Ok(self.db.lock()?.estudantes.page(&pagination))
    }

    #[instrument(skip(self, update))]
    async fn update_estudante(
        &self,
        student_id: i32,
        update: EstudanteUpdate,
    ) -> Result<EstudanteModel, AppError> {
        let mut tables = self.db.lock()?;
        let estudante = tables.estudantes.get_mut(student_id).ok_or_else(|| {
            warn!(student_id, "Estudante not found for update in memory");
            AppError::NotFound("Estudante not found".to_string())
        })?;

        update.full_name.apply_to(&mut estudante.full_name);
        update.vinculo.apply_to(&mut estudante.vinculo);
        update.curso.apply_to(&mut estudante.curso);
        estudante.updated_at = Utc::now();

        Ok(estudante.clone())
    }

    #[instrument(skip(self))]
    async fn delete_estudante(&self, student_id: i32) -> Result<(), AppError> {
        if !self.db.lock()?.delete_estudante(student_id) {
            warn!(student_id, "Estudante not found for deletion in memory");
            return Err(AppError::NotFound("Estudante not found".to_string()));
        }
        Ok(())
    }
}

/// PostgreSQL implementation of estudante repository
pub struct PostgresEstudanteRepository {
    pool: PgPool,
}

impl PostgresEstudanteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EstudanteRepository for PostgresEstudanteRepository {
    #[instrument(skip(self, estudante), fields(user_id = estudante.user_id))]
    async fn create_estudante(
        &self,
        estudante: &EstudanteCreate,
    ) -> Result<EstudanteModel, AppError> {
        let created = sqlx::query_as::<_, EstudanteModel>(
            "INSERT INTO estudantes (user_id, full_name, vinculo, curso) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(estudante.user_id)
        .bind(&estudante.full_name)
        .bind(&estudante.vinculo)
        .bind(&estudante.curso)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_error(e, DUPLICATE_PROFILE, "User not found"))?;

        debug!(student_id = created.student_id, "Estudante created in database");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get_estudante(&self, student_id: i32) -> Result<Option<EstudanteModel>, AppError> {
        sqlx::query_as::<_, EstudanteModel>("SELECT * FROM estudantes WHERE student_id = $1")
            .bind(student_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error(e, "Failed to fetch estudante"))
    }

    #[instrument(skip(self))]
    async fn get_estudante_by_user(
        &self,
        user_id: i32,
    ) -> Result<Option<EstudanteModel>, AppError> {
        sqlx::query_as::<_, EstudanteModel>("SELECT * FROM estudantes WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error(e, "Failed to fetch estudante by user"))
    }

    #[instrument(skip(self))]
    async fn list_estudantes(
        &self,
        pagination: Pagination,
    ) -> Result<Vec<EstudanteModel>, AppError> {
        sqlx::query_as::<_, EstudanteModel>(
            "SELECT * FROM estudantes ORDER BY student_id OFFSET $1 LIMIT $2",
        )
        .bind(pagination.skip)
        .bind(pagination.limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error(e, "Failed to list estudantes"))
    }

    #[instrument(skip(self, update))]
    async fn update_estudante(
        &self,
        student_id: i32,
        update: EstudanteUpdate,
    ) -> Result<EstudanteModel, AppError> {
        let mut builder = UpdateBuilder::new("estudantes");
        builder
            .set("full_name", update.full_name)
            .set("vinculo", update.vinculo)
            .set("curso", update.curso);
        let mut query = builder.finish("student_id", student_id);

        query
            .build_query_as::<EstudanteModel>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error(e, "Failed to update estudante"))?
            .ok_or_else(|| AppError::NotFound("Estudante not found".to_string()))
    }

    #[instrument(skip(self))]
    async fn delete_estudante(&self, student_id: i32) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM estudantes WHERE student_id = $1")
            .bind(student_id)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error(e, "Failed to delete estudante"))?;

        if result.rows_affected() == 0 {
            warn!(student_id, "Estudante not found for deletion");
            return Err(AppError::NotFound("Estudante not found".to_string()));
        }
        Ok(())
    }
}
