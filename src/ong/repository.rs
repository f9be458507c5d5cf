use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};

use super::{
    models::OngModel,
    types::{OngCreate, OngUpdate},
};
use crate::db::{database_error, memory::MemoryDatabase, UpdateBuilder};
use crate::shared::{AppError, Pagination};

/// Trait for ONG repository operations
#[async_trait]
pub trait OngRepository {
    async fn create_ong(&self, ong: &OngCreate) -> Result<OngModel, AppError>;
    async fn get_ong(&self, ngo_id: i32) -> Result<Option<OngModel>, AppError>;
    async fn list_ongs(&self, pagination: Pagination) -> Result<Vec<OngModel>, AppError>;
    async fn update_ong(&self, ngo_id: i32, update: OngUpdate) -> Result<OngModel, AppError>;
    /// Sponsored projects survive with their ONG reference cleared
    async fn delete_ong(&self, ngo_id: i32) -> Result<(), AppError>;
}

pub struct InMemoryOngRepository {
    db: MemoryDatabase,
}

impl InMemoryOngRepository {
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OngRepository for InMemoryOngRepository {
    #[instrument(skip(self, ong), fields(ngo_name = %ong.ngo_name))]
    async fn create_ong(&self, ong: &OngCreate) -> Result<OngModel, AppError> {
        let mut tables = self.db.lock()?;
        let ngo_id = tables.ongs.next_id();
        let now = Utc::now();

        let created = tables.ongs.insert(
            ngo_id,
            OngModel {
                ngo_id,
                ngo_name: ong.ngo_name.clone(),
                description: ong.description.clone(),
                email: ong.email.clone(),
                phone: ong.phone.clone(),
                created_at: now,
                updated_at: now,
            },
        );
        debug!(ngo_id, "ONG created in memory");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get_ong(&self, ngo_id: i32) -> Result<Option<OngModel>, AppError> {
        Ok(self.db.lock()?.ongs.get(ngo_id))
    }

    #[instrument(skip(self))]
    async fn list_ongs(&self, pagination: Pagination) -> Result<Vec<OngModel>, AppError> {
        Ok(self.db.lock()?.ongs.page(&pagination))
    }

    #[instrument(skip(self, update))]
    async fn update_ong(&self, ngo_id: i32, update: OngUpdate) -> Result<OngModel, AppError> {
        let mut tables = self.db.lock()?;
        let ong = tables
            .ongs
            .get_mut(ngo_id)
            .ok_or_else(|| AppError::NotFound("ONG not found".to_string()))?;

        update.ngo_name.apply_to(&mut ong.ngo_name);
        update.description.apply_to(&mut ong.description);
        update.email.apply_to(&mut ong.email);
        update.phone.apply_to(&mut ong.phone);
        ong.updated_at = Utc::now();

        Ok(ong.clone())
    }

    #[instrument(skip(self))]
    async fn delete_ong(&self, ngo_id: i32) -> Result<(), AppError> {
        if !self.db.lock()?.delete_ong(ngo_id) {
            warn!(ngo_id, "ONG not found for deletion in memory");
            return Err(AppError::NotFound("ONG not found".to_string()));
        }
        Ok(())
    }
}

pub struct PostgresOngRepository {
    pool: PgPool,
}

impl PostgresOngRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OngRepository for PostgresOngRepository {
    #[instrument(skip(self, ong), fields(ngo_name = %ong.ngo_name))]
    async fn create_ong(&self, ong: &OngCreate) -> Result<OngModel, AppError> {
        sqlx::query_as::<_, OngModel>(
            "INSERT INTO ongs (ngo_name, description, email, phone) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&ong.ngo_name)
        .bind(&ong.description)
        .bind(&ong.email)
        .bind(&ong.phone)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error(e, "Failed to create ONG"))
    }

    #[instrument(skip(self))]
    async fn get_ong(&self, ngo_id: i32) -> Result<Option<OngModel>, AppError> {
        sqlx::query_as::<_, OngModel>("SELECT * FROM ongs WHERE ngo_id = $1")
            .bind(ngo_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error(e, "Failed to fetch ONG"))
    }

    #[instrument(skip(self))]
    async fn list_ongs(&self, pagination: Pagination) -> Result<Vec<OngModel>, AppError> {
        sqlx::query_as::<_, OngModel>("SELECT * FROM ongs ORDER BY ngo_id OFFSET $1 LIMIT $2")
            .bind(pagination.skip)
            .bind(pagination.limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database_error(e, "Failed to list ONGs"))
    }

    #[instrument(skip(self, update))]
    async fn update_ong(&self, ngo_id: i32, update: OngUpdate) -> Result<OngModel, AppError> {
        let mut builder = UpdateBuilder::new("ongs");
        builder
            .set("ngo_name", update.ngo_name)
            .set("description", update.description)
            .set("email", update.email)
            .set("phone", update.phone);
        let mut query = builder.finish("ngo_id", ngo_id);

        query
            .build_query_as::<OngModel>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error(e, "Failed to update ONG"))?
            .ok_or_else(|| AppError::NotFound("ONG not found".to_string()))
    }

    #[instrument(skip(self))]
    async fn delete_ong(&self, ngo_id: i32) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM ongs WHERE ngo_id = $1")
            .bind(ngo_id)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error(e, "Failed to delete ONG"))?;

        if result.rows_affected() == 0 {
            warn!(ngo_id, "ONG not found for deletion");
            return Err(AppError::NotFound("ONG not found".to_string()));
        }
        Ok(())
    }
}
