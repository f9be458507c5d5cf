use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};

use super::{
    models::ProjetoModel,
    types::{ProjetoCreate, ProjetoUpdate},
};
use crate::db::{constraint_error, database_error, memory::MemoryDatabase, memory::Tables, UpdateBuilder};
use crate::shared::{AppError, Pagination};

/// Trait for projeto repository operations
#[async_trait]
pub trait ProjetoRepository {
    async fn create_projeto(&self, projeto: &ProjetoCreate) -> Result<ProjetoModel, AppError>;
    async fn get_projeto(&self, projeto_id: i32) -> Result<Option<ProjetoModel>, AppError>;
    async fn list_projetos(&self, pagination: Pagination) -> Result<Vec<ProjetoModel>, AppError>;
    async fn list_by_disciplina(&self, disciplina_id: i32)
        -> Result<Vec<ProjetoModel>, AppError>;
    async fn list_by_ong(&self, ngo_id: i32) -> Result<Vec<ProjetoModel>, AppError>;
    async fn update_projeto(
        &self,
        projeto_id: i32,
        update: ProjetoUpdate,
    ) -> Result<ProjetoModel, AppError>;
    /// Removes the project's tasks (with their assignments) and enrollments too
    async fn delete_projeto(&self, projeto_id: i32) -> Result<(), AppError>;
}

fn check_references(
    tables: &Tables,
    disciplina_id: Option<i32>,
    ngo_id: Option<i32>,
) -> Result<(), AppError> {
    if let Some(disciplina_id) = disciplina_id {
        if !tables.disciplinas.contains(disciplina_id) {
            return Err(AppError::NotFound("Disciplina not found".to_string()));
        }
    }
    if let Some(ngo_id) = ngo_id {
        if !tables.ongs.contains(ngo_id) {
            return Err(AppError::NotFound("ONG not found".to_string()));
        }
    }
    Ok(())
}

/// In-memory implementation of ProjetoRepository for development and testing
pub struct InMemoryProjetoRepository {
    db: MemoryDatabase,
}

impl InMemoryProjetoRepository {
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProjetoRepository for InMemoryProjetoRepository {
    #[instrument(skip(self, projeto), fields(name = %projeto.name))]
    async fn create_projeto(&self, projeto: &ProjetoCreate) -> Result<ProjetoModel, AppError> {
        let mut tables = self.db.lock()?;
        check_references(&tables, projeto.disciplina_id, projeto.ngo_id)?;

        let projeto_id = tables.projetos.next_id();
        let now = Utc::now();
        let created = tables.projetos.insert(
            projeto_id,
            ProjetoModel {
                projeto_id,
                disciplina_id: projeto.disciplina_id,
                ngo_id: projeto.ngo_id,
                name: projeto.name.clone(),
                description: projeto.description.clone(),
                start_date: projeto.start_date,
                end_date: projeto.end_date,
                status: projeto.status.clone(),
                created_at: now,
                updated_at: now,
            },
        );

        debug!(projeto_id, "Projeto created in memory");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get_projeto(&self, projeto_id: i32) -> Result<Option<ProjetoModel>, AppError> {
        Ok(self.db.lock()?.projetos.get(projeto_id))
    }

    #[instrument(skip(self))]
    async fn list_projetos(&self, pagination: Pagination) -> Result<Vec<ProjetoModel>, AppError> {
        Ok(self.db.lock()?.projetos.page(&pagination))
    }

    #[instrument(skip(self))]
    async fn list_by_disciplina(
        &self,
        disciplina_id: i32,
    ) -> Result<Vec<ProjetoModel>, AppError> {
        Ok(self
            .db
            .lock()?
            .projetos
            .filter(|p| p.disciplina_id == Some(disciplina_id)))
    }

    #[instrument(skip(self))]
    async fn list_by_ong(&self, ngo_id: i32) -> Result<Vec<ProjetoModel>, AppError> {
        Ok(self.db.lock()?.projetos.filter(|p| p.ngo_id == Some(ngo_id)))
    }

    #[instrument(skip(self, update))]
    async fn update_projeto(
        &self,
        projeto_id: i32,
        update: ProjetoUpdate,
    ) -> Result<ProjetoModel, AppError> {
        let mut tables = self.db.lock()?;
        check_references(
            &tables,
            update.disciplina_id.as_set().copied().flatten(),
            update.ngo_id.as_set().copied().flatten(),
        )?;

        let projeto = tables
            .projetos
            .get_mut(projeto_id)
            .ok_or_else(|| AppError::NotFound("Projeto not found".to_string()))?;

        update.disciplina_id.apply_to(&mut projeto.disciplina_id);
        update.ngo_id.apply_to(&mut projeto.ngo_id);
        update.name.apply_to(&mut projeto.name);
        update.description.apply_to(&mut projeto.description);
        update.start_date.apply_to(&mut projeto.start_date);
        update.end_date.apply_to(&mut projeto.end_date);
        update.status.apply_to(&mut projeto.status);
        projeto.updated_at = Utc::now();

        Ok(projeto.clone())
    }

    #[instrument(skip(self))]
    async fn delete_projeto(&self, projeto_id: i32) -> Result<(), AppError> {
        if !self.db.lock()?.delete_projeto(projeto_id) {
            warn!(projeto_id, "Projeto not found for deletion in memory");
            return Err(AppError::NotFound("Projeto not found".to_string()));
        }
        Ok(())
    }
}

/// Names the missing parent when a foreign key check fails
fn projeto_constraint_error(error: sqlx::Error) -> AppError {
    let missing = match &error {
        sqlx::Error::Database(db_error) if db_error.constraint() == Some("projetos_ngo_id_fkey") => {
            "ONG not found"
        }
        _ => "Disciplina not found",
    };
    constraint_error(error, "Projeto already exists", missing)
}

/// PostgreSQL implementation of projeto repository
pub struct PostgresProjetoRepository {
    pool: PgPool,
}

impl PostgresProjetoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjetoRepository for PostgresProjetoRepository {
    #[instrument(skip(self, projeto), fields(name = %projeto.name))]
    async fn create_projeto(&self, projeto: &ProjetoCreate) -> Result<ProjetoModel, AppError> {
        let created = sqlx::query_as::<_, ProjetoModel>(
            "INSERT INTO projetos (disciplina_id, ngo_id, name, description, start_date, end_date, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(projeto.disciplina_id)
        .bind(projeto.ngo_id)
        .bind(&projeto.name)
        .bind(&projeto.description)
        .bind(projeto.start_date)
        .bind(projeto.end_date)
        .bind(&projeto.status)
        .fetch_one(&self.pool)
        .await
        .map_err(projeto_constraint_error)?;

        debug!(projeto_id = created.projeto_id, "Projeto created in database");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get_projeto(&self, projeto_id: i32) -> Result<Option<ProjetoModel>, AppError> {
        sqlx::query_as::<_, ProjetoModel>("SELECT * FROM projetos WHERE projeto_id = $1")
            .bind(projeto_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error(e, "Failed to fetch projeto"))
    }

    #[instrument(skip(self))]
    async fn list_projetos(&self, pagination: Pagination) -> Result<Vec<ProjetoModel>, AppError> {
        sqlx::query_as::<_, ProjetoModel>(
            "SELECT * FROM projetos ORDER BY projeto_id OFFSET $1 LIMIT $2",
        )
        .bind(pagination.skip)
        .bind(pagination.limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error(e, "Failed to list projetos"))
    }

    #[instrument(skip(self))]
    async fn list_by_disciplina(
        &self,
        disciplina_id: i32,
    ) -> Result<Vec<ProjetoModel>, AppError> {
        sqlx::query_as::<_, ProjetoModel>(
            "SELECT * FROM projetos WHERE disciplina_id = $1 ORDER BY projeto_id",
        )
        .bind(disciplina_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error(e, "Failed to list projetos by disciplina"))
    }

    #[instrument(skip(self))]
    async fn list_by_ong(&self, ngo_id: i32) -> Result<Vec<ProjetoModel>, AppError> {
        sqlx::query_as::<_, ProjetoModel>(
            "SELECT * FROM projetos WHERE ngo_id = $1 ORDER BY projeto_id",
        )
        .bind(ngo_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error(e, "Failed to list projetos by ONG"))
    }

    #[instrument(skip(self, update))]
    async fn update_projeto(
        &self,
        projeto_id: i32,
        update: ProjetoUpdate,
    ) -> Result<ProjetoModel, AppError> {
        let mut builder = UpdateBuilder::new("projetos");
        builder
            .set("disciplina_id", update.disciplina_id)
            .set("ngo_id", update.ngo_id)
            .set("name", update.name)
            .set("description", update.description)
            .set("start_date", update.start_date)
            .set("end_date", update.end_date)
            .set("status", update.status);
        let mut query = builder.finish("projeto_id", projeto_id);

        query
            .build_query_as::<ProjetoModel>()
            .fetch_optional(&self.pool)
            .await
            .map_err(projeto_constraint_error)?
            .ok_or_else(|| AppError::NotFound("Projeto not found".to_string()))
    }

    #[instrument(skip(self))]
    async fn delete_projeto(&self, projeto_id: i32) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM projetos WHERE projeto_id = $1")
            .bind(projeto_id)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error(e, "Failed to delete projeto"))?;

        if result.rows_affected() == 0 {
            warn!(projeto_id, "Projeto not found for deletion");
            return Err(AppError::NotFound("Projeto not found".to_string()));
        }

        debug!(projeto_id, "Projeto deleted from database");
        Ok(())
    }
}
