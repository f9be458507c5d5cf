use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};

use super::{
    models::DisciplinaModel,
    types::{DisciplinaCreate, DisciplinaUpdate},
};
use crate::db::{constraint_error, database_error, like_pattern, memory::MemoryDatabase, UpdateBuilder};
use crate::shared::{AppError, Pagination};

/// Trait for disciplina repository operations
#[async_trait]
pub trait DisciplinaRepository {
    async fn create_disciplina(
        &self,
        disciplina: &DisciplinaCreate,
    ) -> Result<DisciplinaModel, AppError>;
    async fn get_disciplina(&self, disciplina_id: i32)
        -> Result<Option<DisciplinaModel>, AppError>;
    async fn list_disciplinas(&self, pagination: Pagination)
        -> Result<Vec<DisciplinaModel>, AppError>;
    async fn list_by_professor(&self, professor_id: i32)
        -> Result<Vec<DisciplinaModel>, AppError>;
    /// Case-insensitive substring match on `nome_disciplina`
    async fn search_by_name(&self, term: &str) -> Result<Vec<DisciplinaModel>, AppError>;
    async fn update_disciplina(
        &self,
        disciplina_id: i32,
        update: DisciplinaUpdate,
    ) -> Result<DisciplinaModel, AppError>;
    async fn delete_disciplina(&self, disciplina_id: i32) -> Result<(), AppError>;
}

/// In-memory implementation of DisciplinaRepository for development and testing
pub struct InMemoryDisciplinaRepository {
    db: MemoryDatabase,
}

impl InMemoryDisciplinaRepository {
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DisciplinaRepository for InMemoryDisciplinaRepository {
    #[instrument(skip(self, disciplina))]
    async fn create_disciplina(
        &self,
        disciplina: &DisciplinaCreate,
    ) -> Result<DisciplinaModel, AppError> {
        let mut tables = self.db.lock()?;

        if let Some(professor_id) = disciplina.professor_id {
            if !tables.professores.contains(professor_id) {
                return Err(AppError::NotFound("Professor not found".to_string()));
            }
        }

        let disciplina_id = tables.disciplinas.next_id();
        let now = Utc::now();
        let created = tables.disciplinas.insert(
            disciplina_id,
            DisciplinaModel {
                disciplina_id,
                professor_id: disciplina.professor_id,
                nome_disciplina: disciplina.nome_disciplina.clone(),
                description: disciplina.description.clone(),
                created_at: now,
                updated_at: now,
            },
        );

        debug!(disciplina_id, "Disciplina created in memory");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get_disciplina(
        &self,
        disciplina_id: i32,
    ) -> Result<Option<DisciplinaModel>, AppError> {
        Ok(self.db.lock()?.disciplinas.get(disciplina_id))
    }

    #[instrument(skip(self))]
    async fn list_disciplinas(
        &self,
        pagination: Pagination,
    ) -> Result<Vec<DisciplinaModel>, AppError> {
        Ok(self.db.lock()?.disciplinas.page(&pagination))
    }

    #[instrument(skip(self))]
    async fn list_by_professor(
        &self,
        professor_id: i32,
    ) -> Result<Vec<DisciplinaModel>, AppError> {
        Ok(self
            .db
            .lock()?
            .disciplinas
            .filter(|d| d.professor_id == Some(professor_id)))
    }

    #[instrument(skip(self))]
    async fn search_by_name(&self, term: &str) -> Result<Vec<DisciplinaModel>, AppError> {
        let needle = term.to_lowercase();
        Ok(self
            .db
            .lock()?
            .disciplinas
            .filter(|d| d.nome_disciplina.to_lowercase().contains(&needle)))
    }

    #[instrument(skip(self, update))]
    async fn update_disciplina(
        &self,
        disciplina_id: i32,
        update: DisciplinaUpdate,
    ) -> Result<DisciplinaModel, AppError> {
        let mut tables = self.db.lock()?;

        if let Some(Some(professor_id)) = update.professor_id.as_set() {
            if !tables.professores.contains(*professor_id) {
                return Err(AppError::NotFound("Professor not found".to_string()));
            }
        }

        let disciplina = tables
            .disciplinas
            .get_mut(disciplina_id)
            .ok_or_else(|| AppError::NotFound("Disciplina not found".to_string()))?;

        update.professor_id.apply_to(&mut disciplina.professor_id);
        update.nome_disciplina.apply_to(&mut disciplina.nome_disciplina);
        update.description.apply_to(&mut disciplina.description);
        disciplina.updated_at = Utc::now();

        Ok(disciplina.clone())
    }

    #[instrument(skip(self))]
    async fn delete_disciplina(&self, disciplina_id: i32) -> Result<(), AppError> {
        if !self.db.lock()?.delete_disciplina(disciplina_id) {
            warn!(disciplina_id, "Disciplina not found for deletion in memory");
            return Err(AppError::NotFound("Disciplina not found".to_string()));
        }
        Ok(())
    }
}

/// PostgreSQL implementation of disciplina repository
pub struct PostgresDisciplinaRepository {
    pool: PgPool,
}

impl PostgresDisciplinaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DisciplinaRepository for PostgresDisciplinaRepository {
    #[instrument(skip(self, disciplina))]
    async fn create_disciplina(
        &self,
        disciplina: &DisciplinaCreate,
    ) -> Result<DisciplinaModel, AppError> {
        sqlx::query_as::<_, DisciplinaModel>(
            "INSERT INTO disciplinas (professor_id, nome_disciplina, description) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(disciplina.professor_id)
        .bind(&disciplina.nome_disciplina)
        .bind(&disciplina.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "Disciplina already exists", "Professor not found"))
    }

    #[instrument(skip(self))]
    async fn get_disciplina(
        &self,
        disciplina_id: i32,
    ) -> Result<Option<DisciplinaModel>, AppError> {
        sqlx::query_as::<_, DisciplinaModel>(
            "SELECT * FROM disciplinas WHERE disciplina_id = $1",
        )
        .bind(disciplina_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error(e, "Failed to fetch disciplina"))
    }

    #[instrument(skip(self))]
    async fn list_disciplinas(
        &self,
        pagination: Pagination,
    ) -> Result<Vec<DisciplinaModel>, AppError> {
        sqlx::query_as::<_, DisciplinaModel>(
            "SELECT * FROM disciplinas ORDER BY disciplina_id OFFSET $1 LIMIT $2",
        )
        .bind(pagination.skip)
        .bind(pagination.limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error(e, "Failed to list disciplinas"))
    }

    #[instrument(skip(self))]
    async fn list_by_professor(
        &self,
        professor_id: i32,
    ) -> Result<Vec<DisciplinaModel>, AppError> {
        sqlx::query_as::<_, DisciplinaModel>(
            "SELECT * FROM disciplinas WHERE professor_id = $1 ORDER BY disciplina_id",
        )
        .bind(professor_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error(e, "Failed to list disciplinas by professor"))
    }

    #[instrument(skip(self))]
    async fn search_by_name(&self, term: &str) -> Result<Vec<DisciplinaModel>, AppError> {
        sqlx::query_as::<_, DisciplinaModel>(
            "SELECT * FROM disciplinas WHERE nome_disciplina ILIKE $1 ORDER BY disciplina_id",
        )
        .bind(like_pattern(term))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error(e, "Failed to search disciplinas"))
    }

    #[instrument(skip(self, update))]
    async fn update_disciplina(
        &self,
        disciplina_id: i32,
        update: DisciplinaUpdate,
    ) -> Result<DisciplinaModel, AppError> {
        let mut builder = UpdateBuilder::new("disciplinas");
        builder
            .set("professor_id", update.professor_id)
            .set("nome_disciplina", update.nome_disciplina)
            .set("description", update.description);
        let mut query = builder.finish("disciplina_id", disciplina_id);

        query
            .build_query_as::<DisciplinaModel>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "Disciplina already exists", "Professor not found"))?
            .ok_or_else(|| AppError::NotFound("Disciplina not found".to_string()))
    }

    #[instrument(skip(self))]
    async fn delete_disciplina(&self, disciplina_id: i32) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM disciplinas WHERE disciplina_id = $1")
            .bind(disciplina_id)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error(e, "Failed to delete disciplina"))?;

        if result.rows_affected() == 0 {
            warn!(disciplina_id, "Disciplina not found for deletion");
            return Err(AppError::NotFound("Disciplina not found".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed(repo: &InMemoryDisciplinaRepository, nome: &str) -> DisciplinaModel {
        repo.create_disciplina(&DisciplinaCreate {
            professor_id: None,
            nome_disciplina: nome.to_string(),
            description: None,
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_substring() {
        let repo = InMemoryDisciplinaRepository::new(MemoryDatabase::new());
        seed(&repo, "Cálculo I").await;
        seed(&repo, "Álgebra Linear").await;
        seed(&repo, "CÁLCULO II").await;

        let found = repo.search_by_name("cálculo").await.unwrap();
        let names: Vec<_> = found.iter().map(|d| d.nome_disciplina.as_str()).collect();
        assert_eq!(names, vec!["Cálculo I", "CÁLCULO II"]);
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let repo = InMemoryDisciplinaRepository::new(MemoryDatabase::new());
        seed(&repo, "Programação").await;

        assert!(repo.search_by_name("%").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_professor_rejected() {
        let repo = InMemoryDisciplinaRepository::new(MemoryDatabase::new());
        let result = repo
            .create_disciplina(&DisciplinaCreate {
                professor_id: Some(7),
                nome_disciplina: "Física".to_string(),
                description: None,
            })
            .await;
        assert!(matches!(result, Err(AppError::NotFound(msg)) if msg == "Professor not found"));
    }

    #[tokio::test]
    async fn test_update_keeps_unsupplied_fields() {
        let repo = InMemoryDisciplinaRepository::new(MemoryDatabase::new());
        let disciplina = seed(&repo, "Redes").await;

        let updated = repo
            .update_disciplina(
                disciplina.disciplina_id,
                DisciplinaUpdate {
                    description: crate::patch::Patch::Set(Some("Camadas".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.description.as_deref(), Some("Camadas"));
        assert_eq!(updated.nome_disciplina, "Redes");
    }
}
