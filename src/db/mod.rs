use sqlx::postgres::PgPoolOptions;
use sqlx::{Encode, PgPool, Postgres, QueryBuilder, Type};
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::patch::Patch;
use crate::shared::AppError;

pub mod memory;

/// Owns the PostgreSQL connection pool and runs migrations
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL with the given configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {e}")))?;

        info!(
            max_connections = config.max_connections,
            "Connected to PostgreSQL"
        );
        Ok(Self { pool })
    }

    /// Create a `Database` from an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run all pending migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {e}")))?;
        info!("Database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Logs and wraps a driver error
pub fn database_error(error: sqlx::Error, context: &str) -> AppError {
    warn!(error = %error, "{}", context);
    AppError::DatabaseError(error.to_string())
}

/// Maps constraint violations raised by an INSERT or UPDATE.
///
/// Unique violations become `Conflict(conflict)`, foreign key violations become
/// `NotFound(missing)`, anything else is a database error.
pub fn constraint_error(error: sqlx::Error, conflict: &str, missing: &str) -> AppError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            warn!(constraint = ?db_error.constraint(), "Unique constraint violated");
            return AppError::Conflict(conflict.to_string());
        }
        if db_error.is_foreign_key_violation() {
            warn!(constraint = ?db_error.constraint(), "Foreign key constraint violated");
            return AppError::NotFound(missing.to_string());
        }
    }
    database_error(error, "Constraint-checked statement failed")
}

/// Escapes LIKE metacharacters and wraps the term for a substring match
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Builds `UPDATE <table> SET ... WHERE <id> = $n RETURNING *` assigning only
/// the fields present in the partial payload. `updated_at` is always refreshed,
/// so the SET list is never empty.
pub struct UpdateBuilder<'a> {
    builder: QueryBuilder<'a, Postgres>,
}

impl<'a> UpdateBuilder<'a> {
    pub fn new(table: &str) -> Self {
        Self {
            builder: QueryBuilder::new(format!("UPDATE {} SET updated_at = NOW()", table)),
        }
    }

    pub fn set<T>(&mut self, column: &str, patch: Patch<T>) -> &mut Self
    where
        T: 'a + Encode<'a, Postgres> + Type<Postgres> + Send,
    {
        if let Patch::Set(value) = patch {
            self.builder.push(format!(", {} = ", column));
            self.builder.push_bind(value);
        }
        self
    }

    pub fn finish(mut self, id_column: &str, id: i32) -> QueryBuilder<'a, Postgres> {
        self.builder.push(format!(" WHERE {} = ", id_column));
        self.builder.push_bind(id);
        self.builder.push(" RETURNING *");
        self.builder
    }
}
