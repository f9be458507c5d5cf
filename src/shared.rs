use axum::{
    extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::{password::PasswordHasher, token::TokenConfig};
use crate::db::{memory::MemoryDatabase, Database};
use crate::disciplina::repository::{
    DisciplinaRepository, InMemoryDisciplinaRepository, PostgresDisciplinaRepository,
};
use crate::estudante::repository::{
    EstudanteRepository, InMemoryEstudanteRepository, PostgresEstudanteRepository,
};
use crate::matricula::repository::{
    InMemoryMatriculaRepository, MatriculaRepository, PostgresMatriculaRepository,
};
use crate::ong::repository::{InMemoryOngRepository, OngRepository, PostgresOngRepository};
use crate::professor::repository::{
    InMemoryProfessorRepository, PostgresProfessorRepository, ProfessorRepository,
};
use crate::projeto::repository::{
    InMemoryProjetoRepository, PostgresProjetoRepository, ProjetoRepository,
};
use crate::task::repository::{InMemoryTaskRepository, PostgresTaskRepository, TaskRepository};
use crate::task_estudante::repository::{
    InMemoryTaskEstudanteRepository, PostgresTaskEstudanteRepository, TaskEstudanteRepository,
};
use crate::user::repository::{InMemoryUserRepository, PostgresUserRepository, UserRepository};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub professor_repository: Arc<dyn ProfessorRepository + Send + Sync>,
    pub estudante_repository: Arc<dyn EstudanteRepository + Send + Sync>,
    pub ong_repository: Arc<dyn OngRepository + Send + Sync>,
    pub disciplina_repository: Arc<dyn DisciplinaRepository + Send + Sync>,
    pub projeto_repository: Arc<dyn ProjetoRepository + Send + Sync>,
    pub task_repository: Arc<dyn TaskRepository + Send + Sync>,
    pub matricula_repository: Arc<dyn MatriculaRepository + Send + Sync>,
    pub task_estudante_repository: Arc<dyn TaskEstudanteRepository + Send + Sync>,
    pub token_config: TokenConfig,
    pub password_hasher: PasswordHasher,
}

impl AppState {
    /// Builds state backed by a single in-memory database shared by every repository,
    /// so cascades and unique constraints behave like the relational schema.
    pub fn in_memory(token_config: TokenConfig, password_hasher: PasswordHasher) -> Self {
        let db = MemoryDatabase::new();

        Self {
            user_repository: Arc::new(InMemoryUserRepository::new(db.clone())),
            professor_repository: Arc::new(InMemoryProfessorRepository::new(db.clone())),
            estudante_repository: Arc::new(InMemoryEstudanteRepository::new(db.clone())),
            ong_repository: Arc::new(InMemoryOngRepository::new(db.clone())),
            disciplina_repository: Arc::new(InMemoryDisciplinaRepository::new(db.clone())),
            projeto_repository: Arc::new(InMemoryProjetoRepository::new(db.clone())),
            task_repository: Arc::new(InMemoryTaskRepository::new(db.clone())),
            matricula_repository: Arc::new(InMemoryMatriculaRepository::new(db.clone())),
            task_estudante_repository: Arc::new(InMemoryTaskEstudanteRepository::new(db)),
            token_config,
            password_hasher,
        }
    }

    /// Builds state backed by PostgreSQL
    pub fn postgres(
        database: &Database,
        token_config: TokenConfig,
        password_hasher: PasswordHasher,
    ) -> Self {
        let pool = database.pool().clone();

        Self {
            user_repository: Arc::new(PostgresUserRepository::new(pool.clone())),
            professor_repository: Arc::new(PostgresProfessorRepository::new(pool.clone())),
            estudante_repository: Arc::new(PostgresEstudanteRepository::new(pool.clone())),
            ong_repository: Arc::new(PostgresOngRepository::new(pool.clone())),
            disciplina_repository: Arc::new(PostgresDisciplinaRepository::new(pool.clone())),
            projeto_repository: Arc::new(PostgresProjetoRepository::new(pool.clone())),
            task_repository: Arc::new(PostgresTaskRepository::new(pool.clone())),
            matricula_repository: Arc::new(PostgresMatriculaRepository::new(pool.clone())),
            task_estudante_repository: Arc::new(PostgresTaskEstudanteRepository::new(pool)),
            token_config,
            password_hasher,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Request could not be extracted; keeps the extractor's status (400, 415 or 422)
    #[error("Invalid request: {message}")]
    InvalidRequest { status: StatusCode, message: String },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::JwtError(_) => (
                StatusCode::UNAUTHORIZED,
                "Could not validate credentials".to_string(),
            ),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::InvalidRequest { status, message } => (status, message),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConfigError(_) | AppError::Io(_) | AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let mut response = (status, Json(json!({ "error": error_message }))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                axum::http::header::WWW_AUTHENTICATE,
                axum::http::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}

macro_rules! impl_from_rejection {
    ($($rejection:ty),*) => {
        $(
            impl From<$rejection> for AppError {
                fn from(rejection: $rejection) -> Self {
                    AppError::InvalidRequest {
                        status: rejection.status(),
                        message: rejection.body_text(),
                    }
                }
            }
        )*
    };
}

impl_from_rejection!(JsonRejection, FormRejection, PathRejection, QueryRejection);

fn default_limit() -> i64 {
    100
}

/// `skip`/`limit` query parameters accepted by every list endpoint
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}

impl Pagination {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }

    /// Rejects negative offsets and limits. There is no upper bound on `limit`.
    pub fn validate(self) -> Result<Self, AppError> {
        if self.skip < 0 || self.limit < 0 {
            return Err(AppError::BadRequest(
                "skip and limit must be non-negative".to_string(),
            ));
        }
        Ok(self)
    }

    /// Applies the page to an iterator already ordered by primary key
    pub fn apply<T>(&self, rows: impl Iterator<Item = T>) -> Vec<T> {
        rows.skip(self.skip.max(0) as usize)
            .take(self.limit.max(0) as usize)
            .collect()
    }
}

/// Rejects blank values for required text fields
pub fn require_non_blank(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Accepts `local@domain` with a dot somewhere in the domain
pub fn require_email(value: &str) -> Result<(), AppError> {
    let valid = match value.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(AppError::BadRequest(format!(
            "'{}' is not a valid email address",
            value
        )));
    }
    Ok(())
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::user::{models::Role, service::UserService, types::UserCreate};

    pub const TEST_SECRET: &str = "test-secret-key";

    /// In-memory state with a fixed signing key and the cheapest bcrypt cost
    pub fn test_state() -> AppState {
        AppState::in_memory(
            TokenConfig::new(TEST_SECRET.to_string(), 30),
            PasswordHasher::new(4),
        )
    }

    /// Registers a user and returns its id together with a valid bearer token
    pub async fn seed_user(state: &AppState, username: &str, role: Role) -> (i32, String) {
        let service = UserService::new(
            Arc::clone(&state.user_repository),
            state.password_hasher,
        );
        let user = service
            .create_user(UserCreate {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password: "password".to_string(),
                role,
            })
            .await
            .unwrap();
        let token = state.token_config.create_token(&user.username).unwrap();
        (user.user_id, token)
    }

    pub fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }

    /// Sends one JSON request through the full router and decodes the response body
    pub async fn send(
        state: &AppState,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        use axum::body::{to_bytes, Body};
        use axum::http::Request;
        use tower::ServiceExt; // for `oneshot`

        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", bearer(token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = crate::routes::create_app(state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}
