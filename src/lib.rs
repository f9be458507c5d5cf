// Library crate for the Voluntariamente API
// This file exposes the public API for the binary and the integration tests

pub mod auth;
pub mod config;
pub mod db;
pub mod disciplina;
pub mod estudante;
pub mod extract;
pub mod matricula;
pub mod ong;
pub mod patch;
pub mod professor;
pub mod projeto;
pub mod routes;
pub mod shared;
pub mod task;
pub mod task_estudante;
pub mod user;

// Re-export commonly used types for easier access in tests
pub use config::AppConfig;
pub use routes::{create_app, create_router, normalize_paths};
pub use shared::{AppError, AppState};
