use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for the matricula_projetos table.
/// At most one row exists per (student_id, projeto_id).
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct MatriculaModel {
    pub matricula_id: i32,
    pub student_id: i32,
    pub projeto_id: i32,
    pub matricula_date: DateTime<Utc>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
