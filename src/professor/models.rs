use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for the professores table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ProfessorModel {
    pub professor_id: i32,
    pub user_id: i32, // unique, one professor profile per user
    pub full_name: String,
    pub vinculo: Option<String>,
    pub departamento: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
