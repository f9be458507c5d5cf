use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for the disciplinas table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct DisciplinaModel {
    pub disciplina_id: i32,
    pub professor_id: Option<i32>, // cleared when the professor is deleted
    pub nome_disciplina: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
