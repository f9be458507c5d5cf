use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for the estudantes table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct EstudanteModel {
    pub student_id: i32,
    pub user_id: i32, // unique, one student profile per user
    pub full_name: String,
    pub vinculo: Option<String>,
    pub curso: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
