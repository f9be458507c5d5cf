use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for the ongs table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct OngModel {
    pub ngo_id: i32,
    pub ngo_name: String,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
