use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for the task_estudantes table.
/// At most one row exists per (student_id, task_id).
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct TaskEstudanteModel {
    pub estud_task_id: i32,
    pub student_id: i32,
    pub task_id: i32,
    pub assigned_date: Option<NaiveDate>,
    pub deadline_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
