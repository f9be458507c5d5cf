use chrono::NaiveDate;
use serde::Deserialize;

use crate::patch::Patch;

/// Assignment of a task to a student
#[derive(Debug, Clone, Deserialize)]
pub struct TaskEstudanteCreate {
    pub student_id: i32,
    pub task_id: i32,
    #[serde(default)]
    pub assigned_date: Option<NaiveDate>,
    #[serde(default)]
    pub deadline_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskEstudanteUpdate {
    #[serde(default)]
    pub assigned_date: Patch<Option<NaiveDate>>,
    #[serde(default)]
    pub deadline_date: Patch<Option<NaiveDate>>,
    #[serde(default)]
    pub status: Patch<Option<String>>,
    #[serde(default)]
    pub description: Patch<Option<String>>,
}
