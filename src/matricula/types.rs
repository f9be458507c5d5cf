use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::patch::Patch;

/// Enrollment request. `matricula_date` defaults to the time of creation.
#[derive(Debug, Clone, Deserialize)]
pub struct MatriculaCreate {
    pub student_id: i32,
    pub projeto_id: i32,
    #[serde(default)]
    pub matricula_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MatriculaUpdate {
    #[serde(default)]
    pub matricula_date: Patch<DateTime<Utc>>,
    #[serde(default)]
    pub status: Patch<Option<String>>,
}
