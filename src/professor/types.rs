use serde::Deserialize;

use crate::patch::Patch;

/// Request payload for creating a professor profile
#[derive(Debug, Clone, Deserialize)]
pub struct ProfessorCreate {
    pub user_id: i32,
    pub full_name: String,
    #[serde(default)]
    pub vinculo: Option<String>,
    #[serde(default)]
    pub departamento: Option<String>,
}

/// Partial update payload; the owning user cannot be changed
#[derive(Debug, Default, Deserialize)]
pub struct ProfessorUpdate {
    #[serde(default)]
    pub full_name: Patch<String>,
    #[serde(default)]
    pub vinculo: Patch<Option<String>>,
    #[serde(default)]
    pub departamento: Patch<Option<String>>,
}
