use serde::Deserialize;

use crate::patch::Patch;

/// Request payload for creating a student profile
#[derive(Debug, Clone, Deserialize)]
pub struct EstudanteCreate {
    pub user_id: i32,
    pub full_name: String,
    #[serde(default)]
    pub vinculo: Option<String>,
    #[serde(default)]
    pub curso: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EstudanteUpdate {
    #[serde(default)]
    pub full_name: Patch<String>,
    #[serde(default)]
    pub vinculo: Patch<Option<String>>,
    #[serde(default)]
    pub curso: Patch<Option<String>>,
}
