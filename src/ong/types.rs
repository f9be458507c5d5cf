use serde::Deserialize;

use crate::patch::Patch;

#[derive(Debug, Clone, Deserialize)]
pub struct OngCreate {
    pub ngo_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OngUpdate {
    #[serde(default)]
    pub ngo_name: Patch<String>,
    #[serde(default)]
    pub description: Patch<Option<String>>,
    #[serde(default)]
    pub email: Patch<Option<String>>,
    #[serde(default)]
    pub phone: Patch<Option<String>>,
}
