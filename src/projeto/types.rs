use chrono::NaiveDate;
use serde::Deserialize;

use crate::patch::Patch;

/// Dates are calendar dates (`YYYY-MM-DD`)
#[derive(Debug, Clone, Deserialize)]
pub struct ProjetoCreate {
    #[serde(default)]
    pub disciplina_id: Option<i32>,
    #[serde(default)]
    pub ngo_id: Option<i32>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjetoUpdate {
    #[serde(default)]
    pub disciplina_id: Patch<Option<i32>>,
    #[serde(default)]
    pub ngo_id: Patch<Option<i32>>,
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub description: Patch<Option<String>>,
    #[serde(default)]
    pub start_date: Patch<Option<NaiveDate>>,
    #[serde(default)]
    pub end_date: Patch<Option<NaiveDate>>,
    #[serde(default)]
    pub status: Patch<Option<String>>,
}
