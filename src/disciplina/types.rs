use serde::Deserialize;

use crate::patch::Patch;

#[derive(Debug, Clone, Deserialize)]
pub struct DisciplinaCreate {
    #[serde(default)]
    pub professor_id: Option<i32>,
    pub nome_disciplina: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// `"professor_id": null` detaches the course from its professor
#[derive(Debug, Default, Deserialize)]
pub struct DisciplinaUpdate {
    #[serde(default)]
    pub professor_id: Patch<Option<i32>>,
    #[serde(default)]
    pub nome_disciplina: Patch<String>,
    #[serde(default)]
    pub description: Patch<Option<String>>,
}
