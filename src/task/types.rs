use serde::Deserialize;

use crate::patch::Patch;

#[derive(Debug, Clone, Deserialize)]
pub struct TaskCreate {
    pub projeto_id: i32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub task_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A task cannot move to another project
#[derive(Debug, Default, Deserialize)]
pub struct TaskUpdate {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub description: Patch<Option<String>>,
    #[serde(default, rename = "type")]
    pub task_type: Patch<Option<String>>,
    #[serde(default)]
    pub status: Patch<Option<String>>,
}
