// Public API - what other modules can use
pub use handlers::{
    create_projeto, delete_projeto, get_projeto, list_projetos, list_projetos_by_disciplina,
    list_projetos_by_ong, update_projeto,
};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
