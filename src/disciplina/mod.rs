// Public API - what other modules can use
pub use handlers::{
    create_disciplina, delete_disciplina, get_disciplina, list_disciplinas,
    list_disciplinas_by_professor, search_disciplinas, update_disciplina,
};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
