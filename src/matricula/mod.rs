// Public API - what other modules can use
pub use handlers::{
    create_matricula, delete_matricula, get_matricula, list_matriculas,
    list_matriculas_by_projeto, list_matriculas_by_student, update_matricula,
};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
