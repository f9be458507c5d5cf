// Public API - what other modules can use
pub use handlers::{
    create_estudante, delete_estudante, get_estudante, list_estudantes, update_estudante,
};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
