// Public API - what other modules can use
pub use handlers::{
    create_professor, delete_professor, get_professor, list_professores, update_professor,
};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
