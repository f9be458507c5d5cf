// Public API - what other modules can use
pub use handlers::{create_ong, delete_ong, get_ong, list_ongs, update_ong};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
