// Public API - what other modules can use
pub use handlers::{
    create_task, delete_task, get_task, list_tasks, list_tasks_by_projeto, list_tasks_by_status,
    update_task,
};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
