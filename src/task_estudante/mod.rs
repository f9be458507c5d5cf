// Public API - what other modules can use
pub use handlers::{
    create_task_estudante, delete_task_estudante, get_task_estudante, list_task_estudantes,
    list_task_estudantes_by_status, list_task_estudantes_by_student, list_task_estudantes_by_task,
    update_task_estudante,
};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
