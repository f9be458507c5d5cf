// Public API - what other modules can use
pub use extractor::CurrentUser;
pub use handlers::{login_for_access_token, read_current_user, register};
pub use types::{TokenClaims, TokenResponse};

// Internal modules
mod extractor;
mod handlers;
pub mod password;
pub mod service;
pub mod token;
mod types;
