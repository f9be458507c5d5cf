use axum::Router;
use std::collections::HashMap;
use tower_http::normalize_path::NormalizePath;

use voluntariamente::{
    auth::{password::PasswordHasher, token::TokenConfig},
    create_app, AppState,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const TEST_PASSWORD: &str = "senha-segura";

pub struct TestSetup {
    pub router: NormalizePath<Router>,
    /// Bearer tokens by username
    pub tokens: HashMap<String, String>,
    /// User ids by username
    pub user_ids: HashMap<String, i64>,
}

pub struct TestSetupBuilder {
    users: Vec<(String, String)>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self { users: vec![] }
    }

    pub fn with_user(mut self, username: &str, role: &str) -> Self {
        self.users.push((username.to_string(), role.to_string()));
        self
    }

    pub fn with_student(self, username: &str) -> Self {
        self.with_user(username, "Estudante")
    }

    pub fn with_admin(self, username: &str) -> Self {
        self.with_user(username, "Admin")
    }

    /// Registers every user through `/auth/register` and logs each one in
    pub async fn build(self) -> TestSetup {
        let state = AppState::in_memory(
            TokenConfig::new("integration-secret".to_string(), 30),
            PasswordHasher::new(4),
        );
        let mut setup = TestSetup {
            router: create_app(state),
            tokens: HashMap::new(),
            user_ids: HashMap::new(),
        };

        for (username, role) in self.users {
            let user_id = setup.register(&username, &role).await;
            let token = setup.login(&username, TEST_PASSWORD).await;
            setup.user_ids.insert(username.clone(), user_id);
            setup.tokens.insert(username, token);
        }

        setup
    }
}

impl TestSetup {
    pub fn token(&self, username: &str) -> &str {
        self.tokens
            .get(username)
            .map(String::as_str)
            .unwrap_or_else(|| panic!("user {} was not registered", username))
    }

    pub fn user_id(&self, username: &str) -> i64 {
        self.user_ids[username]
    }
}
