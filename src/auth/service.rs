use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{password::PasswordHasher, token::TokenConfig, types::TokenResponse};
use crate::shared::AppError;
use crate::user::{models::UserModel, repository::UserRepository};

const INVALID_CREDENTIALS: &str = "Incorrect username or password";

/// Issues bearer tokens for valid credentials and resolves tokens back to users
pub struct AuthService {
    repository: Arc<dyn UserRepository + Send + Sync>,
    token_config: TokenConfig,
    password_hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(
        repository: Arc<dyn UserRepository + Send + Sync>,
        token_config: TokenConfig,
        password_hasher: PasswordHasher,
    ) -> Self {
        Self {
            repository,
            token_config,
            password_hasher,
        }
    }

    #[instrument(skip(self, password))]
    pub async fn issue_token(
        &self,
        username: &str,
        password: &str,
    ) -> Result<TokenResponse, AppError> {
        let user = match self.repository.get_user_by_username(username).await? {
            Some(user) => user,
            None => {
                warn!(username = %username, "Login attempt for unknown user");
                return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
        };

        if !self.password_hasher.verify(password, &user.password).await? {
            warn!(username = %username, "Login attempt with wrong password");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.token_config.create_token(&user.username)?;
        info!(user_id = user.user_id, "Access token issued");

        Ok(TokenResponse::bearer(token))
    }

    /// Validates the token and loads the user named by its subject
    #[instrument(skip(self, token))]
    pub async fn validate_token(&self, token: &str) -> Result<UserModel, AppError> {
        let claims = self.token_config.validate_token(token)?;

        if claims.sub.is_empty() {
            warn!("Token without subject claim");
            return Err(AppError::Unauthorized(
                "Could not validate credentials".to_string(),
            ));
        }

        match self.repository.get_user_by_username(&claims.sub).await? {
            Some(user) => {
                debug!(user_id = user.user_id, "Token resolved to user");
                Ok(user)
            }
            None => {
                warn!(username = %claims.sub, "Token subject no longer exists");
                Err(AppError::Unauthorized(
                    "Could not validate credentials".to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::{seed_user, test_state};
    use crate::user::models::Role;

    fn service(state: &crate::shared::AppState) -> AuthService {
        AuthService::new(
            Arc::clone(&state.user_repository),
            state.token_config.clone(),
            state.password_hasher,
        )
    }

    #[tokio::test]
    async fn test_issue_token_for_valid_credentials() {
        let state = test_state();
        seed_user(&state, "maria", Role::Estudante).await;

        let response = service(&state).issue_token("maria", "password").await.unwrap();

        assert_eq!(response.token_type, "bearer");
        let claims = state
            .token_config
            .validate_token(&response.access_token)
            .unwrap();
        assert_eq!(claims.sub, "maria");
    }

    #[tokio::test]
    async fn test_issue_token_rejects_wrong_password() {
        let state = test_state();
        seed_user(&state, "maria", Role::Estudante).await;

        let result = service(&state).issue_token("maria", "wrong").await;
        assert!(matches!(result, Err(AppError::Unauthorized(msg)) if msg == INVALID_CREDENTIALS));
    }

    #[tokio::test]
    async fn test_issue_token_rejects_unknown_user() {
        let state = test_state();
        let result = service(&state).issue_token("ghost", "password").await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_validate_token_returns_user() {
        let state = test_state();
        let (user_id, token) = seed_user(&state, "maria", Role::Admin).await;

        let user = service(&state).validate_token(&token).await.unwrap();
        assert_eq!(user.user_id, user_id);
        assert!(user.is_admin());
    }

    #[tokio::test]
    async fn test_validate_token_for_deleted_user() {
        let state = test_state();
        let (user_id, token) = seed_user(&state, "maria", Role::Estudante).await;
        state.user_repository.delete_user(user_id).await.unwrap();

        let result = service(&state).validate_token(&token).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_validate_garbage_token() {
        let state = test_state();
        let result = service(&state).validate_token("not-a-token").await;
        assert!(matches!(result, Err(AppError::JwtError(_))));
    }
}
