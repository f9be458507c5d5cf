use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::service::AuthService;
use crate::shared::{AppError, AppState};
use crate::user::models::UserModel;

/// The authenticated principal of a request.
///
/// Extracting it reads `Authorization: Bearer <token>`, validates the token and
/// loads the user. Handlers that take a `CurrentUser` argument are therefore
/// authenticated; every rejection renders as 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserModel);

impl CurrentUser {
    pub fn user_id(&self) -> i32 {
        self.0.user_id
    }

    pub fn is_admin(&self) -> bool {
        self.0.is_admin()
    }

    pub fn ensure_admin(&self, action: &str) -> Result<(), AppError> {
        if self.is_admin() {
            return Ok(());
        }
        warn!(user_id = self.user_id(), action, "Admin-only action denied");
        Err(AppError::Forbidden(format!(
            "Only administrators can {}",
            action
        )))
    }

    /// Passes when the principal is `owner_user_id` or an admin
    pub fn ensure_self_or_admin(&self, owner_user_id: i32, action: &str) -> Result<(), AppError> {
        if self.user_id() == owner_user_id || self.is_admin() {
            return Ok(());
        }
        warn!(
            user_id = self.user_id(),
            owner_user_id, action, "Action on another user's data denied"
        );
        Err(AppError::Forbidden(format!("Not authorized to {}", action)))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    #[instrument(name = "authenticate", skip_all, fields(uri = %parts.uri))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|header| header.to_str().ok())
            .ok_or_else(|| {
                warn!("Missing Authorization header in request");
                AppError::Unauthorized("Not authenticated".to_string())
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            warn!("Invalid Authorization header format (expected Bearer token)");
            AppError::Unauthorized("Invalid authorization header format".to_string())
        })?;

        let service = AuthService::new(
            Arc::clone(&state.user_repository),
            state.token_config.clone(),
            state.password_hasher,
        );
        let user = service.validate_token(token.trim()).await?;

        debug!(user_id = user.user_id, role = %user.role, "Request authenticated");
        Ok(CurrentUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::{bearer, seed_user, test_state};
    use crate::user::models::Role;
    use axum::http::Request;

    async fn extract(state: &AppState, authorization: Option<&str>) -> Result<CurrentUser, AppError> {
        let mut builder = Request::builder().uri("/anything");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        CurrentUser::from_request_parts(&mut parts, state).await
    }

    #[tokio::test]
    async fn test_valid_bearer_token() {
        let state = test_state();
        let (user_id, token) = seed_user(&state, "maria", Role::Professor).await;

        let current = extract(&state, Some(&bearer(&token))).await.unwrap();
        assert_eq!(current.user_id(), user_id);
        assert!(!current.is_admin());
    }

    #[tokio::test]
    async fn test_missing_header_rejected() {
        let state = test_state();
        let result = extract(&state, None).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_non_bearer_scheme_rejected() {
        let state = test_state();
        let result = extract(&state, Some("Basic dXNlcjpwYXNz")).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_ownership_checks() {
        let state = test_state();
        let (owner_id, owner_token) = seed_user(&state, "dono", Role::Estudante).await;
        let (_, admin_token) = seed_user(&state, "admin", Role::Admin).await;

        let owner = extract(&state, Some(&bearer(&owner_token))).await.unwrap();
        let admin = extract(&state, Some(&bearer(&admin_token))).await.unwrap();

        assert!(owner.ensure_self_or_admin(owner_id, "update this user").is_ok());
        assert!(matches!(
            owner.ensure_self_or_admin(owner_id + 100, "update this user"),
            Err(AppError::Forbidden(_))
        ));
        assert!(admin.ensure_self_or_admin(owner_id, "update this user").is_ok());
        assert!(matches!(
            owner.ensure_admin("list users"),
            Err(AppError::Forbidden(msg)) if msg == "Only administrators can list users"
        ));
        assert!(admin.ensure_admin("list users").is_ok());
    }
}
