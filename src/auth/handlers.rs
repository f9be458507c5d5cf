use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    extractor::CurrentUser,
    service::AuthService,
    types::{LoginForm, TokenResponse},
};
use crate::extract::{AppForm, AppJson};
use crate::shared::{AppError, AppState};
use crate::user::{
    service::UserService,
    types::{UserCreate, UserResponse},
};

/// HTTP handler for self-registration
///
/// POST /auth/register
#[instrument(name = "register", skip(state, request), fields(username = %request.username))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(request): AppJson<UserCreate>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let service = UserService::new(Arc::clone(&state.user_repository), state.password_hasher);
    let user = service.create_user(request).await?;

    info!(user_id = user.user_id, "User registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// HTTP handler exchanging form-encoded credentials for a bearer token
///
/// POST /auth/token
#[instrument(name = "login", skip(state, form), fields(username = %form.username))]
pub async fn login_for_access_token(
    State(state): State<AppState>,
    AppForm(form): AppForm<LoginForm>,
) -> Result<Json<TokenResponse>, AppError> {
    let service = AuthService::new(
        Arc::clone(&state.user_repository),
        state.token_config.clone(),
        state.password_hasher,
    );
    let token = service.issue_token(&form.username, &form.password).await?;

    Ok(Json(token))
}

/// GET /auth/me and GET /users/me
#[instrument(name = "read_current_user", skip_all)]
pub async fn read_current_user(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

#[cfg(test)]
mod tests {
    use crate::shared::test_utils::{send, test_state};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::json;
    use tower::ServiceExt; // for `oneshot`

    async fn login(state: &crate::shared::AppState, form: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/auth/token")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();

        let response = crate::routes::create_router(state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_register_login_and_me() {
        let state = test_state();

        let (status, user) = send(
            &state,
            "POST",
            "/auth/register",
            None,
            Some(json!({
                "username": "ana",
                "email": "ana@example.com",
                "password": "s3nha",
                "role": "estudante"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(user["username"], "ana");
        assert_eq!(user["role"], "Estudante");
        assert!(user.get("password").is_none());

        let (status, token) = login(&state, "username=ana&password=s3nha").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(token["token_type"], "bearer");
        let access_token = token["access_token"].as_str().unwrap();

        let (status, me) = send(&state, "GET", "/auth/me", Some(access_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["user_id"], user["user_id"]);
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let state = test_state();
        crate::shared::test_utils::seed_user(&state, "ana", crate::user::models::Role::Admin)
            .await;

        let (status, body) = login(&state, "username=ana&password=nope").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Incorrect username or password");
    }

    #[tokio::test]
    async fn test_me_requires_token() {
        let state = test_state();

        let request = Request::builder()
            .uri("/auth/me")
            .body(Body::empty())
            .unwrap();
        let response = crate::routes::create_router(state)
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()["www-authenticate"], "Bearer");
    }

    #[tokio::test]
    async fn test_me_with_invalid_token() {
        let state = test_state();
        let (status, body) = send(&state, "GET", "/auth/me", Some("garbage"), None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Could not validate credentials");
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let state = test_state();
        let payload = json!({
            "username": "ana",
            "email": "ana@example.com",
            "password": "s3nha",
            "role": "Estudante"
        });

        let (status, _) = send(&state, "POST", "/auth/register", None, Some(payload.clone())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&state, "POST", "/auth/register", None, Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Username or email already registered");
    }
}
