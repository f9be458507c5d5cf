use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::UserService,
    types::{UserCreate, UserResponse, UserUpdate},
};
use crate::auth::CurrentUser;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::shared::{AppError, AppState, Pagination};

fn service(state: &AppState) -> UserService {
    UserService::new(Arc::clone(&state.user_repository), state.password_hasher)
}

/// POST /users
#[instrument(name = "create_user", skip(state, request), fields(username = %request.username))]
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(request): AppJson<UserCreate>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = service(&state).create_user(request).await?;
    info!(user_id = user.user_id, "User created via users endpoint");
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users (admin only)
#[instrument(name = "list_users", skip(state, current))]
pub async fn list_users(
    State(state): State<AppState>,
    current: CurrentUser,
    AppQuery(pagination): AppQuery<Pagination>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = service(&state).list_users(&current, pagination).await?;
    Ok(Json(users))
}

/// GET /users/:user_id
#[instrument(name = "get_user", skip(state, current))]
pub async fn get_user(
    State(state): State<AppState>,
    current: CurrentUser,
    AppPath(user_id): AppPath<i32>,
) -> Result<Json<UserResponse>, AppError> {
    let user = service(&state).get_user(&current, user_id).await?;
    Ok(Json(user))
}

/// PUT /users/:user_id
#[instrument(name = "update_user", skip(state, current, update))]
pub async fn update_user(
    State(state): State<AppState>,
    current: CurrentUser,
    AppPath(user_id): AppPath<i32>,
    AppJson(update): AppJson<UserUpdate>,
) -> Result<Json<UserResponse>, AppError> {
    let user = service(&state).update_user(&current, user_id, update).await?;
    Ok(Json(user))
}

/// DELETE /users/:user_id
#[instrument(name = "delete_user", skip(state, current))]
pub async fn delete_user(
    State(state): State<AppState>,
    current: CurrentUser,
    AppPath(user_id): AppPath<i32>,
) -> Result<StatusCode, AppError> {
    service(&state).delete_user(&current, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
