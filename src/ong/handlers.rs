use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::instrument;

use super::{
    models::OngModel,
    service::OngService,
    types::{OngCreate, OngUpdate},
};
use crate::auth::CurrentUser;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::shared::{AppError, AppState, Pagination};

fn service(state: &AppState) -> OngService {
    OngService::new(Arc::clone(&state.ong_repository))
}

#[instrument(name = "create_ong", skip(state, current, request))]
pub async fn create_ong(
    State(state): State<AppState>,
    current: CurrentUser,
    AppJson(request): AppJson<OngCreate>,
) -> Result<(StatusCode, Json<OngModel>), AppError> {
    let ong = service(&state).create_ong(&current, request).await?;
    Ok((StatusCode::CREATED, Json(ong)))
}

#[instrument(name = "list_ongs", skip(state))]
pub async fn list_ongs(
    State(state): State<AppState>,
    AppQuery(pagination): AppQuery<Pagination>,
) -> Result<Json<Vec<OngModel>>, AppError> {
    Ok(Json(service(&state).list_ongs(pagination).await?))
}

#[instrument(name = "get_ong", skip(state))]
pub async fn get_ong(
    State(state): State<AppState>,
    AppPath(ngo_id): AppPath<i32>,
) -> Result<Json<OngModel>, AppError> {
    Ok(Json(service(&state).get_ong(ngo_id).await?))
}

#[instrument(name = "update_ong", skip(state, current, update))]
pub async fn update_ong(
    State(state): State<AppState>,
    current: CurrentUser,
    AppPath(ngo_id): AppPath<i32>,
    AppJson(update): AppJson<OngUpdate>,
) -> Result<Json<OngModel>, AppError> {
    Ok(Json(service(&state).update_ong(&current, ngo_id, update).await?))
}

#[instrument(name = "delete_ong", skip(state, current))]
pub async fn delete_ong(
    State(state): State<AppState>,
    current: CurrentUser,
    AppPath(ngo_id): AppPath<i32>,
) -> Result<StatusCode, AppError> {
    service(&state).delete_ong(&current, ngo_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
