use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::instrument;

use super::{
    models::ProjetoModel,
    service::ProjetoService,
    types::{ProjetoCreate, ProjetoUpdate},
};
use crate::auth::CurrentUser;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::shared::{AppError, AppState, Pagination};

fn service(state: &AppState) -> ProjetoService {
    ProjetoService::new(
        Arc::clone(&state.projeto_repository),
        Arc::clone(&state.disciplina_repository),
        Arc::clone(&state.ong_repository),
    )
}

/// POST /projetos
#[instrument(name = "create_projeto", skip(state, current, request), fields(user_id = current.user_id()))]
pub async fn create_projeto(
    State(state): State<AppState>,
    current: CurrentUser,
    AppJson(request): AppJson<ProjetoCreate>,
) -> Result<(StatusCode, Json<ProjetoModel>), AppError> {
    let projeto = service(&state).create_projeto(request).await?;
    Ok((StatusCode::CREATED, Json(projeto)))
}

#[instrument(name = "list_projetos", skip(state))]
pub async fn list_projetos(
    State(state): State<AppState>,
    AppQuery(pagination): AppQuery<Pagination>,
) -> Result<Json<Vec<ProjetoModel>>, AppError> {
    Ok(Json(service(&state).list_projetos(pagination).await?))
}

#[instrument(name = "get_projeto", skip(state))]
pub async fn get_projeto(
    State(state): State<AppState>,
    AppPath(projeto_id): AppPath<i32>,
) -> Result<Json<ProjetoModel>, AppError> {
    Ok(Json(service(&state).get_projeto(projeto_id).await?))
}

/// GET /projetos/disciplina/:disciplina_id
#[instrument(name = "list_projetos_by_disciplina", skip(state))]
pub async fn list_projetos_by_disciplina(
    State(state): State<AppState>,
    AppPath(disciplina_id): AppPath<i32>,
) -> Result<Json<Vec<ProjetoModel>>, AppError> {
    Ok(Json(service(&state).list_by_disciplina(disciplina_id).await?))
}

/// GET /projetos/ong/:ngo_id
#[instrument(name = "list_projetos_by_ong", skip(state))]
pub async fn list_projetos_by_ong(
    State(state): State<AppState>,
    AppPath(ngo_id): AppPath<i32>,
) -> Result<Json<Vec<ProjetoModel>>, AppError> {
    Ok(Json(service(&state).list_by_ong(ngo_id).await?))
}

#[instrument(name = "update_projeto", skip(state, current, update), fields(user_id = current.user_id()))]
pub async fn update_projeto(
    State(state): State<AppState>,
    current: CurrentUser,
    AppPath(projeto_id): AppPath<i32>,
    AppJson(update): AppJson<ProjetoUpdate>,
) -> Result<Json<ProjetoModel>, AppError> {
    Ok(Json(service(&state).update_projeto(projeto_id, update).await?))
}

#[instrument(name = "delete_projeto", skip(state, current), fields(user_id = current.user_id()))]
pub async fn delete_projeto(
    State(state): State<AppState>,
    current: CurrentUser,
    AppPath(projeto_id): AppPath<i32>,
) -> Result<StatusCode, AppError> {
    service(&state).delete_projeto(projeto_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
