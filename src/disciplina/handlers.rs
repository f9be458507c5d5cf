use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::DisciplinaModel,
    service::DisciplinaService,
    types::{DisciplinaCreate, DisciplinaUpdate},
};
use crate::auth::CurrentUser;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::shared::{AppError, AppState, Pagination};

fn service(state: &AppState) -> DisciplinaService {
    DisciplinaService::new(
        Arc::clone(&state.disciplina_repository),
        Arc::clone(&state.professor_repository),
    )
}

/// POST /disciplinas
#[instrument(name = "create_disciplina", skip(state, current, request), fields(user_id = current.user_id()))]
pub async fn create_disciplina(
    State(state): State<AppState>,
    current: CurrentUser,
    AppJson(request): AppJson<DisciplinaCreate>,
) -> Result<(StatusCode, Json<DisciplinaModel>), AppError> {
    let disciplina = service(&state).create_disciplina(request).await?;
    Ok((StatusCode::CREATED, Json(disciplina)))
}

/// GET /disciplinas
#[instrument(name = "list_disciplinas", skip(state))]
pub async fn list_disciplinas(
    State(state): State<AppState>,
    AppQuery(pagination): AppQuery<Pagination>,
) -> Result<Json<Vec<DisciplinaModel>>, AppError> {
    Ok(Json(service(&state).list_disciplinas(pagination).await?))
}

/// GET /disciplinas/:disciplina_id
#[instrument(name = "get_disciplina", skip(state))]
pub async fn get_disciplina(
    State(state): State<AppState>,
    AppPath(disciplina_id): AppPath<i32>,
) -> Result<Json<DisciplinaModel>, AppError> {
    Ok(Json(service(&state).get_disciplina(disciplina_id).await?))
}

/// GET /disciplinas/professor/:professor_id
#[instrument(name = "list_disciplinas_by_professor", skip(state))]
pub async fn list_disciplinas_by_professor(
    State(state): State<AppState>,
    AppPath(professor_id): AppPath<i32>,
) -> Result<Json<Vec<DisciplinaModel>>, AppError> {
    Ok(Json(service(&state).list_by_professor(professor_id).await?))
}

/// GET /disciplinas/search/:nome
#[instrument(name = "search_disciplinas", skip(state))]
pub async fn search_disciplinas(
    State(state): State<AppState>,
    AppPath(nome): AppPath<String>,
) -> Result<Json<Vec<DisciplinaModel>>, AppError> {
    let found = service(&state).search(&nome).await?;
    info!(matches = found.len(), "Disciplina search finished");
    Ok(Json(found))
}

/// PUT /disciplinas/:disciplina_id
#[instrument(name = "update_disciplina", skip(state, current, update), fields(user_id = current.user_id()))]
pub async fn update_disciplina(
    State(state): State<AppState>,
    current: CurrentUser,
    AppPath(disciplina_id): AppPath<i32>,
    AppJson(update): AppJson<DisciplinaUpdate>,
) -> Result<Json<DisciplinaModel>, AppError> {
    let disciplina = service(&state)
        .update_disciplina(disciplina_id, update)
        .await?;
    Ok(Json(disciplina))
}

/// DELETE /disciplinas/:disciplina_id
#[instrument(name = "delete_disciplina", skip(state, current), fields(user_id = current.user_id()))]
pub async fn delete_disciplina(
    State(state): State<AppState>,
    current: CurrentUser,
    AppPath(disciplina_id): AppPath<i32>,
) -> Result<StatusCode, AppError> {
    service(&state).delete_disciplina(disciplina_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
