use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::instrument;

use super::{
    models::TaskEstudanteModel,
    service::TaskEstudanteService,
    types::{TaskEstudanteCreate, TaskEstudanteUpdate},
};
use crate::auth::CurrentUser;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::shared::{AppError, AppState, Pagination};

fn service(state: &AppState) -> TaskEstudanteService {
    TaskEstudanteService::new(
        Arc::clone(&state.task_estudante_repository),
        Arc::clone(&state.estudante_repository),
        Arc::clone(&state.task_repository),
    )
}

/// POST /task-estudantes
#[instrument(name = "create_task_estudante", skip(state, current, request), fields(user_id = current.user_id()))]
pub async fn create_task_estudante(
    State(state): State<AppState>,
    current: CurrentUser,
    AppJson(request): AppJson<TaskEstudanteCreate>,
) -> Result<(StatusCode, Json<TaskEstudanteModel>), AppError> {
    let assignment = service(&state).create_task_estudante(request).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

#[instrument(name = "list_task_estudantes", skip(state))]
pub async fn list_task_estudantes(
    State(state): State<AppState>,
    AppQuery(pagination): AppQuery<Pagination>,
) -> Result<Json<Vec<TaskEstudanteModel>>, AppError> {
    Ok(Json(service(&state).list_task_estudantes(pagination).await?))
}

#[instrument(name = "get_task_estudante", skip(state))]
pub async fn get_task_estudante(
    State(state): State<AppState>,
    AppPath(estud_task_id): AppPath<i32>,
) -> Result<Json<TaskEstudanteModel>, AppError> {
    Ok(Json(service(&state).get_task_estudante(estud_task_id).await?))
}

/// GET /task-estudantes/student/:student_id
#[instrument(name = "list_task_estudantes_by_student", skip(state))]
pub async fn list_task_estudantes_by_student(
    State(state): State<AppState>,
    AppPath(student_id): AppPath<i32>,
) -> Result<Json<Vec<TaskEstudanteModel>>, AppError> {
    Ok(Json(service(&state).list_by_student(student_id).await?))
}

/// GET /task-estudantes/task/:task_id
#[instrument(name = "list_task_estudantes_by_task", skip(state))]
pub async fn list_task_estudantes_by_task(
    State(state): State<AppState>,
    AppPath(task_id): AppPath<i32>,
) -> Result<Json<Vec<TaskEstudanteModel>>, AppError> {
    Ok(Json(service(&state).list_by_task(task_id).await?))
}

/// GET /task-estudantes/status/:status
#[instrument(name = "list_task_estudantes_by_status", skip(state))]
pub async fn list_task_estudantes_by_status(
    State(state): State<AppState>,
    AppPath(status): AppPath<String>,
) -> Result<Json<Vec<TaskEstudanteModel>>, AppError> {
    Ok(Json(service(&state).list_by_status(&status).await?))
}

#[instrument(name = "update_task_estudante", skip(state, current, update), fields(user_id = current.user_id()))]
pub async fn update_task_estudante(
    State(state): State<AppState>,
    current: CurrentUser,
    AppPath(estud_task_id): AppPath<i32>,
    AppJson(update): AppJson<TaskEstudanteUpdate>,
) -> Result<Json<TaskEstudanteModel>, AppError> {
    Ok(Json(
        service(&state)
            .update_task_estudante(estud_task_id, update)
            .await?,
    ))
}

#[instrument(name = "delete_task_estudante", skip(state, current), fields(user_id = current.user_id()))]
pub async fn delete_task_estudante(
    State(state): State<AppState>,
    current: CurrentUser,
    AppPath(estud_task_id): AppPath<i32>,
) -> Result<StatusCode, AppError> {
    service(&state).delete_task_estudante(estud_task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
