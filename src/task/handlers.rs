use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::instrument;

use super::{
    models::TaskModel,
    service::TaskService,
    types::{TaskCreate, TaskUpdate},
};
use crate::auth::CurrentUser;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::shared::{AppError, AppState, Pagination};

fn service(state: &AppState) -> TaskService {
    TaskService::new(
        Arc::clone(&state.task_repository),
        Arc::clone(&state.projeto_repository),
    )
}

#[instrument(name = "create_task", skip(state, current, request), fields(user_id = current.user_id()))]
pub async fn create_task(
    State(state): State<AppState>,
    current: CurrentUser,
    AppJson(request): AppJson<TaskCreate>,
) -> Result<(StatusCode, Json<TaskModel>), AppError> {
    let task = service(&state).create_task(request).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

#[instrument(name = "list_tasks", skip(state))]
pub async fn list_tasks(
    State(state): State<AppState>,
    AppQuery(pagination): AppQuery<Pagination>,
) -> Result<Json<Vec<TaskModel>>, AppError> {
    Ok(Json(service(&state).list_tasks(pagination).await?))
}

#[instrument(name = "get_task", skip(state))]
pub async fn get_task(
    State(state): State<AppState>,
    AppPath(task_id): AppPath<i32>,
) -> Result<Json<TaskModel>, AppError> {
    Ok(Json(service(&state).get_task(task_id).await?))
}

/// GET /tasks/projeto/:projeto_id
#[instrument(name = "list_tasks_by_projeto", skip(state))]
pub async fn list_tasks_by_projeto(
    State(state): State<AppState>,
    AppPath(projeto_id): AppPath<i32>,
) -> Result<Json<Vec<TaskModel>>, AppError> {
    Ok(Json(service(&state).list_by_projeto(projeto_id).await?))
}

/// GET /tasks/status/:status
#[instrument(name = "list_tasks_by_status", skip(state))]
pub async fn list_tasks_by_status(
    State(state): State<AppState>,
    AppPath(status): AppPath<String>,
) -> Result<Json<Vec<TaskModel>>, AppError> {
    Ok(Json(service(&state).list_by_status(&status).await?))
}

#[instrument(name = "update_task", skip(state, current, update), fields(user_id = current.user_id()))]
pub async fn update_task(
    State(state): State<AppState>,
    current: CurrentUser,
    AppPath(task_id): AppPath<i32>,
    AppJson(update): AppJson<TaskUpdate>,
) -> Result<Json<TaskModel>, AppError> {
    Ok(Json(service(&state).update_task(task_id, update).await?))
}

#[instrument(name = "delete_task", skip(state, current), fields(user_id = current.user_id()))]
pub async fn delete_task(
    State(state): State<AppState>,
    current: CurrentUser,
    AppPath(task_id): AppPath<i32>,
) -> Result<StatusCode, AppError> {
    service(&state).delete_task(task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::shared::test_utils::{seed_user, send, test_state};
    use crate::user::models::Role;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_task_for_unknown_project() {
        let state = test_state();
        let (_, token) = seed_user(&state, "ana", Role::Estudante).await;

        let (status, body) = send(
            &state,
            "POST",
            "/tasks",
            Some(&token),
            Some(json!({"projeto_id": 999, "name": "Nada"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Project not found");
    }

    #[tokio::test]
    async fn test_task_filters_and_partial_update() {
        let state = test_state();
        let (_, token) = seed_user(&state, "ana", Role::Professor).await;
        let (_, projeto) = send(
            &state,
            "POST",
            "/projetos",
            Some(&token),
            Some(json!({"name": "Mutirão"})),
        )
        .await;
        let projeto_id = projeto["projeto_id"].as_i64().unwrap();

        for (name, status) in [("Limpar", "Pendente"), ("Plantar", "Concluída")] {
            let (code, task) = send(
                &state,
                "POST",
                "/tasks",
                Some(&token),
                Some(json!({
                    "projeto_id": projeto_id,
                    "name": name,
                    "type": "Campo",
                    "status": status
                })),
            )
            .await;
            assert_eq!(code, StatusCode::CREATED);
            assert_eq!(task["type"], "Campo");
        }

        let (_, by_projeto) = send(
            &state,
            "GET",
            &format!("/tasks/projeto/{}", projeto_id),
            None,
            None,
        )
        .await;
        assert_eq!(by_projeto.as_array().unwrap().len(), 2);

        let (_, pending) = send(&state, "GET", "/tasks/status/Pendente", None, None).await;
        let pending = pending.as_array().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0]["name"], "Limpar");

        let uri = format!("/tasks/{}", pending[0]["task_id"]);
        let (status, updated) = send(
            &state,
            "PUT",
            &uri,
            Some(&token),
            Some(json!({"status": "Concluída"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], "Concluída");
        assert_eq!(updated["name"], "Limpar");
        assert_eq!(updated["type"], "Campo");
    }
}
