use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::instrument;

use super::{
    models::MatriculaModel,
    service::MatriculaService,
    types::{MatriculaCreate, MatriculaUpdate},
};
use crate::auth::CurrentUser;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::shared::{AppError, AppState, Pagination};

fn service(state: &AppState) -> MatriculaService {
    MatriculaService::new(
        Arc::clone(&state.matricula_repository),
        Arc::clone(&state.estudante_repository),
        Arc::clone(&state.projeto_repository),
    )
}

/// POST /matriculas
#[instrument(name = "create_matricula", skip(state, current, request), fields(user_id = current.user_id()))]
pub async fn create_matricula(
    State(state): State<AppState>,
    current: CurrentUser,
    AppJson(request): AppJson<MatriculaCreate>,
) -> Result<(StatusCode, Json<MatriculaModel>), AppError> {
    let matricula = service(&state).create_matricula(request).await?;
    Ok((StatusCode::CREATED, Json(matricula)))
}

/// GET /matriculas
#[instrument(name = "list_matriculas", skip(state))]
pub async fn list_matriculas(
    State(state): State<AppState>,
    AppQuery(pagination): AppQuery<Pagination>,
) -> Result<Json<Vec<MatriculaModel>>, AppError> {
    Ok(Json(service(&state).list_matriculas(pagination).await?))
}

/// GET /matriculas/:matricula_id
#[instrument(name = "get_matricula", skip(state))]
pub async fn get_matricula(
    State(state): State<AppState>,
    AppPath(matricula_id): AppPath<i32>,
) -> Result<Json<MatriculaModel>, AppError> {
    Ok(Json(service(&state).get_matricula(matricula_id).await?))
}

/// GET /matriculas/student/:student_id
#[instrument(name = "list_matriculas_by_student", skip(state))]
pub async fn list_matriculas_by_student(
    State(state): State<AppState>,
    AppPath(student_id): AppPath<i32>,
) -> Result<Json<Vec<MatriculaModel>>, AppError> {
    Ok(Json(service(&state).list_by_student(student_id).await?))
}

/// GET /matriculas/project/:projeto_id
#[instrument(name = "list_matriculas_by_projeto", skip(state))]
pub async fn list_matriculas_by_projeto(
    State(state): State<AppState>,
    AppPath(projeto_id): AppPath<i32>,
) -> Result<Json<Vec<MatriculaModel>>, AppError> {
    Ok(Json(service(&state).list_by_projeto(projeto_id).await?))
}

/// PUT /matriculas/:matricula_id
#[instrument(name = "update_matricula", skip(state, current, update), fields(user_id = current.user_id()))]
pub async fn update_matricula(
    State(state): State<AppState>,
    current: CurrentUser,
    AppPath(matricula_id): AppPath<i32>,
    AppJson(update): AppJson<MatriculaUpdate>,
) -> Result<Json<MatriculaModel>, AppError> {
    Ok(Json(
        service(&state)
            .update_matricula(matricula_id, update)
            .await?,
    ))
}

/// DELETE /matriculas/:matricula_id
#[instrument(name = "delete_matricula", skip(state, current), fields(user_id = current.user_id()))]
pub async fn delete_matricula(
    State(state): State<AppState>,
    current: CurrentUser,
    AppPath(matricula_id): AppPath<i32>,
) -> Result<StatusCode, AppError> {
    service(&state).delete_matricula(matricula_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::shared::test_utils::{seed_user, send, test_state};
    use crate::shared::AppState;
    use crate::user::models::Role;
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    /// Creates a student profile and a project, returning their ids and the student's token
    async fn student_and_projeto(state: &AppState) -> (Value, Value, String) {
        let (user_id, token) = seed_user(state, "u1", Role::Estudante).await;
        let (_, estudante) = send(
            state,
            "POST",
            "/estudantes",
            Some(&token),
            Some(json!({"user_id": user_id, "full_name": "Aluno Um"})),
        )
        .await;
        let (_, projeto) = send(
            state,
            "POST",
            "/projetos",
            Some(&token),
            Some(json!({"name": "Alfabetização"})),
        )
        .await;
        (estudante["student_id"].clone(), projeto["projeto_id"].clone(), token)
    }

    #[tokio::test]
    async fn test_enroll_then_duplicate_conflicts() {
        let state = test_state();
        let (student_id, projeto_id, token) = student_and_projeto(&state).await;
        let payload = json!({"student_id": student_id, "projeto_id": projeto_id, "status": "Ativo"});

        let (status, matricula) =
            send(&state, "POST", "/matriculas", Some(&token), Some(payload.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(matricula["status"], "Ativo");
        assert!(matricula["matricula_date"].is_string());

        let (status, body) = send(&state, "POST", "/matriculas", Some(&token), Some(payload)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Student is already enrolled in this project");
    }

    #[tokio::test]
    async fn test_missing_student_or_project() {
        let state = test_state();
        let (student_id, projeto_id, token) = student_and_projeto(&state).await;

        let (status, body) = send(
            &state,
            "POST",
            "/matriculas",
            Some(&token),
            Some(json!({"student_id": 999, "projeto_id": projeto_id})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Student not found");

        let (status, body) = send(
            &state,
            "POST",
            "/matriculas",
            Some(&token),
            Some(json!({"student_id": student_id, "projeto_id": 999})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Project not found");
    }

    #[tokio::test]
    async fn test_filters_and_status_update() {
        let state = test_state();
        let (student_id, projeto_id, token) = student_and_projeto(&state).await;
        let (_, matricula) = send(
            &state,
            "POST",
            "/matriculas",
            Some(&token),
            Some(json!({"student_id": student_id, "projeto_id": projeto_id})),
        )
        .await;

        let (_, by_student) = send(
            &state,
            "GET",
            &format!("/matriculas/student/{}", student_id),
            None,
            None,
        )
        .await;
        assert_eq!(by_student.as_array().unwrap().len(), 1);

        let (_, by_project) = send(
            &state,
            "GET",
            &format!("/matriculas/project/{}", projeto_id),
            None,
            None,
        )
        .await;
        assert_eq!(by_project[0]["matricula_id"], matricula["matricula_id"]);

        let uri = format!("/matriculas/{}", matricula["matricula_id"]);
        let (status, updated) = send(
            &state,
            "PUT",
            &uri,
            Some(&token),
            Some(json!({"status": "Concluído"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], "Concluído");
        assert_eq!(updated["matricula_date"], matricula["matricula_date"]);

        let (status, _) = send(&state, "DELETE", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, body) = send(&state, "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Matricula not found");
    }
}
