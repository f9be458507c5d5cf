use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::ProfessorModel,
    service::ProfessorService,
    types::{ProfessorCreate, ProfessorUpdate},
};
use crate::auth::CurrentUser;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::shared::{AppError, AppState, Pagination};

fn service(state: &AppState) -> ProfessorService {
    ProfessorService::new(
        Arc::clone(&state.professor_repository),
        Arc::clone(&state.user_repository),
    )
}

/// POST /professores
#[instrument(name = "create_professor", skip(state, current, request))]
pub async fn create_professor(
    State(state): State<AppState>,
    current: CurrentUser,
    AppJson(request): AppJson<ProfessorCreate>,
) -> Result<(StatusCode, Json<ProfessorModel>), AppError> {
    let professor = service(&state).create_professor(&current, request).await?;
    info!(professor_id = professor.professor_id, "Professor profile created");
    Ok((StatusCode::CREATED, Json(professor)))
}

/// GET /professores
#[instrument(name = "list_professores", skip(state))]
pub async fn list_professores(
    State(state): State<AppState>,
    AppQuery(pagination): AppQuery<Pagination>,
) -> Result<Json<Vec<ProfessorModel>>, AppError> {
    Ok(Json(service(&state).list_professores(pagination).await?))
}

/// GET /professores/:professor_id
#[instrument(name = "get_professor", skip(state))]
pub async fn get_professor(
    State(state): State<AppState>,
    AppPath(professor_id): AppPath<i32>,
) -> Result<Json<ProfessorModel>, AppError> {
    Ok(Json(service(&state).get_professor(professor_id).await?))
}

/// PUT /professores/:professor_id
#[instrument(name = "update_professor", skip(state, current, update))]
pub async fn update_professor(
    State(state): State<AppState>,
    current: CurrentUser,
    AppPath(professor_id): AppPath<i32>,
    AppJson(update): AppJson<ProfessorUpdate>,
) -> Result<Json<ProfessorModel>, AppError> {
    let professor = service(&state)
        .update_professor(&current, professor_id, update)
        .await?;
    Ok(Json(professor))
}

/// DELETE /professores/:professor_id
#[instrument(name = "delete_professor", skip(state, current))]
pub async fn delete_professor(
    State(state): State<AppState>,
    current: CurrentUser,
    AppPath(professor_id): AppPath<i32>,
) -> Result<StatusCode, AppError> {
    service(&state)
        .delete_professor(&current, professor_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::shared::test_utils::{seed_user, send, test_state};
    use crate::user::models::Role;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_professor_lifecycle() {
        let state = test_state();
        let (user_id, token) = seed_user(&state, "prof", Role::Professor).await;

        let (status, created) = send(
            &state,
            "POST",
            "/professores",
            Some(&token),
            Some(json!({
                "user_id": user_id,
                "full_name": "Maria Silva",
                "departamento": "DCC"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["full_name"], "Maria Silva");
        assert_eq!(created["departamento"], "DCC");
        assert!(created["vinculo"].is_null());

        let uri = format!("/professores/{}", created["professor_id"]);
        let (status, updated) = send(
            &state,
            "PUT",
            &uri,
            Some(&token),
            Some(json!({"vinculo": "Efetivo", "departamento": null})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["vinculo"], "Efetivo");
        assert!(updated["departamento"].is_null());
        assert_eq!(updated["full_name"], "Maria Silva");

        let (status, _) = send(&state, "DELETE", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&state, "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Professor not found");
    }

    #[tokio::test]
    async fn test_second_profile_rejected() {
        let state = test_state();
        let (user_id, token) = seed_user(&state, "prof", Role::Professor).await;
        let payload = json!({"user_id": user_id, "full_name": "Maria"});

        let (status, _) = send(&state, "POST", "/professores", Some(&token), Some(payload.clone())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&state, "POST", "/professores", Some(&token), Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "User already has a professor profile");
    }

    #[tokio::test]
    async fn test_profile_for_another_user_forbidden() {
        let state = test_state();
        let (other_id, _) = seed_user(&state, "outro", Role::Professor).await;
        let (_, token) = seed_user(&state, "intruso", Role::Estudante).await;

        let (status, _) = send(
            &state,
            "POST",
            "/professores",
            Some(&token),
            Some(json!({"user_id": other_id, "full_name": "Falso"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_creates_profile_for_missing_user() {
        let state = test_state();
        let (_, admin_token) = seed_user(&state, "root", Role::Admin).await;

        let (status, body) = send(
            &state,
            "POST",
            "/professores",
            Some(&admin_token),
            Some(json!({"user_id": 999, "full_name": "Ninguém"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "User not found");
    }

    #[tokio::test]
    async fn test_list_professores_is_open() {
        let state = test_state();
        let (status, body) = send(&state, "GET", "/professores", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());
    }
}
