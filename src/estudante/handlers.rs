use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::EstudanteModel,
    service::EstudanteService,
    types::{EstudanteCreate, EstudanteUpdate},
};
use crate::auth::CurrentUser;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::shared::{AppError, AppState, Pagination};

fn service(state: &AppState) -> EstudanteService {
    EstudanteService::new(
        Arc::clone(&state.estudante_repository),
        Arc::clone(&state.user_repository),
    )
}

/// POST /estudantes
#[instrument(name = "create_estudante", skip(state, current, request))]
pub async fn create_estudante(
    State(state): State<AppState>,
    current: CurrentUser,
    AppJson(request): AppJson<EstudanteCreate>,
) -> Result<(StatusCode, Json<EstudanteModel>), AppError> {
    let estudante = service(&state).create_estudante(&current, request).await?;
    info!(student_id = estudante.student_id, "Estudante profile created");
    Ok((StatusCode::CREATED, Json(estudante)))
}

/// GET /estudantes
#[instrument(name = "list_estudantes", skip(state))]
pub async fn list_estudantes(
    State(state): State<AppState>,
    AppQuery(pagination): AppQuery<Pagination>,
) -> Result<Json<Vec<EstudanteModel>>, AppError> {
    Ok(Json(service(&state).list_estudantes(pagination).await?))
}

/// GET /estudantes/:student_id
#[instrument(name = "get_estudante", skip(state))]
pub async fn get_estudante(
    State(state): State<AppState>,
    AppPath(student_id): AppPath<i32>,
) -> Result<Json<EstudanteModel>, AppError> {
    Ok(Json(service(&state).get_estudante(student_id).await?))
}

/// PUT /estudantes/:student_id
#[instrument(name = "update_estudante", skip(state, current, update))]
pub async fn update_estudante(
    State(state): State<AppState>,
    current: CurrentUser,
    AppPath(student_id): AppPath<i32>,
    AppJson(update): AppJson<EstudanteUpdate>,
) -> Result<Json<EstudanteModel>, AppError> {
    let estudante = service(&state)
        .update_estudante(&current, student_id, update)
        .await?;
    Ok(Json(estudante))
}

/// DELETE /estudantes/:student_id
#[instrument(name = "delete_estudante", skip(state, current))]
pub async fn delete_estudante(
    State(state): State<AppState>,
    current: CurrentUser,
    AppPath(student_id): AppPath<i32>,
) -> Result<StatusCode, AppError> {
    service(&state)
        .delete_estudante(&current, student_id)
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
    async fn test_estudante_lifecycle() {
        let state = test_state();
        let (user_id, token) = seed_user(&state, "aluno", Role::Estudante).await;

        let (status, created) = send(
            &state,
            "POST",
            "/estudantes",
            Some(&token),
            Some(json!({
                "user_id": user_id,
                "full_name": "João Souza",
                "curso": "Ciência da Computação"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["full_name"], "João Souza");
        assert_eq!(created["curso"], "Ciência da Computação");
        assert!(created["vinculo"].is_null());

        let uri = format!("/estudantes/{}", created["student_id"]);
        let (status, updated) = send(
            &state,
            "PUT",
            &uri,
            Some(&token),
            Some(json!({"vinculo": "Bolsista", "curso": null})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["vinculo"], "Bolsista");
        assert!(updated["curso"].is_null());
        assert_eq!(updated["full_name"], "João Souza");

        let (status, _) = send(&state, "DELETE", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&state, "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Estudante not found");
    }

    #[tokio::test]
    async fn test_second_profile_rejected() {
        let state = test_state();
        let (user_id, token) = seed_user(&state, "aluno", Role::Estudante).await;
        let payload = json!({"user_id": user_id, "full_name": "João"});

        let (status, _) = send(&state, "POST", "/estudantes", Some(&token), Some(payload.clone())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&state, "POST", "/estudantes", Some(&token), Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "User already has a student profile");
    }

    #[tokio::test]
    async fn test_profile_for_another_user_forbidden() {
        let state = test_state();
        let (other_id, _) = seed_user(&state, "outro", Role::Estudante).await;
        let (_, token) = seed_user(&state, "intruso", Role::Estudante).await;

        let (status, _) = send(
            &state,
            "POST",
            "/estudantes",
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
            "/estudantes",
            Some(&admin_token),
            Some(json!({"user_id": 999, "full_name": "Ninguém"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "User not found");
    }

    #[tokio::test]
    async fn test_list_estudantes_paginates() {
        let state = test_state();
        let (_, admin_token) = seed_user(&state, "root", Role::Admin).await;
        for i in 0..7 {
            let (user_id, _) = seed_user(&state, &format!("aluno{}", i), Role::Estudante).await;
            let (status, _) = send(
                &state,
                "POST",
                "/estudantes",
                Some(&admin_token),
                Some(json!({"user_id": user_id, "full_name": format!("Aluno {}", i)})),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = send(&state, "GET", "/estudantes?limit=5", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 5);

        let (_, body) = send(&state, "GET", "/estudantes?skip=5", None, None).await;
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["full_name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Aluno 5", "Aluno 6"]);
    }
}
