//! Request extractors whose rejections render as `{"error": ...}` like every
//! other failure, instead of axum's plain-text bodies.

use axum::extract::{FromRequest, FromRequestParts};

use crate::shared::AppError;

/// JSON body; syntax errors are 400, shape errors 422, wrong content type 415
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequest)]
#[from_request(via(axum::Form), rejection(AppError))]
pub struct AppForm<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

#[cfg(test)]
mod tests {
    use crate::shared::test_utils::{seed_user, send, test_state};
    use crate::user::models::Role;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use rstest::rstest;
    use serde_json::json;
    use tower::ServiceExt; // for `oneshot`

    #[rstest]
    #[case("/tasks/abc")]
    #[case("/projetos?limit=x")]
    #[case("/disciplinas/professor/um")]
    #[tokio::test]
    async fn test_bad_path_or_query_is_json_400(#[case] uri: &str) {
        let (status, body) = send(&test_state(), "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_missing_field_is_json_422() {
        let state = test_state();
        let (_, token) = seed_user(&state, "ana", Role::Professor).await;

        let (status, body) = send(
            &state,
            "POST",
            "/tasks",
            Some(&token),
            Some(json!({"name": "Sem projeto"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("projeto_id"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_json_400() {
        let state = test_state();
        let (_, token) = seed_user(&state, "ana", Role::Professor).await;

        let request = Request::builder()
            .method("POST")
            .uri("/projetos")
            .header("authorization", format!("Bearer {}", token))
            .header("content-type", "application/json")
            .body(Body::from("{\"name\": "))
            .unwrap();
        let response = crate::routes::create_app(state)
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());
    }
}
