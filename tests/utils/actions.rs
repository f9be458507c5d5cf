use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use super::setup::{TestSetup, TEST_PASSWORD};

// ============================================================================
// Action Helpers
// ============================================================================

pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestSetup {
    /// Send one request through a fresh clone of the router
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> ApiResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        ApiResponse { status, body }
    }

    pub async fn get(&self, uri: &str) -> ApiResponse {
        self.request("GET", uri, None, None).await
    }

    pub async fn post_as(&self, username: &str, uri: &str, body: Value) -> ApiResponse {
        self.request("POST", uri, Some(self.token(username)), Some(body))
            .await
    }

    pub async fn delete_as(&self, username: &str, uri: &str) -> ApiResponse {
        self.request("DELETE", uri, Some(self.token(username)), None)
            .await
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn register(&self, username: &str, role: &str) -> i64 {
        let response = self
            .request(
                "POST",
                "/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": TEST_PASSWORD,
                    "role": role,
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["user_id"].as_i64().unwrap()
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let request = Request::builder()
            .method("POST")
            .uri("/auth/token")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(format!(
                "username={}&password={}",
                username, password
            )))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Creates the student profile for a registered user and returns its id
    pub async fn create_estudante(&self, username: &str) -> i64 {
        let response = self
            .post_as(
                username,
                "/estudantes",
                json!({
                    "user_id": self.user_id(username),
                    "full_name": format!("Estudante {}", username),
                    "curso": "Engenharia",
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["student_id"].as_i64().unwrap()
    }

    pub async fn create_projeto(&self, username: &str, name: &str) -> i64 {
        let response = self
            .post_as(username, "/projetos", json!({ "name": name }))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["projeto_id"].as_i64().unwrap()
    }

    pub async fn create_task(&self, username: &str, projeto_id: i64, name: &str) -> i64 {
        let response = self
            .post_as(
                username,
                "/tasks",
                json!({ "projeto_id": projeto_id, "name": name }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["task_id"].as_i64().unwrap()
    }

    pub async fn enroll(&self, username: &str, student_id: i64, projeto_id: i64) -> ApiResponse {
        self.post_as(
            username,
            "/matriculas",
            json!({
                "student_id": student_id,
                "projeto_id": projeto_id,
                "status": "Ativo",
            }),
        )
        .await
    }
}
