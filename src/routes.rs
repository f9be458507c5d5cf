use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

use crate::shared::AppState;
use crate::{
    auth, disciplina, estudante, matricula, ong, professor, projeto, task, task_estudante, user,
};

async fn root() -> Json<Value> {
    Json(json!({ "message": "Voluntariamente API is running" }))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/token", post(auth::login_for_access_token))
        .route("/me", get(auth::read_current_user))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(user::list_users).post(user::create_user))
        .route("/me", get(auth::read_current_user))
        .route(
            "/:user_id",
            get(user::get_user)
                .put(user::update_user)
                .delete(user::delete_user),
        )
}

fn professor_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(professor::list_professores).post(professor::create_professor),
        )
        .route(
            "/:professor_id",
            get(professor::get_professor)
                .put(professor::update_professor)
                .delete(professor::delete_professor),
        )
}

fn estudante_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(estudante::list_estudantes).post(estudante::create_estudante),
        )
        .route(
            "/:student_id",
            get(estudante::get_estudante)
                .put(estudante::update_estudante)
                .delete(estudante::delete_estudante),
        )
}

fn ong_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(ong::list_ongs).post(ong::create_ong))
        .route(
            "/:ngo_id",
            get(ong::get_ong).put(ong::update_ong).delete(ong::delete_ong),
        )
}

fn disciplina_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(disciplina::list_disciplinas).post(disciplina::create_disciplina),
        )
        .route(
            "/:disciplina_id",
            get(disciplina::get_disciplina)
                .put(disciplina::update_disciplina)
                .delete(disciplina::delete_disciplina),
        )
        .route(
            "/professor/:professor_id",
            get(disciplina::list_disciplinas_by_professor),
        )
        .route("/search/:nome", get(disciplina::search_disciplinas))
}

fn projeto_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(projeto::list_projetos).post(projeto::create_projeto))
        .route(
            "/:projeto_id",
            get(projeto::get_projeto)
                .put(projeto::update_projeto)
                .delete(projeto::delete_projeto),
        )
        .route(
            "/disciplina/:disciplina_id",
            get(projeto::list_projetos_by_disciplina),
        )
        .route("/ong/:ngo_id", get(projeto::list_projetos_by_ong))
}

fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(task::list_tasks).post(task::create_task))
        .route(
            "/:task_id",
            get(task::get_task)
                .put(task::update_task)
                .delete(task::delete_task),
        )
        .route("/projeto/:projeto_id", get(task::list_tasks_by_projeto))
        .route("/status/:status", get(task::list_tasks_by_status))
}

fn matricula_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(matricula::list_matriculas).post(matricula::create_matricula),
        )
        .route(
            "/:matricula_id",
            get(matricula::get_matricula)
                .put(matricula::update_matricula)
                .delete(matricula::delete_matricula),
        )
        .route(
            "/student/:student_id",
            get(matricula::list_matriculas_by_student),
        )
        .route(
            "/project/:projeto_id",
            get(matricula::list_matriculas_by_projeto),
        )
}

fn task_estudante_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(task_estudante::list_task_estudantes).post(task_estudante::create_task_estudante),
        )
        .route(
            "/:estud_task_id",
            get(task_estudante::get_task_estudante)
                .put(task_estudante::update_task_estudante)
                .delete(task_estudante::delete_task_estudante),
        )
        .route(
            "/student/:student_id",
            get(task_estudante::list_task_estudantes_by_student),
        )
        .route(
            "/task/:task_id",
            get(task_estudante::list_task_estudantes_by_task),
        )
        .route(
            "/status/:status",
            get(task_estudante::list_task_estudantes_by_status),
        )
}

/// Strips a trailing slash before routing, so `/projetos/` and `/projetos`
/// reach the same handler. Must wrap the finished router from outside.
pub fn normalize_paths(router: Router) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router)
}

/// The API as served: `create_router` behind path normalization
pub fn create_app(state: AppState) -> NormalizePath<Router> {
    normalize_paths(create_router(state))
}

/// Builds the full HTTP API. Layers (tracing, CORS) are added by the binary.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .nest("/professores", professor_routes())
        .nest("/estudantes", estudante_routes())
        .nest("/ongs", ong_routes())
        .nest("/disciplinas", disciplina_routes())
        .nest("/projetos", projeto_routes())
        .nest("/tasks", task_routes())
        .nest("/matriculas", matricula_routes())
        .nest("/task-estudantes", task_estudante_routes())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use crate::shared::test_utils::{seed_user, send, test_state};
    use crate::user::models::Role;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_root_is_alive() {
        let (status, body) = send(&test_state(), "GET", "/", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, _) = send(&test_state(), "GET", "/salas", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_trailing_slash_reaches_collection_routes() {
        let state = test_state();
        let (_, token) = seed_user(&state, "ana", Role::Professor).await;

        let (status, created) = send(
            &state,
            "POST",
            "/projetos/",
            Some(&token),
            Some(json!({"name": "Horta"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, listed) = send(&state, "GET", "/projetos/", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed[0]["projeto_id"], created["projeto_id"]);

        let (status, fetched) = send(
            &state,
            "GET",
            &format!("/projetos/{}/", created["projeto_id"]),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["name"], "Horta");
    }
}
