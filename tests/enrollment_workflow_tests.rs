use axum::http::StatusCode;
use serde_json::json;

mod utils;

use utils::*;

#[tokio::test]
async fn test_student_enrolls_in_project_once() {
    let setup = TestSetupBuilder::new().with_student("u1").build().await;

    let student_id = setup.create_estudante("u1").await;
    let projeto_id = setup.create_projeto("u1", "Horta comunitária").await;

    let first = setup.enroll("u1", student_id, projeto_id).await;
    ResponseAssertion::of(&first)
        .has_status(StatusCode::CREATED)
        .has_field("status", json!("Ativo"))
        .has_field("student_id", json!(student_id));
    assert!(first.body["matricula_date"].is_string());

    let second = setup.enroll("u1", student_id, projeto_id).await;
    ResponseAssertion::of(&second)
        .has_status(StatusCode::CONFLICT)
        .has_error("already enrolled");

    let listed = setup
        .get(&format!("/matriculas/project/{}", projeto_id))
        .await;
    ResponseAssertion::of(&listed)
        .has_status(StatusCode::OK)
        .is_list_with_len(1);
}

#[tokio::test]
async fn test_concurrent_duplicate_enrollment() {
    let setup = TestSetupBuilder::new().with_student("u1").build().await;
    let student_id = setup.create_estudante("u1").await;
    let projeto_id = setup.create_projeto("u1", "Reciclagem").await;

    let (a, b) = futures::join!(
        setup.enroll("u1", student_id, projeto_id),
        setup.enroll("u1", student_id, projeto_id)
    );

    let mut statuses = vec![a.status, b.status];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::CONFLICT]);
}

#[tokio::test]
async fn test_deleting_project_removes_its_tasks() {
    let setup = TestSetupBuilder::new().with_student("u1").build().await;
    let projeto_id = setup.create_projeto("u1", "Alfabetização").await;
    let task_id = setup.create_task("u1", projeto_id, "Preparar material").await;

    let deleted = setup
        .delete_as("u1", &format!("/projetos/{}", projeto_id))
        .await;
    ResponseAssertion::of(&deleted).has_status(StatusCode::NO_CONTENT);

    let task = setup.get(&format!("/tasks/{}", task_id)).await;
    ResponseAssertion::of(&task)
        .has_status(StatusCode::NOT_FOUND)
        .has_error("Task not found");
}

#[tokio::test]
async fn test_deleting_student_removes_enrollments_and_assignments() {
    let setup = TestSetupBuilder::new().with_student("u1").build().await;
    let student_id = setup.create_estudante("u1").await;
    let projeto_id = setup.create_projeto("u1", "Biblioteca").await;
    let task_id = setup.create_task("u1", projeto_id, "Catalogar").await;

    let matricula = setup.enroll("u1", student_id, projeto_id).await;
    let assignment = setup
        .post_as(
            "u1",
            "/task-estudantes",
            json!({ "student_id": student_id, "task_id": task_id }),
        )
        .await;
    ResponseAssertion::of(&assignment).has_status(StatusCode::CREATED);

    let deleted = setup
        .delete_as("u1", &format!("/estudantes/{}", student_id))
        .await;
    ResponseAssertion::of(&deleted).has_status(StatusCode::NO_CONTENT);

    let matricula = setup
        .get(&format!("/matriculas/{}", matricula.body["matricula_id"]))
        .await;
    ResponseAssertion::of(&matricula).has_status(StatusCode::NOT_FOUND);
    let assignments = setup
        .get(&format!("/task-estudantes/task/{}", task_id))
        .await;
    ResponseAssertion::of(&assignments).is_list_with_len(0);
}

#[tokio::test]
async fn test_task_for_missing_project() {
    let setup = TestSetupBuilder::new().with_student("u1").build().await;

    let response = setup
        .post_as("u1", "/tasks", json!({ "projeto_id": 999, "name": "Órfã" }))
        .await;
    ResponseAssertion::of(&response)
        .has_status(StatusCode::NOT_FOUND)
        .has_error("Project not found");
}

#[tokio::test]
async fn test_list_respects_limit() {
    let setup = TestSetupBuilder::new().with_student("u1").build().await;
    for i in 0..7 {
        setup.create_projeto("u1", &format!("Projeto {}", i)).await;
    }

    let page = setup.get("/projetos?limit=5").await;
    ResponseAssertion::of(&page)
        .has_status(StatusCode::OK)
        .is_list_with_at_most(5);

    let rest = setup.get("/projetos?skip=5&limit=5").await;
    ResponseAssertion::of(&rest).is_list_with_len(2);
}

#[tokio::test]
async fn test_mutations_require_token() {
    let setup = TestSetupBuilder::new().build().await;

    let response = setup
        .request("POST", "/projetos", None, Some(json!({ "name": "Anônimo" })))
        .await;
    ResponseAssertion::of(&response)
        .has_status(StatusCode::UNAUTHORIZED)
        .has_error("Not authenticated");
}

#[tokio::test]
async fn test_only_admin_manages_ongs() {
    let setup = TestSetupBuilder::new()
        .with_student("u1")
        .with_admin("root")
        .build()
        .await;
    let ong = json!({ "ngo_name": "Mãos Dadas", "email": "contato@maosdadas.org" });

    let denied = setup.post_as("u1", "/ongs", ong.clone()).await;
    ResponseAssertion::of(&denied).has_status(StatusCode::FORBIDDEN);

    let created = setup.post_as("root", "/ongs", ong).await;
    ResponseAssertion::of(&created).has_status(StatusCode::CREATED);

    let projeto = setup
        .post_as(
            "u1",
            "/projetos",
            json!({ "name": "Sopão", "ngo_id": created.body["ngo_id"] }),
        )
        .await;
    ResponseAssertion::of(&projeto).has_status(StatusCode::CREATED);

    let by_ong = setup
        .get(&format!("/projetos/ong/{}", created.body["ngo_id"]))
        .await;
    ResponseAssertion::of(&by_ong).is_list_with_len(1);
}

#[tokio::test]
async fn test_current_user_matches_login() {
    let setup = TestSetupBuilder::new().with_student("u1").build().await;

    let me = setup
        .request("GET", "/users/me", Some(setup.token("u1")), None)
        .await;
    ResponseAssertion::of(&me)
        .has_status(StatusCode::OK)
        .has_field("username", json!("u1"))
        .has_field("role", json!("Estudante"))
        .has_field("user_id", json!(setup.user_id("u1")));
    assert!(me.body.get("password").is_none());
}

#[tokio::test]
async fn test_trailing_slash_collection_urls() {
    let setup = TestSetupBuilder::new().with_student("u1").build().await;
    let student_id = setup.create_estudante("u1").await;
    let projeto_id = setup.create_projeto("u1", "Mutirão").await;

    let enrolled = setup
        .post_as(
            "u1",
            "/matriculas/",
            json!({ "student_id": student_id, "projeto_id": projeto_id }),
        )
        .await;
    ResponseAssertion::of(&enrolled).has_status(StatusCode::CREATED);

    let listed = setup.get("/matriculas/").await;
    ResponseAssertion::of(&listed)
        .has_status(StatusCode::OK)
        .is_list_with_len(1);
}
