mod common;

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use common::{seed_exam, settings, setup_db, store};
use exambank_server::api::{AppState, create_router};
use exambank_server::config::ServerConfig;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use tower::ServiceExt;

const BOUNDARY: &str = "exambank-test-boundary";

fn app(db: &DatabaseConnection) -> Router {
    let state = Arc::new(AppState::new(db.clone(), store(), settings()));
    create_router(state, &ServerConfig::default())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("router responds");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a str),
}

fn multipart(method: &str, uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = String::new();
    for part in parts {
        body.push_str(&format!("--{BOUNDARY}\r\n"));
        match part {
            Part::Text(name, value) => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                ));
            }
            Part::File(name, file_name, content_type) => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                     Content-Type: {content_type}\r\n\r\nbytes\r\n"
                ));
            }
        }
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request")
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn health_check_reports_ok() {
    let db = setup_db().await;

    let (status, body) = send(app(&db), get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn missing_exam_id_is_a_bad_request() {
    let db = setup_db().await;

    let (status, body) = send(
        app(&db),
        get("/api/questions/getQuestionByPartAndExam?part_id=1"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Exam or part is required!"}));
}

#[tokio::test]
async fn create_then_read_through_http() {
    let db = setup_db().await;
    let scopes = seed_exam(&db, "Mock 1", &["Listening"]).await;
    let (exam_id, part_id) = (scopes[0].exam_id, scopes[0].part_id);
    let app = app(&db);

    let (status, body) = send(
        app.clone(),
        multipart(
            "POST",
            &format!("/api/questions/createQuestion?part_id={part_id}&exam_id={exam_id}"),
            &[
                Part::Text("title", "Passage"),
                Part::Text("questions[0][title]", "Q1"),
                Part::Text("questions[0][option]", r#"{"A":"x","B":"y"}"#),
                Part::Text("questions[0][correct_option]", "A"),
                Part::Text("questions[0][score]", "5"),
                Part::File("questions[0][elements]", "q1.png", "image/png"),
            ],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Questions created successfully.");
    assert_eq!(body["newGroup"]["order"], 1);
    assert_eq!(body["newGroup"]["title"], "Passage");

    let (status, page) = send(
        app,
        get(&format!(
            "/api/questions/getQuestionByPartAndExam?exam_id={exam_id}&part_id={part_id}"
        )),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["totalPages"], 1);
    let question = &page["data"][0]["questions"][0];
    assert_eq!(question["title"], "Q1");
    assert_eq!(question["option"], json!({"A": "x", "B": "y"}));
    assert_eq!(question["order"], 1);
    assert_eq!(question["global_order"], 1);
    assert_eq!(question["display_order"], 1);
    assert_eq!(question["elements"][0]["type"], "image");
}

#[tokio::test]
async fn update_with_malformed_option_is_rejected() {
    let db = setup_db().await;
    let scopes = seed_exam(&db, "Mock 1", &["Listening"]).await;
    let (exam_id, part_id) = (scopes[0].exam_id, scopes[0].part_id);
    let app = app(&db);

    let (status, _) = send(
        app.clone(),
        multipart(
            "POST",
            &format!("/api/questions/createQuestion?part_id={part_id}&exam_id={exam_id}"),
            &[Part::Text(
                "questions",
                r#"[{"title":"Q1","option":{"A":"x"},"correct_option":"A","score":1}]"#,
            )],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app.clone(),
        multipart(
            "PUT",
            "/api/questions/update?question_id=1",
            &[Part::Text("title", "Changed"), Part::Text("option", "{bad json")],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Invalid options format"}));

    let (_, page) = send(
        app,
        get(&format!(
            "/api/questions/getQuestionByPartAndExam?exam_id={exam_id}&part_id={part_id}"
        )),
    )
    .await;
    assert_eq!(page["data"][0]["questions"][0]["title"], "Q1");
}

#[tokio::test]
async fn update_and_delete_need_a_question_id() {
    let db = setup_db().await;
    let app = app(&db);

    let (status, body) = send(
        app.clone(),
        Request::builder()
            .method("DELETE")
            .uri("/api/questions/delete")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Question ID is required!"}));

    let (status, body) = send(
        app,
        Request::builder()
            .method("DELETE")
            .uri("/api/questions/delete?question_id=9")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Question not found"}));
}

#[tokio::test]
async fn field_errors_are_listed() {
    let db = setup_db().await;
    let scopes = seed_exam(&db, "Mock 1", &["Listening"]).await;
    let (exam_id, part_id) = (scopes[0].exam_id, scopes[0].part_id);

    let (status, body) = send(
        app(&db),
        multipart(
            "POST",
            &format!("/api/questions/createQuestion?part_id={part_id}&exam_id={exam_id}"),
            &[
                Part::Text("questions[0][option][A]", "x"),
                Part::Text("questions[0][correct_option]", "A"),
                Part::Text("questions[0][score]", "2"),
            ],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": [{"field": "questions[0].title", "message": "Title is required"}]})
    );
}

#[tokio::test]
async fn attachment_for_a_skipped_index_is_rejected() {
    let db = setup_db().await;
    let scopes = seed_exam(&db, "Mock 1", &["Listening"]).await;
    let (exam_id, part_id) = (scopes[0].exam_id, scopes[0].part_id);
    let app = app(&db);
    let uri = format!("/api/questions/createQuestion?part_id={part_id}&exam_id={exam_id}");

    let (status, body) = send(
        app.clone(),
        multipart(
            "POST",
            &uri,
            &[
                Part::Text("questions[0][title]", "Q1"),
                Part::Text("questions[0][option][A]", "x"),
                Part::Text("questions[0][correct_option]", "A"),
                Part::Text("questions[0][score]", "1"),
                Part::Text("questions[5][title]", "Q6"),
                Part::Text("questions[5][option][A]", "x"),
                Part::Text("questions[5][correct_option]", "A"),
                Part::Text("questions[5][score]", "1"),
                Part::File("questions[1][elements]", "orphan.png", "image/png"),
            ],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": "Attachments reference unknown question 1"})
    );

    let (_, page) = send(
        app,
        get(&format!(
            "/api/questions/getQuestionByPartAndExam?exam_id={exam_id}&part_id={part_id}"
        )),
    )
    .await;
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn spreadsheet_import_and_catalog_routes() {
    let db = setup_db().await;
    let app = app(&db);

    let (status, body) = send(
        app.clone(),
        json_request("POST", "/api/parts", json!({"name": "Listening"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["part"]["order"], 1);

    let (status, body) = send(
        app.clone(),
        json_request(
            "POST",
            "/api/questions/uploadExcel",
            json!({"file": {
                "examAndSubject": [{"Subject": "IELTS", "Exam": "Mock 2"}],
                "detailQuestions": [
                    {"Part": "Listening", "Order": 1, "Question": "Q1",
                     "Option A": "a", "Option B": "b", "Correct option": "Option B"}
                ]
            }}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["results"][0]["part"], "Listening");
    assert_eq!(body["results"][0]["questionsCount"], 1);

    let (status, body) = send(
        app.clone(),
        json_request("POST", "/api/exams", json!({"subject_id": 1, "name": "Mock 2"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Exam \"Mock 2\" already exists"}));

    let (status, sections) = send(app.clone(), get("/api/questions/getAllQuestionOnExam/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sections[0]["part"], "Listening");
    assert_eq!(sections[0]["data"][0]["questions"][0]["correct_option"], "B");

    let (status, parts) = send(app, get("/api/parts")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parts, json!([{"id": 1, "name": "Listening", "order": 1}]));
}
