use std::sync::Arc;

use axum::{
    Router,
    body::{self, Body},
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
use serde_json::json;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use student_portal::{
    db::entities::{classroom, student, student_classroom},
    routes::{API_PREFIX, app},
    state::AppState,
    storage::LocalImageStore,
    test_helpers::{count_row, student_model, test_app, test_config, test_keys},
};

const BOUNDARY: &str = "student-portal-boundary";

fn api_path(path: &str) -> String {
    format!("{API_PREFIX}{path}")
}

fn app_with(db: DatabaseConnection, dir: &TempDir) -> Router {
    test_app(db, Arc::new(LocalImageStore::new(dir.path().join("images"))))
}

fn tempdir() -> TempDir {
    tempfile::tempdir().expect("tempdir should be created")
}

fn json_request(method: &str, path: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(api_path(path))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_request(fields: &[(&str, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        if *name == "image" {
            body.extend_from_slice(
                b"Content-Disposition: form-data; name=\"image\"; filename=\"photo.png\"\r\n\
                  Content-Type: image/png\r\n\r\n",
            );
        } else {
            body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            );
        }
        body.extend_from_slice(value);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(api_path("/update-image"))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_response(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.expect("request should succeed");
    let status = response.status();
    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("body should be json");
    (status, json)
}

fn student_payload(student_id: &str) -> serde_json::Value {
    json!({
        "student_id": student_id,
        "firstname": "Somchai",
        "lastname": "Dee",
        "phone": "0812345678",
        "email": "somchai@example.com",
        "password": "pw",
        "birthday": "07-03-2004",
        "gender": "male",
        "status": 1
    })
}

#[tokio::test]
async fn hello_answers_with_envelope() {
    let dir = tempdir();
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let (status, json) = json_response(
        app_with(db, &dir),
        Request::builder()
            .uri(api_path("/hello"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "success": true, "message": "hello" }));
}

#[tokio::test]
async fn signup_without_phone_fails_validation() {
    let dir = tempdir();
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let (status, json) = json_response(
        app_with(db, &dir),
        json_request("POST", "/signup", json!({ "password": "pw", "user_type": "student" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Validation failed");
    assert_eq!(json["error"], "PHONE_CANT_BE_EMPTY");
}

#[tokio::test]
async fn signup_returns_token() {
    let dir = tempdir();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[count_row(0)]])
        .append_query_results([[student_model("", "0812345678")]])
        .into_connection();

    let (status, json) = json_response(
        app_with(db, &dir),
        json_request(
            "POST",
            "/signup",
            json!({ "phone": "0812345678", "password": "pw", "user_type": "Student" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["phone"], "0812345678");
    assert_eq!(json["data"]["user_type"], "student");
    assert!(!json["data"]["access_token"].as_str().unwrap_or_default().is_empty());
}

#[tokio::test]
async fn signup_with_unknown_user_type_is_bad_request() {
    let dir = tempdir();
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let (status, json) = json_response(
        app_with(db, &dir),
        json_request(
            "POST",
            "/signup",
            json!({ "phone": "0812345678", "password": "pw", "user_type": "parent" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid user type");
}

#[tokio::test]
async fn signin_with_wrong_password_is_unauthorized() {
    let dir = tempdir();
    let mut stored = student_model("S001", "0812345678");
    stored.password_hash =
        student_portal::auth::hash_password("pw").expect("hash should succeed");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[stored]])
        .into_connection();

    let (status, json) = json_response(
        app_with(db, &dir),
        json_request(
            "POST",
            "/signin",
            json!({ "phone": "0812345678", "password": "nope", "user_type": "student" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "phone or password doesn't match");
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let dir = tempdir();
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let (status, json) = json_response(
        app_with(db, &dir),
        Request::builder()
            .method("POST")
            .uri(api_path("/create-student"))
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid request body");
}

#[tokio::test]
async fn same_student_id_in_lower_case_is_already_in_use() {
    let dir = tempdir();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[count_row(0)]])
        .append_query_results([[count_row(0)]])
        .append_query_results([[student_model("S001", "0812345678")]])
        .append_query_results([[count_row(1)]])
        .into_connection();
    let app = app_with(db, &dir);

    let (status, json) = json_response(
        app.clone(),
        json_request("POST", "/create-student", student_payload("S001")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "success": true, "message": "success" }));

    let (status, json) = json_response(
        app,
        json_request("POST", "/create-student", student_payload("s001")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["message"], "Already in use");
    assert_eq!(json["error"], "student ID already in use");
}

#[tokio::test]
async fn create_with_path_like_student_id_fails_validation() {
    let dir = tempdir();
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let (status, json) = json_response(
        app_with(db, &dir),
        json_request("POST", "/create-student", student_payload("../../x")),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"], "STUDENT_ID_INVALID");
}

#[tokio::test]
async fn create_with_bad_birthday_fails_validation() {
    let dir = tempdir();
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let mut payload = student_payload("S001");
    payload["birthday"] = json!("2004-03-07");

    let (status, json) = json_response(
        app_with(db, &dir),
        json_request("POST", "/create-student", payload),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(
        json["error"]
            .as_str()
            .unwrap_or_default()
            .starts_with("invalid birthday format")
    );
}

#[tokio::test]
async fn create_with_short_year_birthday_is_rejected_before_any_query() {
    let dir = tempdir();
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let mut payload = student_payload("S001");
    payload["birthday"] = json!("07-03-04");

    let (status, json) = json_response(
        app_with(db, &dir),
        json_request("POST", "/create-student", payload),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["message"], "Validation failed");
    assert_eq!(json["error"], "invalid birthday format: 07-03-04");
}

#[tokio::test]
async fn student_by_id_formats_dates() {
    let dir = tempdir();
    let stored = student::Model {
        birthday: NaiveDate::from_ymd_opt(2004, 3, 7),
        ..student_model("S001", "0812345678")
    };
    let id = stored.id;
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[stored]])
        .into_connection();

    let (status, json) = json_response(
        app_with(db, &dir),
        Request::builder()
            .uri(api_path(&format!("/student/{id}")))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "ok");
    assert_eq!(json["data"]["student_id"], "S001");
    assert_eq!(json["data"]["birthday"], "07-03-2004");
    assert_eq!(json["data"]["created_at"], "01-01-2026 00:00:00");
    assert!(json["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn student_by_unknown_id_is_not_found() {
    let dir = tempdir();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<student::Model>::new()])
        .into_connection();

    let (status, json) = json_response(
        app_with(db, &dir),
        Request::builder()
            .uri(api_path(&format!("/student/{}", Uuid::new_v4())))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "student not found");
}

#[tokio::test]
async fn student_lookup_by_query_upper_cases_key() {
    let dir = tempdir();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[student_model("S001", "0812345678")]])
        .into_connection();

    let (status, json) = json_response(
        app_with(db, &dir),
        Request::builder()
            .uri(api_path("/student?student_id=s001"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["student_id"], "S001");
}

#[tokio::test]
async fn student_lookup_without_key_fails_validation() {
    let dir = tempdir();
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let (status, json) = json_response(
        app_with(db, &dir),
        Request::builder()
            .uri(api_path("/student"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"], "STUDENT_ID_CANT_BE_EMPTY");
}

#[tokio::test]
async fn delete_of_missing_student_is_not_found() {
    let dir = tempdir();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[count_row(0)]])
        .into_connection();

    let (status, json) = json_response(
        app_with(db, &dir),
        json_request("DELETE", "/delete-student", json!({ "student_id": "S404" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "student ID not found");
}

#[tokio::test]
async fn update_of_existing_student_succeeds() {
    let dir = tempdir();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[student_model("S001", "0812345678")]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();
    let mut payload = student_payload("s001");
    payload["password"] = json!("");

    let (status, json) = json_response(
        app_with(db, &dir),
        json_request("PUT", "/update-student", payload),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "success");
}

#[tokio::test]
async fn image_upload_stores_one_file() {
    let dir = tempdir();
    let stored = student_model("S001", "0812345678");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[stored.clone()]])
        .append_query_results([[stored.clone()]])
        .append_query_results([[stored]])
        .into_connection();

    let (status, json) = json_response(
        app_with(db, &dir),
        multipart_request(&[("student_id", b"s001".as_slice()), ("image", b"\x89PNG".as_slice())]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "uploaded success");
    let files: Vec<_> = std::fs::read_dir(dir.path().join("images"))
        .expect("image dir should exist")
        .collect();
    assert_eq!(files.len(), 1);
}

#[tokio::test]
async fn image_upload_without_image_fails_validation() {
    let dir = tempdir();
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let (status, json) = json_response(
        app_with(db, &dir),
        multipart_request(&[("student_id", b"S001".as_slice())]),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"], "IMAGE_CANT_BE_EMPTY");
}

#[tokio::test]
async fn classroom_roster_keeps_class_name_key() {
    let dir = tempdir();
    let classroom_id = Uuid::new_v4();
    let member = student_model("S001", "0812345678");
    let link = student_classroom::Model {
        id: Uuid::new_v4(),
        student_id: member.id,
        classroom_id,
    };
    let room = classroom::Model {
        id: classroom_id,
        class_name: "CE-1".to_string(),
        class_year: 2024,
        subject_name: "Networks".to_string(),
    };
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[link]])
        .append_query_results([[room]])
        .append_query_results([[member]])
        .into_connection();

    let (status, json) = json_response(
        app_with(db, &dir),
        json_request(
            "POST",
            "/student-classroom",
            json!({ "classroom_id": classroom_id }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["className"], "CE-1");
    assert_eq!(json["data"]["subject_name"], "Networks");
    assert_eq!(
        json["data"]["student"],
        json!([{ "student_id": "S001", "firstname": "Somchai", "lastname": "Dee" }])
    );
}

#[tokio::test]
async fn empty_classroom_returns_empty_shell() {
    let dir = tempdir();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<student_classroom::Model>::new()])
        .into_connection();

    let (status, json) = json_response(
        app_with(db, &dir),
        json_request(
            "POST",
            "/student-classroom",
            json!({ "classroom_id": Uuid::new_v4() }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["id"], Uuid::nil().to_string());
    assert_eq!(json["data"]["className"], "");
    assert_eq!(json["data"]["student"], json!([]));
}

#[tokio::test]
async fn classroom_roster_without_id_fails_validation() {
    let dir = tempdir();
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let (status, json) = json_response(
        app_with(db, &dir),
        json_request("POST", "/student-classroom", json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["message"], "Validation failed");
    assert_eq!(json["error"], "CLASSROOM_ID_CANT_BE_EMPTY");
}

#[tokio::test]
async fn stored_images_are_served_from_public_path() {
    let dir = tempdir();
    std::fs::write(dir.path().join("S001123456.png"), b"png-bytes").expect("file should write");
    let mut cfg = test_config();
    cfg.storage.image_dir = dir.path().to_string_lossy().into_owned();
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let state = AppState::new(
        cfg,
        db,
        test_keys(),
        Arc::new(LocalImageStore::new(dir.path())),
    );

    let response = app(state)
        .oneshot(
            Request::builder()
                .uri("/ceit/2024/images/S001123456.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    assert_eq!(&body[..], b"png-bytes");
}

#[tokio::test]
async fn unknown_route_is_wrapped_in_envelope() {
    let dir = tempdir();
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let (status, json) = json_response(
        app_with(db, &dir),
        Request::builder()
            .uri(api_path("/nope"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn preflight_from_browser_origin_is_allowed() {
    let dir = tempdir();
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let response = app_with(db, &dir)
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri(api_path("/create-student"))
                .header("origin", "http://localhost:5173")
                .header("access-control-request-method", "POST")
                .header("access-control-request-headers", "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    let methods = headers["access-control-allow-methods"]
        .to_str()
        .expect("methods should be ascii");
    assert!(methods.contains("POST"));
    assert!(methods.contains("PUT"));
    assert!(methods.contains("DELETE"));
}
