//! Fixtures shared by unit tests and the router tests under `tests/`.

use std::{collections::BTreeMap, sync::Arc};

use axum::Router;
use chrono::{DateTime, FixedOffset, TimeZone};
use sea_orm::{DatabaseConnection, Value};
use uuid::Uuid;

use crate::{
    auth::JwtKeys,
    config::{AppConfig, AuthConfig},
    db::entities::{student, teacher, user},
    routes,
    services::ServiceContext,
    state::AppState,
    storage::ImageStore,
};

pub const TEST_SECRET: &str = "test-secret";

pub fn ts() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .expect("offset should be valid")
        .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
        .single()
        .expect("timestamp should be valid")
}

/// Row shape returned by `COUNT(*)` queries.
pub fn count_row(count: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::BigInt(Some(count)))])
}

pub fn student_model(student_id: &str, phone: &str) -> student::Model {
    let now = ts();
    student::Model {
        id: Uuid::new_v4(),
        created_at: now,
        updated_at: now,
        student_id: Some(student_id.to_string()),
        phone: phone.to_string(),
        firstname: "Somchai".to_string(),
        lastname: "Dee".to_string(),
        email: "somchai@example.com".to_string(),
        password_hash: "hash".to_string(),
        birthday: None,
        gender: "male".to_string(),
        status: 0,
        image: None,
        token: String::new(),
    }
}

pub fn teacher_model(phone: &str) -> teacher::Model {
    let now = ts();
    teacher::Model {
        id: Uuid::new_v4(),
        created_at: now,
        updated_at: now,
        phone: phone.to_string(),
        firstname: String::new(),
        lastname: String::new(),
        password_hash: "hash".to_string(),
        token: String::new(),
    }
}

pub fn user_model(email: &str, password_hash: &str, token: &str) -> user::Model {
    let now = ts();
    user::Model {
        id: Uuid::new_v4(),
        created_at: now,
        updated_at: now,
        name: "Alice".to_string(),
        email: email.to_string(),
        phone: None,
        password_hash: password_hash.to_string(),
        token: token.to_string(),
    }
}

pub fn test_keys() -> JwtKeys {
    JwtKeys::from_secret(TEST_SECRET.as_bytes())
}

pub fn test_config() -> AppConfig {
    AppConfig {
        auth: Some(AuthConfig {
            jwt_secret: TEST_SECRET.to_string(),
        }),
        ..AppConfig::default()
    }
}

pub fn test_services(db: &DatabaseConnection, images: Arc<dyn ImageStore>) -> ServiceContext {
    ServiceContext::new(db, test_keys(), images)
}

pub fn test_state(db: DatabaseConnection, images: Arc<dyn ImageStore>) -> Arc<AppState> {
    AppState::new(test_config(), db, test_keys(), images)
}

/// Full application stack, middleware included, over the given connection.
pub fn test_app(db: DatabaseConnection, images: Arc<dyn ImageStore>) -> Router {
    routes::app(test_state(db, images))
}
