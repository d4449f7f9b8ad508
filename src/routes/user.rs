use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    routing::post,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::entities::user,
    response::{ApiResult, JsonApiResponse},
    services::{
        ServiceContext,
        format::format_timestamp,
        user_service::{LoginOutcome, NewUser, UserSession},
    },
    state::AppState,
    validation::ValidatedJson,
};

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(custom(
        function = "crate::validation::not_blank",
        message = "EMAIL_CANT_BE_EMPTY"
    ))]
    pub email: String,
    #[serde(default)]
    #[validate(custom(function = "crate::validation::password"))]
    pub password: String,
}

/// Body of both sign-up and admin create; every field is required.
#[derive(Debug, Deserialize, Validate)]
pub struct NewUserRequest {
    #[serde(default)]
    #[validate(custom(
        function = "crate::validation::not_blank",
        message = "NAME_CANT_BE_EMPTY"
    ))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(
        function = "crate::validation::not_blank",
        message = "EMAIL_CANT_BE_EMPTY"
    ))]
    pub email: String,
    #[serde(default)]
    #[validate(custom(function = "crate::validation::password"))]
    pub password: String,
    #[serde(default)]
    #[validate(custom(function = "crate::validation::phone_number"))]
    pub phone: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    pub id: Uuid,
    #[serde(default)]
    #[validate(custom(
        function = "crate::validation::not_blank",
        message = "EMAIL_CANT_BE_EMPTY"
    ))]
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UserIdRequest {
    pub id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UserPhoneRequest {
    #[serde(default)]
    #[validate(custom(function = "crate::validation::phone_number"))]
    pub phone: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignUpUserResponse {
    pub name: String,
    pub email: String,
    pub access_token: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SignInUserResponse {
    pub email: String,
    pub access_token: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/sign-up", post(sign_up))
        .route("/sign-in", post(sign_in))
        .route("/get-all-user", post(list_users))
        .route("/get-by-id/{id}", post(find_by_id))
        .route("/get-by-phone", post(find_by_phone))
        .route("/create-user", post(create_user))
        .route("/update-user", post(update_user))
        .route("/delete-user", post(delete_user))
        .with_state(state)
}

/// An unknown email provisions the account and answers 201 without a token.
async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let service = ServiceContext::from_state(state.as_ref()).user();
    match service.login(&body.email, &body.password).await? {
        LoginOutcome::Created { email, .. } => JsonApiResponse::with_status(
            StatusCode::CREATED,
            "Create succeeded",
            LoginResponse {
                email,
                access_token: None,
            },
        ),
        LoginOutcome::Session {
            email,
            access_token,
        } => JsonApiResponse::ok(LoginResponse {
            email,
            access_token: Some(access_token),
        }),
    }
}

async fn sign_up(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<NewUserRequest>,
) -> ApiResult<SignUpUserResponse> {
    let service = ServiceContext::from_state(state.as_ref()).user();
    let session = service.sign_up(body.into()).await?;
    JsonApiResponse::ok(SignUpUserResponse {
        name: session.name,
        email: session.email,
        access_token: session.access_token,
        message: "sign up success".to_string(),
    })
}

async fn sign_in(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> ApiResult<SignInUserResponse> {
    let service = ServiceContext::from_state(state.as_ref()).user();
    let UserSession {
        email,
        access_token,
        ..
    } = service.sign_in(&body.email, &body.password).await?;
    JsonApiResponse::ok(SignInUserResponse {
        email,
        access_token,
        message: "sign in success".to_string(),
    })
}

async fn list_users(State(state): State<Arc<AppState>>) -> ApiResult<Vec<UserResponse>> {
    let service = ServiceContext::from_state(state.as_ref()).user();
    let users = service.list().await?;
    JsonApiResponse::ok(users.into_iter().map(UserResponse::from).collect())
}

async fn find_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<UserResponse> {
    let service = ServiceContext::from_state(state.as_ref()).user();
    let user = service.find_by_id(id).await?;
    JsonApiResponse::ok(user.into())
}

async fn find_by_phone(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<UserPhoneRequest>,
) -> ApiResult<UserResponse> {
    let service = ServiceContext::from_state(state.as_ref()).user();
    let user = service.find_by_phone(&body.phone).await?;
    JsonApiResponse::ok(user.into())
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<NewUserRequest>,
) -> ApiResult<()> {
    let service = ServiceContext::from_state(state.as_ref()).user();
    service.create(body.into()).await?;
    JsonApiResponse::message("Success")
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<()> {
    let service = ServiceContext::from_state(state.as_ref()).user();
    service.update(body.id, &body.email, body.name).await?;
    JsonApiResponse::message("Success")
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<UserIdRequest>,
) -> ApiResult<()> {
    let service = ServiceContext::from_state(state.as_ref()).user();
    service.delete(body.id).await?;
    JsonApiResponse::message("Success")
}

impl From<NewUserRequest> for NewUser {
    fn from(body: NewUserRequest) -> Self {
        Self {
            name: body.name,
            email: body.email,
            phone: body.phone,
            password: body.password,
        }
    }
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            created_at: format_timestamp(&model.created_at),
            updated_at: format_timestamp(&model.updated_at),
        }
    }
}
