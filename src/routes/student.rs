use std::sync::Arc;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State, multipart::MultipartError},
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::UserType,
    db::entities::student,
    error::AppError,
    response::{ApiResult, JsonApiResponse},
    services::{
        ServiceContext,
        format::{format_birthday, format_timestamp},
        student_service::{AccountSession, ClassroomRoster, StudentInput},
    },
    state::AppState,
    validation::{ValidatedJson, validate},
};

#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[serde(default)]
    #[validate(custom(function = "crate::validation::phone_number"))]
    pub phone: String,
    #[serde(default)]
    #[validate(custom(function = "crate::validation::password"))]
    pub password: String,
    #[serde(default)]
    #[validate(custom(
        function = "crate::validation::not_blank",
        message = "USER_TYPE_CANT_BE_EMPTY"
    ))]
    pub user_type: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStudentRequest {
    #[serde(default)]
    #[validate(custom(function = "crate::validation::student_id"))]
    pub student_id: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    #[validate(custom(function = "crate::validation::phone_number"))]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    #[validate(custom(function = "crate::validation::password"))]
    pub password: String,
    #[serde(default)]
    pub birthday: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub status: i32,
}

/// Full-record update. A blank `password` keeps the current one.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStudentRequest {
    #[serde(default)]
    #[validate(custom(function = "crate::validation::student_id"))]
    pub student_id: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    #[validate(custom(function = "crate::validation::phone_number"))]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub birthday: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub status: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct StudentIdRequest {
    #[serde(default)]
    #[validate(custom(function = "crate::validation::student_id"))]
    pub student_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ClassroomIdRequest {
    #[serde(default)]
    #[validate(required(message = "CLASSROOM_ID_CANT_BE_EMPTY"))]
    pub classroom_id: Option<Uuid>,
}

#[derive(Debug, Validate)]
struct ImageUploadRequest {
    #[validate(custom(function = "crate::validation::student_id"))]
    student_id: String,
    #[validate(length(min = 1, message = "IMAGE_CANT_BE_EMPTY"))]
    image: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub phone: String,
    pub user_type: UserType,
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct StudentResponse {
    pub id: Uuid,
    pub student_id: String,
    pub firstname: String,
    pub lastname: String,
    pub phone: String,
    pub email: String,
    pub birthday: Option<String>,
    pub gender: String,
    pub status: i32,
    pub image: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct RosterStudent {
    pub student_id: String,
    pub firstname: String,
    pub lastname: String,
}

#[derive(Debug, Serialize)]
pub struct ClassroomRosterResponse {
    pub id: Uuid,
    pub classroom_id: Uuid,
    #[serde(rename = "className")]
    pub class_name: String,
    pub subject_name: String,
    pub student: Vec<RosterStudent>,
}

pub fn router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.storage.max_upload_bytes;
    Router::new()
        .route("/signup", post(sign_up))
        .route("/signin", post(sign_in))
        .route("/students", get(list_students))
        .route("/student", get(find_by_student_id))
        .route("/student/{id}", get(find_by_id))
        .route("/create-student", post(create_student))
        .route("/update-student", put(update_student))
        .route("/delete-student", delete(delete_student))
        .route(
            "/update-image",
            post(upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/student-classroom", post(classroom_roster))
        .with_state(state)
}

async fn sign_up(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<CredentialsRequest>,
) -> ApiResult<SessionResponse> {
    let service = ServiceContext::from_state(state.as_ref()).student();
    let session = service
        .sign_up(&body.phone, &body.password, &body.user_type)
        .await?;
    JsonApiResponse::ok(session.into())
}

async fn sign_in(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<CredentialsRequest>,
) -> ApiResult<SessionResponse> {
    let service = ServiceContext::from_state(state.as_ref()).student();
    let session = service
        .sign_in(&body.phone, &body.password, &body.user_type)
        .await?;
    JsonApiResponse::ok(session.into())
}

async fn list_students(State(state): State<Arc<AppState>>) -> ApiResult<Vec<StudentResponse>> {
    let service = ServiceContext::from_state(state.as_ref()).student();
    let students = service.list().await?;
    JsonApiResponse::ok(students.into_iter().map(StudentResponse::from).collect())
}

async fn find_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StudentResponse> {
    let service = ServiceContext::from_state(state.as_ref()).student();
    let student = service.find_by_id(id).await?;
    JsonApiResponse::ok(student.into())
}

async fn find_by_student_id(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StudentIdRequest>,
) -> ApiResult<StudentResponse> {
    validate(&query)?;
    let service = ServiceContext::from_state(state.as_ref()).student();
    let student = service.find_by_student_id(&query.student_id).await?;
    JsonApiResponse::ok(student.into())
}

async fn create_student(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<CreateStudentRequest>,
) -> ApiResult<()> {
    let service = ServiceContext::from_state(state.as_ref()).student();
    service.create(body.into()).await?;
    JsonApiResponse::message("success")
}

async fn update_student(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<UpdateStudentRequest>,
) -> ApiResult<()> {
    let service = ServiceContext::from_state(state.as_ref()).student();
    service.update(body.into()).await?;
    JsonApiResponse::message("success")
}

async fn delete_student(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<StudentIdRequest>,
) -> ApiResult<()> {
    let service = ServiceContext::from_state(state.as_ref()).student();
    service.delete(&body.student_id).await?;
    JsonApiResponse::message("success")
}

/// Multipart form with a `student_id` text field and an `image` file field.
async fn upload_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<()> {
    let mut request = ImageUploadRequest {
        student_id: String::new(),
        image: Vec::new(),
    };
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "student_id" => request.student_id = field.text().await.map_err(multipart_error)?,
            "image" => request.image = field.bytes().await.map_err(multipart_error)?.to_vec(),
            _ => {}
        }
    }
    validate(&request)?;

    let service = ServiceContext::from_state(state.as_ref()).student();
    service
        .upload_image(&request.student_id, &request.image)
        .await?;
    JsonApiResponse::message("uploaded success")
}

async fn classroom_roster(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<ClassroomIdRequest>,
) -> ApiResult<ClassroomRosterResponse> {
    let Some(classroom_id) = body.classroom_id else {
        return Err(AppError::validation("CLASSROOM_ID_CANT_BE_EMPTY"));
    };
    let service = ServiceContext::from_state(state.as_ref()).student();
    let roster = service.classroom_roster(classroom_id).await?;
    JsonApiResponse::ok(roster.into())
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::bad_request(err.body_text())
}

impl From<AccountSession> for SessionResponse {
    fn from(session: AccountSession) -> Self {
        Self {
            phone: session.phone,
            user_type: session.user_type,
            access_token: session.access_token,
        }
    }
}

impl From<student::Model> for StudentResponse {
    fn from(model: student::Model) -> Self {
        Self {
            id: model.id,
            student_id: model.student_id.unwrap_or_default(),
            firstname: model.firstname,
            lastname: model.lastname,
            phone: model.phone,
            email: model.email,
            birthday: format_birthday(model.birthday),
            gender: model.gender,
            status: model.status,
            image: model.image,
            created_at: format_timestamp(&model.created_at),
            updated_at: format_timestamp(&model.updated_at),
        }
    }
}

impl From<ClassroomRoster> for ClassroomRosterResponse {
    fn from(roster: ClassroomRoster) -> Self {
        Self {
            id: roster.id,
            classroom_id: roster.classroom_id,
            class_name: roster.class_name,
            subject_name: roster.subject_name,
            student: roster
                .students
                .into_iter()
                .map(|student| RosterStudent {
                    student_id: student.student_id.unwrap_or_default(),
                    firstname: student.firstname,
                    lastname: student.lastname,
                })
                .collect(),
        }
    }
}

impl From<CreateStudentRequest> for StudentInput {
    fn from(body: CreateStudentRequest) -> Self {
        Self {
            student_id: body.student_id,
            firstname: body.firstname,
            lastname: body.lastname,
            phone: body.phone,
            email: body.email,
            password: body.password,
            birthday: body.birthday,
            gender: body.gender,
            status: body.status,
        }
    }
}

impl From<UpdateStudentRequest> for StudentInput {
    fn from(body: UpdateStudentRequest) -> Self {
        Self {
            student_id: body.student_id,
            firstname: body.firstname,
            lastname: body.lastname,
            phone: body.phone,
            email: body.email,
            password: body.password,
            birthday: body.birthday,
            gender: body.gender,
            status: body.status,
        }
    }
}
