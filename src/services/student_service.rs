use std::{collections::HashMap, io::ErrorKind, path::Path, sync::Arc};

use rand::Rng;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{JwtKeys, UserType, hash_password, new_access_token, verify_password},
    db::dao::{ClassroomDao, DaoBase, DaoLayerError, StudentDao, StudentProfile, TeacherDao},
    db::entities::student,
    error::AppError,
    services::format::parse_birthday,
    storage::ImageStore,
    validation::is_file_name_safe,
};

pub const PHONE_IN_USE: &str = "phone number already in use";
pub const STUDENT_ID_IN_USE: &str = "student ID already in use";
pub const STUDENT_ID_NOT_FOUND: &str = "student ID not found";
pub const INVALID_STUDENT_ID: &str = "invalid student ID";
pub const STUDENT_NOT_FOUND: &str = "student not found";
pub const INVALID_USER_TYPE: &str = "invalid user type";
pub const CREDENTIALS_MISMATCH: &str = "phone or password doesn't match";

/// Result of a phone sign-up or sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSession {
    pub phone: String,
    pub user_type: UserType,
    pub access_token: String,
}

/// Student record as submitted for create and update. `birthday` is `DD-MM-YYYY`
/// or empty; an empty `password` on update keeps the stored hash.
#[derive(Debug, Clone, Default)]
pub struct StudentInput {
    pub student_id: String,
    pub firstname: String,
    pub lastname: String,
    pub phone: String,
    pub email: String,
    pub password: String,
    pub birthday: String,
    pub gender: String,
    pub status: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassroomRoster {
    pub id: Uuid,
    pub classroom_id: Uuid,
    pub class_name: String,
    pub subject_name: String,
    pub students: Vec<student::Model>,
}

/// Student ids are compared and stored upper-cased.
pub fn normalize_student_id(student_id: &str) -> String {
    student_id.trim().to_uppercase()
}

/// Normalizes a student id that will end up in an image file name.
fn checked_student_id(student_id: &str) -> Result<String, AppError> {
    let student_id = normalize_student_id(student_id);
    if student_id.is_empty() || !is_file_name_safe(&student_id) {
        return Err(AppError::bad_request(INVALID_STUDENT_ID));
    }
    Ok(student_id)
}

fn credentials_mismatch() -> AppError {
    AppError::password_mismatch(CREDENTIALS_MISMATCH)
}

fn parse_user_type(value: &str) -> Result<UserType, AppError> {
    UserType::try_from(value).map_err(|_| AppError::bad_request(INVALID_USER_TYPE))
}

#[derive(Clone)]
pub struct StudentService {
    students: StudentDao,
    teachers: TeacherDao,
    classrooms: ClassroomDao,
    jwt: JwtKeys,
    images: Arc<dyn ImageStore>,
}

impl StudentService {
    pub fn new(
        students: StudentDao,
        teachers: TeacherDao,
        classrooms: ClassroomDao,
        jwt: JwtKeys,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            students,
            teachers,
            classrooms,
            jwt,
            images,
        }
    }

    pub async fn sign_up(
        &self,
        phone: &str,
        password: &str,
        user_type: &str,
    ) -> Result<AccountSession, AppError> {
        let user_type = parse_user_type(user_type)?;

        let taken = match user_type {
            UserType::Teacher => self.teachers.phone_taken(phone).await?,
            UserType::Student => self.students.phone_taken(phone, None).await?,
        };
        if taken {
            return Err(AppError::already_in_use(PHONE_IN_USE));
        }

        let password_hash = hash_password(password)?;
        let access_token = new_access_token(&self.jwt, phone)?;

        match user_type {
            UserType::Teacher => {
                self.teachers
                    .create_account(phone, &password_hash, &access_token)
                    .await?;
            }
            UserType::Student => {
                self.students
                    .create_account(phone, &password_hash, &access_token)
                    .await?;
            }
        }
        info!(phone, user_type = user_type.as_str(), "account signed up");

        Ok(AccountSession {
            phone: phone.to_string(),
            user_type,
            access_token,
        })
    }

    /// Verifies credentials only. The returned session carries an empty
    /// `access_token`; callers that need a token must sign up again.
    pub async fn sign_in(
        &self,
        phone: &str,
        password: &str,
        user_type: &str,
    ) -> Result<AccountSession, AppError> {
        let user_type = parse_user_type(user_type)?;

        let stored_hash = match user_type {
            UserType::Teacher => self
                .teachers
                .find_by_phone(phone)
                .await?
                .map(|teacher| teacher.password_hash),
            UserType::Student => self
                .students
                .find_by_phone(phone)
                .await?
                .map(|student| student.password_hash),
        }
        .ok_or_else(credentials_mismatch)?;

        verify_password(&stored_hash, password).map_err(|_| credentials_mismatch())?;

        Ok(AccountSession {
            phone: phone.to_string(),
            user_type,
            access_token: String::new(),
        })
    }

    pub async fn list(&self) -> Result<Vec<student::Model>, AppError> {
        Ok(self.students.list_all().await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<student::Model, AppError> {
        self.students.find_by_id(id).await.map_err(|err| match err {
            DaoLayerError::NotFound { .. } => AppError::not_found(STUDENT_NOT_FOUND),
            other => other.into(),
        })
    }

    pub async fn find_by_student_id(&self, student_id: &str) -> Result<student::Model, AppError> {
        self.students
            .find_by_student_id(&normalize_student_id(student_id))
            .await?
            .ok_or_else(|| AppError::not_found(STUDENT_ID_NOT_FOUND))
    }

    pub async fn create(&self, input: StudentInput) -> Result<(), AppError> {
        let student_id = checked_student_id(&input.student_id)?;
        let birthday = parse_birthday(&input.birthday)?;

        if self.students.student_id_taken(&student_id).await? {
            return Err(AppError::already_in_use(STUDENT_ID_IN_USE));
        }
        if self.students.phone_taken(&input.phone, None).await? {
            return Err(AppError::already_in_use(PHONE_IN_USE));
        }

        let password_hash = hash_password(&input.password)?;
        let profile = StudentProfile {
            firstname: input.firstname,
            lastname: input.lastname,
            phone: input.phone,
            email: input.email,
            birthday,
            gender: input.gender,
            status: input.status,
        };
        self.students
            .create_student(&student_id, profile, &password_hash)
            .await?;
        info!(student_id = %student_id, "student created");
        Ok(())
    }

    pub async fn update(&self, input: StudentInput) -> Result<(), AppError> {
        let student_id = normalize_student_id(&input.student_id);
        let birthday = parse_birthday(&input.birthday)?;

        if let Some(holder) = self.students.find_by_phone(&input.phone).await? {
            if holder.student_id.as_deref() != Some(student_id.as_str()) {
                return Err(AppError::already_in_use(PHONE_IN_USE));
            }
        }

        let password_hash = if input.password.trim().is_empty() {
            None
        } else {
            Some(hash_password(&input.password)?)
        };
        let profile = StudentProfile {
            firstname: input.firstname,
            lastname: input.lastname,
            phone: input.phone,
            email: input.email,
            birthday,
            gender: input.gender,
            status: input.status,
        };

        let matched = self
            .students
            .update_by_student_id(&student_id, profile, password_hash)
            .await?;
        if matched == 0 {
            return Err(AppError::not_found(STUDENT_ID_NOT_FOUND));
        }
        Ok(())
    }

    pub async fn delete(&self, student_id: &str) -> Result<(), AppError> {
        let student_id = normalize_student_id(student_id);

        if self.students.count_by_student_id(&student_id).await? == 0 {
            return Err(AppError::not_found(STUDENT_ID_NOT_FOUND));
        }
        self.students.delete_by_student_id(&student_id).await?;
        info!(student_id = %student_id, "student deleted");
        Ok(())
    }

    /// Students linked to a classroom, in link order. A classroom with no
    /// links yields an empty roster rather than an error.
    pub async fn classroom_roster(&self, classroom_id: Uuid) -> Result<ClassroomRoster, AppError> {
        let memberships = self.classrooms.memberships(classroom_id).await?;
        let Some(first) = memberships.first() else {
            return Ok(ClassroomRoster::default());
        };

        let classroom = self
            .classrooms
            .find_by_id(classroom_id)
            .await?
            .ok_or_else(|| AppError::not_found("classroom not found"))?;

        let ids: Vec<Uuid> = memberships.iter().map(|link| link.student_id).collect();
        let mut by_id: HashMap<Uuid, student::Model> = self
            .students
            .find_by_ids(ids)
            .await?
            .into_iter()
            .map(|student| (student.id, student))
            .collect();
        let students = memberships
            .iter()
            .filter_map(|link| by_id.remove(&link.student_id))
            .collect();

        Ok(ClassroomRoster {
            id: first.id,
            classroom_id: classroom.id,
            class_name: classroom.class_name,
            subject_name: classroom.subject_name,
            students,
        })
    }

    /// Replaces the student's image. Any previous file is removed first; the
    /// removal is not rolled back if the new write fails.
    pub async fn upload_image(&self, student_id: &str, bytes: &[u8]) -> Result<String, AppError> {
        let student_id = checked_student_id(student_id)?;
        let student = self
            .students
            .find_by_student_id(&student_id)
            .await?
            .ok_or_else(|| AppError::not_found(STUDENT_ID_NOT_FOUND))?;

        if let Some(previous) = student.image.as_deref().filter(|path| !path.is_empty()) {
            match self.images.remove(Path::new(previous)).await {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    warn!(path = previous, "previous image already missing");
                }
                Err(err) => {
                    return Err(AppError::internal(format!(
                        "failed to remove previous image: {err}"
                    )));
                }
            }
            self.students.set_image(student.id, None).await?;
        }

        self.images
            .ensure_dir()
            .await
            .map_err(|err| AppError::internal(format!("failed to create image directory: {err}")))?;

        let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000);
        let path = self.images.root().join(format!("{student_id}{suffix:06}.png"));
        self.images
            .write(&path, bytes)
            .await
            .map_err(|err| AppError::internal(format!("failed to write image: {err}")))?;

        let stored = path.to_string_lossy().into_owned();
        self.students
            .set_image(student.id, Some(stored.clone()))
            .await?;
        info!(student_id = %student_id, path = %stored, "student image uploaded");
        Ok(stored)
    }
}
