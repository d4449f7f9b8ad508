use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::AppError;

pub const PHONE_CANT_BE_EMPTY: &str = "PHONE_CANT_BE_EMPTY";
pub const PHONE_INVALID: &str = "PHONE_INVALID";
pub const PASSWORD_CANT_BE_EMPTY: &str = "PASSWORD_CANT_BE_EMPTY";
pub const STUDENT_ID_CANT_BE_EMPTY: &str = "STUDENT_ID_CANT_BE_EMPTY";
pub const STUDENT_ID_INVALID: &str = "STUDENT_ID_INVALID";

const PHONE_MIN_LEN: usize = 9;
const PHONE_MAX_LEN: usize = 10;

/// JSON body extractor that runs `Validate` before the handler sees the value.
///
/// A body that does not decode is a `BadRequest`; a decoded body that breaks a
/// rule is a `Validation` error carrying the first failing rule's message.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| {
                tracing::debug!(error = %rejection.body_text(), "request body rejected");
                AppError::bad_request("invalid request body")
            })?;
        validate(&value)?;
        Ok(Self(value))
    }
}

/// Runs the declared rules and reports only the first failure.
///
/// Fields are visited in name order so the reported failure is stable across runs.
pub fn validate<T: Validate>(value: &T) -> Result<(), AppError> {
    value
        .validate()
        .map_err(|errors| AppError::validation(first_message(&errors)))
}

fn first_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<(String, &Vec<ValidationError>)> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| (field.to_string(), errs))
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .find_map(|(field, errs)| {
            errs.first().map(|err| match &err.message {
                Some(message) => message.to_string(),
                None => format!("{field}: {}", err.code),
            })
        })
        .unwrap_or_else(|| "validation failed".to_string())
}

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// Rejects empty and whitespace-only strings. Use with a `message` override.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// Student ids name image files on disk, so they may not contain path
/// separators or parent-directory steps.
pub fn is_file_name_safe(value: &str) -> bool {
    !value.contains(['/', '\\']) && !value.contains("..")
}

/// Required, and usable as an image file name.
pub fn student_id(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule_error("required", STUDENT_ID_CANT_BE_EMPTY));
    }
    if !is_file_name_safe(value) {
        return Err(rule_error("file_name", STUDENT_ID_INVALID));
    }
    Ok(())
}

pub fn password(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule_error("required", PASSWORD_CANT_BE_EMPTY));
    }
    Ok(())
}

/// Required, 9 to 10 characters.
pub fn phone_number(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule_error("required", PHONE_CANT_BE_EMPTY));
    }
    optional_phone_number(value)
}

/// Same length rule as `phone_number`, but an empty value is accepted.
pub fn optional_phone_number(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if !value.is_empty() && !(PHONE_MIN_LEN..=PHONE_MAX_LEN).contains(&len) {
        return Err(rule_error("length", PHONE_INVALID));
    }
    Ok(())
}
