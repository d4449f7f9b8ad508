use chrono::NaiveDate;
use sea_orm::prelude::DateTimeWithTimeZone;

use crate::error::AppError;

pub const BIRTHDAY_FORMAT: &str = "%d-%m-%Y";
pub const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// Strict zero-padded `DD-MM-YYYY`; an empty value means no birthday.
///
/// chrono accepts unpadded fields and short or signed years for `%d-%m-%Y`,
/// so a parsed date must format back to exactly the input.
pub fn parse_birthday(value: &str) -> Result<Option<NaiveDate>, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    let date = NaiveDate::parse_from_str(value, BIRTHDAY_FORMAT)
        .map_err(|err| AppError::validation(format!("invalid birthday format: {err}")))?;
    if date.format(BIRTHDAY_FORMAT).to_string() != value {
        return Err(AppError::validation(format!(
            "invalid birthday format: {value}"
        )));
    }
    Ok(Some(date))
}

pub fn format_birthday(value: Option<NaiveDate>) -> Option<String> {
    value.map(|date| date.format(BIRTHDAY_FORMAT).to_string())
}

pub fn format_timestamp(value: &DateTimeWithTimeZone) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}
