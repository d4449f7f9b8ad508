use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use super::Claims;
use crate::error::AppError;

pub const ACCESS_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

#[derive(Clone)]
pub struct JwtKeys {
    pub enc: EncodingKey,
    pub dec: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            enc: EncodingKey::from_secret(secret),
            dec: DecodingKey::from_secret(secret),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(String),
}

pub fn now_unix() -> i64 {
    Utc::now().timestamp()
}

pub fn new_access_token(keys: &JwtKeys, subject: &str) -> Result<String, AppError> {
    new_access_token_at(keys, subject, now_unix())
}

pub fn new_access_token_at(keys: &JwtKeys, subject: &str, now: i64) -> Result<String, AppError> {
    let claims = Claims {
        jti: subject.to_string(),
        iss: subject.to_string(),
        iat: now,
        exp: now + ACCESS_TOKEN_TTL_SECS,
    };

    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".into());

    encode(&header, &claims, &keys.enc)
        .map_err(|err| AppError::internal(format!("Token encoding failed: {err}")))
}

pub fn check_token(keys: &JwtKeys, token: &str) -> Result<Claims, TokenError> {
    check_token_at(keys, token, now_unix())
}

/// Verifies the signature, then compares `exp` against `now` with no leeway.
pub fn check_token_at(keys: &JwtKeys, token: &str, now: i64) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;

    let claims = decode::<Claims>(token, &keys.dec, &validation)
        .map_err(|err| TokenError::Invalid(err.to_string()))?
        .claims;

    if claims.exp <= now {
        return Err(TokenError::Expired);
    }
    Ok(claims)
}
