pub mod jwt;
pub mod password;

use serde::{Deserialize, Serialize};

pub use jwt::{JwtKeys, TokenError, check_token, new_access_token};
pub use password::{hash_password, verify_password};

/// Bearer token claims. Both `jti` and `iss` hold the subject the token was issued for.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub jti: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Which account family a phone sign-up or sign-in targets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Teacher,
    Student,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Teacher => "teacher",
            UserType::Student => "student",
        }
    }
}

impl TryFrom<&str> for UserType {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "teacher" => Ok(UserType::Teacher),
            "student" => Ok(UserType::Student),
            _ => Err(()),
        }
    }
}
