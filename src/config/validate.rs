use anyhow::{Result, bail};
use axum::http::HeaderValue;

use super::AppConfig;

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.general.host.trim().is_empty() {
        errors.push("general.host must not be empty".to_string());
    }

    if let Some(database) = cfg.database.as_ref() {
        if database.url.trim().is_empty() {
            errors.push("database.url must not be empty".to_string());
        }

        if database.min_idle > database.max_connections {
            errors.push(format!(
                "database.min_idle ({}) must be <= database.max_connections ({})",
                database.min_idle, database.max_connections
            ));
        }
    }

    if let Some(auth) = cfg.auth.as_ref() {
        if auth.jwt_secret.trim().is_empty() {
            errors.push("auth.jwt_secret must not be empty".to_string());
        }
    }

    if cfg.storage.image_dir.trim().is_empty() {
        errors.push("storage.image_dir must not be empty".to_string());
    }

    if !cfg.storage.public_path.starts_with('/') || cfg.storage.public_path == "/" {
        errors.push(format!(
            "storage.public_path ({}) must start with '/' and name a sub-path",
            cfg.storage.public_path
        ));
    }

    if cfg.storage.max_upload_bytes == 0 {
        errors.push("storage.max_upload_bytes must be > 0".to_string());
    }

    if !cfg.cors.allows_any() {
        for origin in cfg.cors.origins() {
            if HeaderValue::from_str(origin).is_err() || !origin.contains("://") {
                errors.push(format!("cors.allowed_origins entry ({origin}) is not an origin"));
            }
        }
    }

    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}
