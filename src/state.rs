use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{auth::JwtKeys, config::AppConfig, storage::ImageStore};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DatabaseConnection,
    pub jwt: JwtKeys,
    pub images: Arc<dyn ImageStore>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: DatabaseConnection,
        jwt: JwtKeys,
        images: Arc<dyn ImageStore>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            db,
            jwt,
            images,
        })
    }
}
