use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    auth::JwtKeys,
    db::dao::DaoContext,
    services::{student_service::StudentService, user_service::UserService},
    state::AppState,
    storage::ImageStore,
};

#[derive(Clone)]
pub struct ServiceContext {
    daos: DaoContext,
    jwt: JwtKeys,
    images: Arc<dyn ImageStore>,
}

impl ServiceContext {
    pub fn new(db: &DatabaseConnection, jwt: JwtKeys, images: Arc<dyn ImageStore>) -> Self {
        Self {
            daos: DaoContext::new(db),
            jwt,
            images,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(&state.db, state.jwt.clone(), Arc::clone(&state.images))
    }

    pub fn student(&self) -> StudentService {
        StudentService::new(
            self.daos.student(),
            self.daos.teacher(),
            self.daos.classroom(),
            self.jwt.clone(),
            Arc::clone(&self.images),
        )
    }

    pub fn user(&self) -> UserService {
        UserService::new(self.daos.user(), self.jwt.clone())
    }
}
