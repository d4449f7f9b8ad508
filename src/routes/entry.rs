use std::sync::Arc;

use axum::{Router, middleware};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    middleware::{catch_panic_layer, cors_layer, json_error_middleware},
    state::AppState,
};

use super::{public, student, user};

pub const API_PREFIX: &str = "/web";

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .merge(public::router())
        .merge(student::router(Arc::clone(&state)))
        .merge(user::router(state));
    Router::new().nest(API_PREFIX, api)
}

/// The served application: API routes and stored images behind the shared layers.
pub fn app(state: Arc<AppState>) -> Router {
    let storage = state.config.storage.clone();
    let cors = cors_layer(&state.config.cors);
    Router::new()
        .merge(router(state))
        .nest_service(&storage.public_path, ServeDir::new(&storage.image_dir))
        .layer(middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
