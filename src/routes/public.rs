use axum::{Router, routing::get};

use crate::response::{ApiResult, JsonApiResponse};

pub fn router() -> Router {
    Router::new().route("/hello", get(hello).post(hello))
}

async fn hello() -> ApiResult<()> {
    JsonApiResponse::message("hello")
}
