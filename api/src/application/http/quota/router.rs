use axum::{Router, routing::get};
use utoipa::OpenApi;

use super::handlers::get_quota::{__path_get_quota, get_quota};
use crate::application::http::server::app_state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_quota))]
pub struct QuotaApiDoc;

pub fn quota_routes(root_path: &str) -> Router<AppState> {
    Router::new().route(&format!("{}/quota", root_path), get(get_quota))
}
