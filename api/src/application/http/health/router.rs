use axum::{Router, routing::get};
use utoipa::OpenApi;

use super::handlers::get_health::{__path_get_health, get_health};
use crate::application::http::server::app_state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_health))]
pub struct HealthApiDoc;

pub fn health_routes(root_path: &str) -> Router<AppState> {
    Router::new().route(&format!("{}/health", root_path), get(get_health))
}
