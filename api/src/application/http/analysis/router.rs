use axum::{Router, routing::post};
use utoipa::OpenApi;

use super::handlers::analyze_text::{__path_analyze_text, analyze_text};
use crate::application::http::server::app_state::AppState;

#[derive(OpenApi)]
#[openapi(paths(analyze_text))]
pub struct AnalysisApiDoc;

pub fn analysis_routes(root_path: &str) -> Router<AppState> {
    Router::new().route(&format!("{}/analyses/text", root_path), post(analyze_text))
}
