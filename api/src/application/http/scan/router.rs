use axum::{Router, extract::DefaultBodyLimit, routing::post};
use utoipa::OpenApi;

use super::handlers::create_scan::{__path_create_scan, create_scan};
use crate::application::http::server::app_state::AppState;

/// Room for a maximum-size image plus multipart framing.
const SCAN_BODY_LIMIT: usize = 6 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(paths(create_scan))]
pub struct ScanApiDoc;

pub fn scan_routes(root_path: &str) -> Router<AppState> {
    Router::new().route(
        &format!("{}/scans", root_path),
        post(create_scan).layer(DefaultBodyLimit::max(SCAN_BODY_LIMIT)),
    )
}
