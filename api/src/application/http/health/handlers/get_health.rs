use axum::extract::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::http::server::{
    api_entities::{api_error::ApiError, response::Response},
    app_state::AppState,
};

#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub ocr_ready: bool,
    pub known_ingredients: usize,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    summary = "Liveness",
    responses(
        (status = 200, body = HealthResponse)
    )
)]
pub async fn get_health(
    State(state): State<AppState>,
) -> Result<Response<HealthResponse>, ApiError> {
    Ok(Response::OK(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ocr_ready: state.service.orchestrator().reader().is_ready().await,
        known_ingredients: state.service.ingredients().len(),
    }))
}
