use axum::extract::State;
use labelscan_core::domain::analysis::AnalysisReport;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::http::server::{
    api_entities::{
        api_error::{ApiError, ApiErrorResponse, ValidateJson},
        response::Response,
    },
    app_state::AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
pub struct AnalyzeTextRequest {
    /// Ingredient list as printed on the label.
    #[validate(length(
        min = 1,
        max = 5000,
        message = "text must be between 1 and 5000 characters"
    ))]
    pub text: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalyzeTextResponse {
    pub data: AnalysisReport,
}

#[utoipa::path(
    post,
    path = "/analyses/text",
    tag = "analysis",
    summary = "Analyze ingredient text",
    description = "Rates an ingredient list that was already transcribed, skipping OCR",
    request_body = AnalyzeTextRequest,
    responses(
        (status = 200, body = AnalyzeTextResponse),
        (status = 400, body = ApiErrorResponse),
        (status = 409, body = ApiErrorResponse, description = "A scan is running"),
    )
)]
pub async fn analyze_text(
    State(state): State<AppState>,
    ValidateJson(payload): ValidateJson<AnalyzeTextRequest>,
) -> Result<Response<AnalyzeTextResponse>, ApiError> {
    if payload.text.trim().is_empty() {
        return Err(ApiError::BadRequest("text must not be blank".to_string()));
    }

    let report = state.service.analyze_text(&payload.text).await?;

    Ok(Response::OK(AnalyzeTextResponse { data: report }))
}
