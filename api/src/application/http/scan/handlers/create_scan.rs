use axum::extract::{Multipart, State};
use bytes::Bytes;
use labelscan_core::domain::analysis::AnalysisReport;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::application::http::server::{
    api_entities::{
        api_error::{ApiError, ApiErrorResponse},
        response::Response,
    },
    app_state::AppState,
};

#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScanResponse {
    pub data: AnalysisReport,
}

#[allow(dead_code)]
#[derive(ToSchema)]
pub struct ScanUpload {
    /// JPEG, PNG, WebP, GIF or BMP photo of the ingredient list, at most 5 MiB.
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/scans",
    tag = "scan",
    summary = "Scan a label photo",
    description = "Runs OCR on the uploaded photo and rates the ingredients it finds. Falls back to offline scoring when the AI service is unavailable.",
    request_body(content = ScanUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = ScanResponse),
        (status = 400, body = ApiErrorResponse, description = "Missing or unreadable upload"),
        (status = 409, body = ApiErrorResponse, description = "Another scan is running"),
        (status = 422, body = ApiErrorResponse, description = "No usable text on the label"),
    )
)]
pub async fn create_scan(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response<ScanResponse>, ApiError> {
    let mut image: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() == Some("image") {
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read image: {}", e)))?;
            image = Some(data);
        }
    }

    let image = image.ok_or_else(|| ApiError::BadRequest("Missing image field".to_string()))?;

    info!(size = image.len(), "Scan requested");

    let report = state.service.scan(image).await?;

    Ok(Response::OK(ScanResponse { data: report }))
}
