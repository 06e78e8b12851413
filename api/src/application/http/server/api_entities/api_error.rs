use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use labelscan_core::domain::{
    common::entities::app_errors::CoreError, extraction::ExtractionError, scan::ScanError,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    UnprocessableEntity(String),

    #[error("{0}")]
    InternalServerError(String),
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct ApiErrorResponse {
    pub code: String,
    pub status: u16,
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "E_BAD_REQUEST",
            ApiError::NotFound(_) => "E_NOT_FOUND",
            ApiError::Conflict(_) => "E_SCAN_IN_PROGRESS",
            ApiError::UnprocessableEntity(_) => "E_EXTRACTION_FAILED",
            ApiError::InternalServerError(_) => "E_INTERNAL_SERVER_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ApiErrorResponse {
            code: self.code().to_string(),
            status: status.as_u16(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ScanError> for ApiError {
    fn from(error: ScanError) -> Self {
        match &error {
            ScanError::Extraction(ExtractionError::InvalidImage(_))
            | ScanError::Extraction(ExtractionError::InsufficientText { .. }) => {
                ApiError::UnprocessableEntity(error.user_message().to_string())
            }
            ScanError::Extraction(e) => {
                error!(error = %e, "Label extraction failed");
                ApiError::UnprocessableEntity(error.user_message().to_string())
            }
            ScanError::Busy => ApiError::Conflict(error.user_message().to_string()),
            ScanError::Abandoned => ApiError::InternalServerError(error.user_message().to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        error!(error = %error, "Core error");
        ApiError::InternalServerError("Internal server error".to_string())
    }
}

/// JSON body extractor that runs `validator` rules before the handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        value
            .validate()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        Ok(ValidateJson(value))
    }
}
