use axum::extract::State;
use labelscan_core::domain::quota::UsageStats;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::http::server::{
    api_entities::{api_error::ApiError, response::Response},
    app_state::AppState,
};

#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GetQuotaResponse {
    pub data: UsageStats,
}

#[utoipa::path(
    get,
    path = "/quota",
    tag = "quota",
    summary = "Get AI usage",
    description = "Requests made today against the daily AI budget and time until it resets",
    responses(
        (status = 200, body = GetQuotaResponse)
    )
)]
pub async fn get_quota(
    State(state): State<AppState>,
) -> Result<Response<GetQuotaResponse>, ApiError> {
    Ok(Response::OK(GetQuotaResponse {
        data: state.service.usage().await,
    }))
}
