use axum::extract::State;
use labelscan_core::domain::ingredient::DatabaseStats;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::http::server::{
    api_entities::{api_error::ApiError, response::Response},
    app_state::AppState,
};

#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GetIngredientStatsResponse {
    pub data: DatabaseStats,
}

#[utoipa::path(
    get,
    path = "/ingredients/stats",
    tag = "ingredient",
    summary = "Ingredient database statistics",
    description = "Number of known ingredients in each risk category",
    responses(
        (status = 200, body = GetIngredientStatsResponse)
    )
)]
pub async fn get_ingredient_stats(
    State(state): State<AppState>,
) -> Result<Response<GetIngredientStatsResponse>, ApiError> {
    Ok(Response::OK(GetIngredientStatsResponse {
        data: state.service.ingredients().stats(),
    }))
}
