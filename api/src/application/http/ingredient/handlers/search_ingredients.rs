use axum::extract::{Query, State};
use labelscan_core::domain::ingredient::{DEFAULT_SEARCH_LIMIT, IngredientRecord};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::http::server::{
    api_entities::{
        api_error::{ApiError, ApiErrorResponse},
        response::Response,
    },
    app_state::AppState,
};

#[derive(Debug, Serialize, Deserialize, IntoParams, ToSchema, Validate)]
#[into_params(parameter_in = Query)]
pub struct SearchIngredientsParams {
    /// Part of an ingredient name. Queries shorter than two characters match nothing.
    #[validate(length(min = 1, max = 100, message = "q must be between 1 and 100 characters"))]
    #[schema(example = "oil")]
    pub q: String,
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    #[schema(example = 10)]
    pub limit: Option<usize>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchIngredientsResponse {
    pub data: Vec<IngredientRecord>,
}

#[utoipa::path(
    get,
    path = "/ingredients",
    tag = "ingredient",
    summary = "Search ingredients",
    description = "Substring search over the ingredient database, most severe matches first",
    params(SearchIngredientsParams),
    responses(
        (status = 200, body = SearchIngredientsResponse),
        (status = 400, body = ApiErrorResponse),
    )
)]
pub async fn search_ingredients(
    State(state): State<AppState>,
    Query(params): Query<SearchIngredientsParams>,
) -> Result<Response<SearchIngredientsResponse>, ApiError> {
    params
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    let records = state.service.ingredients().search(&params.q, limit);

    Ok(Response::OK(SearchIngredientsResponse { data: records }))
}
