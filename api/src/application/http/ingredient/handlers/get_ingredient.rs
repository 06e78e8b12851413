use axum::extract::{Path, State};
use labelscan_core::domain::ingredient::IngredientInfo;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::http::server::{
    api_entities::{
        api_error::{ApiError, ApiErrorResponse},
        response::Response,
    },
    app_state::AppState,
};

#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GetIngredientResponse {
    pub data: IngredientInfo,
}

#[utoipa::path(
    get,
    path = "/ingredients/{name}",
    tag = "ingredient",
    summary = "Explain an ingredient",
    description = "Stored explanation for a known ingredient, or one derived from its risk pattern. `known` tells the two apart.",
    params(
        ("name" = String, Path, description = "Ingredient name as printed on the label"),
    ),
    responses(
        (status = 200, body = GetIngredientResponse),
        (status = 400, body = ApiErrorResponse),
    )
)]
pub async fn get_ingredient(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> Result<Response<GetIngredientResponse>, ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "ingredient name must not be blank".to_string(),
        ));
    }

    Ok(Response::OK(GetIngredientResponse {
        data: state.service.ingredients().explain(name.trim()),
    }))
}
