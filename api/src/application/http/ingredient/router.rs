use axum::{Router, routing::get};
use utoipa::OpenApi;

use super::handlers::{
    get_ingredient::{__path_get_ingredient, get_ingredient},
    get_ingredient_stats::{__path_get_ingredient_stats, get_ingredient_stats},
    search_ingredients::{__path_search_ingredients, search_ingredients},
};
use crate::application::http::server::app_state::AppState;

#[derive(OpenApi)]
#[openapi(paths(search_ingredients, get_ingredient_stats, get_ingredient))]
pub struct IngredientApiDoc;

pub fn ingredient_routes(root_path: &str) -> Router<AppState> {
    Router::new()
        .route(
            &format!("{}/ingredients", root_path),
            get(search_ingredients),
        )
        .route(
            &format!("{}/ingredients/stats", root_path),
            get(get_ingredient_stats),
        )
        .route(
            &format!("{}/ingredients/{{name}}", root_path),
            get(get_ingredient),
        )
}
