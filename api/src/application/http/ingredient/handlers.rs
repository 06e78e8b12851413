pub mod get_ingredient;
pub mod get_ingredient_stats;
pub mod search_ingredients;
