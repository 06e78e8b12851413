use std::path::Path;

use tracing::{error, info};

use crate::domain::{
    common::{DatasetConfig, entities::app_errors::CoreError},
    ingredient::IngredientDatabase,
};

pub mod mappers;

use mappers::DatasetFile;

/// Dataset compiled into the binary.
pub const BUNDLED_DATASET: &str = include_str!("../../../data/ingredients.json");

pub fn parse_dataset(raw: &str) -> Result<IngredientDatabase, CoreError> {
    let file: DatasetFile =
        serde_json::from_str(raw).map_err(|e| CoreError::Dataset(e.to_string()))?;

    Ok(IngredientDatabase::new(file.into_records()))
}

pub fn read_dataset(path: &Path) -> Result<IngredientDatabase, CoreError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| CoreError::Dataset(format!("{}: {e}", path.display())))?;

    parse_dataset(&raw)
}

/// Loads the configured dataset, or the bundled one when no path is set.
/// A dataset that cannot be read yields an empty table: lookups then rely on
/// pattern matching alone.
pub fn load_ingredient_database(config: &DatasetConfig) -> IngredientDatabase {
    let loaded = match &config.path {
        Some(path) => read_dataset(path),
        None => parse_dataset(BUNDLED_DATASET),
    };

    match loaded {
        Ok(database) => {
            let stats = database.stats();
            info!(
                total = stats.total,
                safe = stats.safe,
                moderate = stats.moderate,
                high_concern = stats.high_concern,
                "Ingredient database loaded"
            );
            database
        }
        Err(e) => {
            error!(error = %e, "Failed to load ingredient database, continuing with an empty table");
            IngredientDatabase::empty()
        }
    }
}
