use utoipa::OpenApi;

use crate::application::http::{
    analysis::router::AnalysisApiDoc, health::router::HealthApiDoc,
    ingredient::router::IngredientApiDoc, quota::router::QuotaApiDoc, scan::router::ScanApiDoc,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LabelScan API",
        description = "Local API for scanning food labels and rating their ingredients"
    ),
    tags(
        (name = "scan", description = "Label photo to analysis report"),
        (name = "analysis", description = "Ingredient text analysis"),
        (name = "quota", description = "Daily AI usage"),
        (name = "ingredient", description = "Ingredient knowledge base"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

/// Full document with every area's paths, relative to the root path.
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut openapi = ApiDoc::openapi();
    openapi.merge(ScanApiDoc::openapi());
    openapi.merge(AnalysisApiDoc::openapi());
    openapi.merge(QuotaApiDoc::openapi());
    openapi.merge(IngredientApiDoc::openapi());
    openapi.merge(HealthApiDoc::openapi());
    openapi
}
