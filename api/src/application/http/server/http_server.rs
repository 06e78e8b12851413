use std::sync::OnceLock;

use anyhow::Context;
use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE},
    },
    routing::get,
};
use axum_prometheus::{PrometheusMetricLayer, metrics_exporter_prometheus::PrometheusHandle};
use labelscan_core::{application::create_service, domain::common::LabelScanConfig};
use tower_http::cors::CorsLayer;
use tracing::{debug, info_span};
use utoipa_rapidoc::RapiDoc;
use utoipa_redoc::{Redoc, Servable};
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    application::http::{
        analysis::router::analysis_routes,
        health::router::health_routes,
        ingredient::router::ingredient_routes,
        quota::router::quota_routes,
        scan::router::scan_routes,
        server::{app_state::AppState, openapi::openapi},
    },
    args::ServerArgs,
};

// The exporter installs a process-wide recorder, so the pair is built once.
static PROMETHEUS: OnceLock<(PrometheusMetricLayer<'static>, PrometheusHandle)> = OnceLock::new();

fn prometheus() -> (PrometheusMetricLayer<'static>, PrometheusHandle) {
    PROMETHEUS.get_or_init(PrometheusMetricLayer::pair).clone()
}

pub fn state(server: ServerArgs, config: LabelScanConfig) -> Result<AppState, anyhow::Error> {
    let service = create_service(config).context("failed to create LabelScan service")?;

    Ok(AppState::new(server, service))
}

///  Returns the [`Router`] of this application.
pub fn router(state: AppState) -> Result<Router, anyhow::Error> {
    let trace_layer = tower_http::trace::TraceLayer::new_for_http().make_span_with(
        |request: &axum::extract::Request| {
            let uri: String = request.uri().to_string();
            info_span!("http_request", method = ?request.method(), uri)
        },
    );

    let allowed_origins = state
        .server
        .allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("invalid allowed origin: {origin}"))
        })
        .collect::<Result<Vec<HeaderValue>, _>>()?;

    debug!("Allowed origins: {:?}", allowed_origins);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_origin(allowed_origins)
        .allow_headers([CONTENT_TYPE, CONTENT_LENGTH, ACCEPT]);

    let (prometheus_layer, metric_handle) = prometheus();

    let root_path = state.server.root_path.clone();

    let mut openapi = openapi();
    let mut paths = openapi.paths.clone();
    paths.paths = openapi
        .paths
        .paths
        .into_iter()
        .map(|(path, item)| (format!("{root_path}{path}"), item))
        .collect();
    openapi.paths = paths;

    let api_docs_url = format!("{}/api-docs/openapi.json", root_path);

    let router = axum::Router::new()
        .merge(Scalar::with_url(
            format!("{}/scalar", root_path),
            openapi.clone(),
        ))
        .merge(
            SwaggerUi::new(format!("{}/swagger-ui", root_path))
                .url(api_docs_url.clone(), openapi.clone()),
        )
        .merge(Redoc::with_url(format!("{}/redoc", root_path), openapi))
        .merge(RapiDoc::new(api_docs_url).path(format!("{}/rapidoc", root_path)))
        .merge(scan_routes(&root_path))
        .merge(analysis_routes(&root_path))
        .merge(quota_routes(&root_path))
        .merge(ingredient_routes(&root_path))
        .merge(health_routes(&root_path))
        .route(
            &format!("{}/metrics", root_path),
            get(|| async move { metric_handle.render() }),
        )
        .layer(trace_layer)
        .layer(cors)
        .layer(prometheus_layer)
        .with_state(state);
    Ok(router)
}
