use std::path::Path;

use anyhow::Context;
use bytes::Bytes;
use labelscan_core::{
    application::{LabelScanService, create_service},
    domain::{
        common::LabelScanConfig,
        quota::{DelayAdvice, UsageStats},
    },
};
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing::info;

use crate::{
    application::http::server::http_server::{router, state},
    args::{Args, Command, ServerArgs},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuotaReport {
    #[serde(flatten)]
    usage: UsageStats,
    /// `None` when the daily budget is spent.
    recommended_delay_ms: Option<u64>,
}

pub async fn run(args: Args) -> anyhow::Result<()> {
    let command = args.command.clone();
    let config = LabelScanConfig::from(args);

    match command {
        Command::Scan { image } => scan(config, &image).await,
        Command::Analyze { text } => analyze(config, text).await,
        Command::Quota => quota(config).await,
        Command::Ingredients { query, limit } => ingredients(config, &query, limit),
        Command::Serve(server) => serve(server, config).await,
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let output = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{output}");
    Ok(())
}

fn service(config: LabelScanConfig) -> anyhow::Result<LabelScanService> {
    create_service(config).context("failed to create LabelScan service")
}

async fn scan(config: LabelScanConfig, image: &Path) -> anyhow::Result<()> {
    let data = tokio::fs::read(image)
        .await
        .with_context(|| format!("failed to read {}", image.display()))?;

    let service = service(config)?;
    let handle = service.spawn_scan(Bytes::from(data))?;
    let mut progress = handle.subscribe();

    loop {
        let current = progress.borrow_and_update().clone();
        info!(
            scan_id = %current.scan_id,
            stage = ?current.stage,
            percent = current.percent,
            "{}",
            current.message
        );
        if current.stage.is_terminal() || progress.changed().await.is_err() {
            break;
        }
    }

    let result = handle.result().await;
    service.shutdown().await;

    let report = result.map_err(|e| anyhow::anyhow!(e.user_message()))?;
    print_json(&report)
}

async fn analyze(config: LabelScanConfig, text: Option<String>) -> anyhow::Result<()> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buffer = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buffer)
                .await
                .context("failed to read ingredient text from stdin")?;
            buffer
        }
    };

    if text.trim().is_empty() {
        anyhow::bail!("no ingredient text given");
    }

    let report = service(config)?.analyze_text(&text).await?;
    print_json(&report)
}

async fn quota(config: LabelScanConfig) -> anyhow::Result<()> {
    let service = service(config)?;
    let recommended_delay_ms = match service.quota().recommended_delay() {
        DelayAdvice::Blocked => None,
        DelayAdvice::Wait(delay) => Some(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)),
    };

    print_json(&QuotaReport {
        usage: service.usage().await,
        recommended_delay_ms,
    })
}

fn ingredients(config: LabelScanConfig, query: &str, limit: usize) -> anyhow::Result<()> {
    let service = service(config)?;
    print_json(&service.ingredients().search(query, limit))
}

async fn serve(server: ServerArgs, config: LabelScanConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", server.host, server.port);
    let state = state(server, config)?;
    let service = state.service.clone();
    let app = router(state)?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("LabelScan API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    service.shutdown().await;
    info!("LabelScan API stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
