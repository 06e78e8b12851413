use std::{path::PathBuf, time::Duration};

use chrono::FixedOffset;
use clap::{Parser, Subcommand};
use labelscan_core::domain::common::{
    DatasetConfig, LLMConfig, LabelScanConfig, OcrConfig, QuotaConfig, StorageConfig,
};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "labelscan",
    version,
    about = "Reads packaged food labels and rates their ingredients"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub llm: LLMArgs,

    #[command(flatten)]
    pub quota: QuotaArgs,

    #[command(flatten)]
    pub ocr: OcrArgs,

    #[command(flatten)]
    pub storage: StorageArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Extract and analyze the ingredient list in a label photo
    Scan {
        /// JPEG, PNG, WebP, GIF or BMP image of the label
        image: PathBuf,
    },
    /// Analyze ingredient text, read from stdin when omitted
    Analyze { text: Option<String> },
    /// Show today's AI usage
    Quota,
    /// Search the ingredient database
    Ingredients {
        query: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Serve the HTTP API on a local address
    Serve(ServerArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct LLMArgs {
    /// Without a key every analysis runs offline
    #[arg(long = "gemini-api-key", env = "GEMINI_API_KEY", global = true, hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    #[arg(
        long = "gemini-model",
        env = "GEMINI_MODEL",
        default_value = "gemini-1.5-flash",
        global = true
    )]
    pub gemini_model: String,

    #[arg(id = "ai_timeout_secs", long = "ai-timeout-secs", env = "AI_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub timeout_secs: u64,

    #[arg(
        long = "ai-min-interval-ms",
        env = "AI_MIN_INTERVAL_MS",
        default_value_t = 2000,
        global = true
    )]
    pub min_interval_ms: u64,
}

#[derive(clap::Args, Debug, Clone)]
pub struct QuotaArgs {
    #[arg(
        long = "max-daily-requests",
        env = "MAX_DAILY_REQUESTS",
        default_value_t = 1500,
        global = true
    )]
    pub max_daily_requests: u32,

    #[arg(long = "burst-limit", env = "BURST_LIMIT", default_value_t = 10, global = true)]
    pub burst_limit: usize,

    #[arg(
        long = "burst-window-secs",
        env = "BURST_WINDOW_SECS",
        default_value_t = 60,
        global = true
    )]
    pub burst_window_secs: u64,

    /// Offset of the quota day from UTC. Defaults to the local offset.
    #[arg(
        long = "quota-utc-offset-minutes",
        env = "QUOTA_UTC_OFFSET_MINUTES",
        allow_hyphen_values = true,
        value_parser = clap::value_parser!(i32).range(-1439..=1439),
        global = true
    )]
    pub utc_offset_minutes: Option<i32>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct OcrArgs {
    #[arg(
        long = "tesseract-path",
        env = "TESSERACT_PATH",
        default_value = "tesseract",
        global = true
    )]
    pub tesseract_path: PathBuf,

    #[arg(long = "ocr-language", env = "OCR_LANGUAGE", default_value = "eng", global = true)]
    pub language: String,

    #[arg(id = "ocr_timeout_secs", long = "ocr-timeout-secs", env = "OCR_TIMEOUT_SECS", default_value_t = 60, global = true)]
    pub timeout_secs: u64,
}

#[derive(clap::Args, Debug, Clone)]
pub struct StorageArgs {
    /// Where quota counters are kept between runs
    #[arg(long = "data-dir", env = "DATA_DIR", default_value = ".labelscan", global = true)]
    pub data_dir: PathBuf,

    /// Ingredient dataset to use instead of the bundled one
    #[arg(long = "ingredient-dataset", env = "INGREDIENT_DATASET", global = true)]
    pub ingredient_dataset: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServerArgs {
    #[arg(
        long = "server-allowed-origins",
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:5173"
    )]
    pub allowed_origins: Vec<String>,

    #[arg(long = "server-host", env = "SERVER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long = "server-port", env = "SERVER_PORT", default_value_t = 3333)]
    pub port: u16,

    #[arg(long = "server-root-path", env = "SERVER_ROOT_PATH", default_value = "")]
    pub root_path: String,
}

impl Default for ServerArgs {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:5173".to_string()],
            host: "127.0.0.1".to_string(),
            port: 3333,
            root_path: String::new(),
        }
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct LogArgs {
    /// Used when RUST_LOG is not set
    #[arg(long = "log-filter", env = "LOG_FILTER", default_value = "info", global = true)]
    pub filter: String,

    #[arg(long = "log-json", env = "LOG_JSON", global = true)]
    pub json: bool,
}

impl From<Args> for LabelScanConfig {
    fn from(args: Args) -> Self {
        let quota_defaults = QuotaConfig::default();
        let utc_offset = args
            .quota
            .utc_offset_minutes
            .and_then(|minutes| FixedOffset::east_opt(minutes * 60))
            .unwrap_or(quota_defaults.utc_offset);

        LabelScanConfig {
            llm: LLMConfig {
                gemini_api_key: args.llm.gemini_api_key.filter(|key| !key.trim().is_empty()),
                gemini_model: args.llm.gemini_model,
                request_timeout: Duration::from_secs(args.llm.timeout_secs),
                min_request_interval: Duration::from_millis(args.llm.min_interval_ms),
            },
            quota: QuotaConfig {
                max_daily_requests: args.quota.max_daily_requests,
                burst_limit: args.quota.burst_limit,
                burst_window: Duration::from_secs(args.quota.burst_window_secs),
                utc_offset,
                ..quota_defaults
            },
            ocr: OcrConfig {
                tesseract_path: args.ocr.tesseract_path,
                language: args.ocr.language,
                timeout: Duration::from_secs(args.ocr.timeout_secs),
            },
            storage: StorageConfig {
                data_dir: args.storage.data_dir,
            },
            dataset: DatasetConfig {
                path: args.storage.ingredient_dataset,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_core_config() {
        let args = Args::try_parse_from(["labelscan", "quota"]).unwrap();
        let config = LabelScanConfig::from(args);

        assert_eq!(config.llm.min_request_interval, Duration::from_secs(2));
        assert_eq!(config.quota.burst_window, Duration::from_secs(60));
        assert_eq!(config.ocr.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "labelscan",
            "ingredients",
            "oil",
            "--limit",
            "3",
            "--quota-utc-offset-minutes",
            "330",
            "--max-daily-requests",
            "5",
        ])
        .unwrap();

        assert!(matches!(
            args.command,
            Command::Ingredients { ref query, limit: 3 } if query == "oil"
        ));

        let config = LabelScanConfig::from(args);
        assert_eq!(config.quota.max_daily_requests, 5);
        assert_eq!(config.quota.utc_offset.local_minus_utc(), 330 * 60);
    }

    #[test]
    fn test_serve_arguments() {
        let args = Args::try_parse_from([
            "labelscan",
            "serve",
            "--server-port",
            "8080",
            "--server-allowed-origins",
            "http://a.test,http://b.test",
        ])
        .unwrap();

        let Command::Serve(server) = args.command else {
            panic!("expected serve command");
        };
        assert_eq!(server.port, 8080);
        assert_eq!(server.allowed_origins, vec!["http://a.test", "http://b.test"]);
    }
}
