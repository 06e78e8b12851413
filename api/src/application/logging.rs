use tracing_subscriber::EnvFilter;

use crate::args::LogArgs;

/// Logs go to stderr so command output on stdout stays machine readable.
pub fn init_logger(args: &LogArgs) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.filter))
        .map_err(|error| anyhow::anyhow!("invalid log filter {:?}: {error}", args.filter))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = if args.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}
