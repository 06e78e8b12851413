use clap::Parser;
use labelscan_api::{
    application::{cli, logging::init_logger},
    args::Args,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args = Args::parse();
    init_logger(&args.log)?;

    cli::run(args).await
}
