use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use expense_flow::cli::{self, Args};
use expense_flow::config::Config;
use expense_flow::logging::init_tracing;
use expense_flow::App;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing();

    match main_inner(args).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn main_inner(args: Args) -> anyhow::Result<String> {
    let path = args.common.config.clone().unwrap_or_else(Config::config_path);
    tracing::debug!(path = %path.display(), "Loading config");
    let mut config = Config::load_from(&path)
        .with_context(|| format!("loading config from {}", path.display()))?;
    config
        .apply_overrides(|key| std::env::var(key).ok())
        .context("applying environment overrides")?;
    if let Some(base_url) = args.common.base_url.clone() {
        config.api.base_url = base_url;
        config.validate().context("invalid --base-url")?;
    }

    let app = App::connect(config).context("starting client")?;
    let output = cli::run(&app, args.command).await?;
    Ok(output)
}
