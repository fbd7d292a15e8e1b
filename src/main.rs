use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use promingest::cli::{Cli, Command};
use promingest::logging::app_config;
use promingest::{config, scheme};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // the fixed no-op commands never touch the logger
    match cli.resolve() {
        Command::Scheme => {
            println!("{}", scheme::SCHEME);
            return ExitCode::SUCCESS;
        }
        Command::ValidateArguments => return ExitCode::SUCCESS,
        Command::Run => {}
    }

    // initialize the logger
    let logger = app_config(cli.loglevel, cli.log_file.as_deref())
        .and_then(|config| log4rs::init_config(config).map_err(Into::into));
    if let Err(err) = logger {
        eprintln!("Failed to initialize logging: {err:#}");
        return ExitCode::FAILURE;
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = config::from_reader(io::stdin().lock()).context("reading scrape configuration")?;
    log::debug!(
        "Passthrough fields: index={:?} sourcetype={:?} host={:?}",
        config.index,
        config.sourcetype,
        config.host
    );
    log::info!("Scrape timeout is: {}s", config.timeout.as_secs());

    let summary = promingest::scrape_into(&config, io::stdout().lock())
        .await
        .with_context(|| format!("scraping {}", config.uri))?;
    log::info!(
        "Wrote {} samples, skipped {} malformed lines",
        summary.emitted,
        summary.skipped
    );
    Ok(())
}
