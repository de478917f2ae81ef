mod app;
mod cli;
mod commands;
mod output;

use clap::{CommandFactory, Parser};
use cli::Cli;
use shared::config::Config;
use shared::Error;
use std::process::ExitCode;
use tokio::sync::broadcast;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load environment variables from .env file (if exists)
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    let config = Config::from_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if dotenv_loaded {
        info!("Loaded environment variables from .env file");
    }

    let cli = Cli::parse();
    if let Err(e) = cli.command.validate() {
        return report_error(e);
    }

    let (tx, mut rx) = broadcast::channel(64);
    let engine = match app::build_engine(&config, tx) {
        Ok(engine) => engine,
        Err(e) => return report_error(e),
    };

    let outcome = commands::execute(&engine, &cli.command).await;

    while let Ok(event) = rx.try_recv() {
        debug!("Event {} at {}", event.name(), event.timestamp());
    }

    let output = match outcome {
        Ok(output) => output,
        Err(e) => return report_error(e),
    };

    match output::render(&output, cli.format) {
        Ok(text) => println!("{}", text),
        Err(e) => return report_error(e),
    }

    if output.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn report_error(err: Error) -> ExitCode {
    match err {
        Error::Usage(message) => {
            eprintln!("{}\n", message);
            eprintln!("{}", Cli::command().render_help());
            ExitCode::from(2)
        }
        other => {
            error!("{}", other);
            eprintln!("{}", other);
            ExitCode::FAILURE
        }
    }
}
