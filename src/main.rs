mod cli;
mod commands;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use commands::App;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> Result<()> {
    // A missing .env file is fine; the environment may already be set.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.verbose, cli.log_dir.as_deref())?;

    let settings = configuration::load_config(cli.config.as_deref())
        .context("Failed to load configuration")?;
    let app = App::new(settings);

    match &cli.command {
        Commands::Inspect { source } => app.inspect(source),
        Commands::Query {
            source,
            filters,
            json,
        } => app.query(source, filters, *json),
        Commands::View {
            source,
            filters,
            view,
            json,
        } => app.view(source, filters, *view, *json),
        Commands::Export { source, out } => app.export(source, out),
    }
}

/// Logs go to stderr so stdout stays clean for JSON. The returned guard flushes the file
/// writer and must live until the end of `main`.
fn init_tracing(verbose: bool, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "leadlens.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()?;
    Ok(guard)
}
