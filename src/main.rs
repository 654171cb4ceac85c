mod app;

use anyhow::{Context, Result};
use clap::Parser;

use app::{Cli, collect_params, write_output};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let (backend, params) = collect_params(&cli)?;
    if params.is_empty() {
        tracing::info!("No parameters given, rendering defaults");
    }
    tracing::info!(
        "Translating {} parameter(s) for the {} backend",
        params.len(),
        backend.label()
    );

    let query = craf::translate(backend, &params).context("Translation failed")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_output(&query, cli.output, &mut out)?;

    Ok(())
}
