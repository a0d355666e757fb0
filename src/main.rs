//
// main.rs
// Station-Tools-rs
//
// Entry point: installs the tracing subscriber and hands off to the CLI layer.
//
// Thales Matheus Mendonça Santos - November 2025

use station_tools::cli;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> anyhow::Result<()> {
    // Diagnostics go to stderr; stdout carries the Portuguese progress output.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("station_tools=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    cli::run()
}
