use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use departure_board::app;
use departure_board::config::BoardConfig;
use tracing_subscriber::EnvFilter;

/// Send tracing output to `path`; the terminal itself is the display.
fn init_tracing(path: &Path) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() {
    let config = match BoardConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("departure-board: invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    if let Err(e) = init_tracing(&config.log_file) {
        eprintln!(
            "Warning: cannot open log file {}: {e}. Logging disabled.",
            config.log_file.display()
        );
    }

    if config.tfl.credentials.is_none() {
        tracing::info!("TFL_APP_ID/TFL_APP_KEY not set, using anonymous rate limit");
    }

    if let Err(e) = app::start(config).await {
        eprintln!("departure-board: {e}");
        std::process::exit(1);
    }
}
