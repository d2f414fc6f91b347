use std::path::PathBuf;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::error::Result;

const LOG_ENV: &str = "PASSEDIT_LOGLEVEL";
const LOG_FILE: &str = "passedit.log";

pub fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from(".").join(".data"))
        .join("passedit")
}

/// File-based logging; stdout belongs to the terminal UI.
pub fn initialize_logging() -> Result<()> {
    let directory = log_dir();
    std::fs::create_dir_all(&directory)?;
    let log_file = std::fs::File::create(directory.join(LOG_FILE))?;

    let level = std::env::var("RUST_LOG")
        .or_else(|_| std::env::var(LOG_ENV))
        .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_filter(EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(file_layer)
        .try_init()
        .map_err(|e| crate::error::PassEditError::Other(e.to_string()))?;
    Ok(())
}
