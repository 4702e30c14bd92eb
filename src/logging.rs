use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::domain::ViewError;

const DEFAULT_FILTER: &str = "prodview=info";

/// Sends all tracing output to `log_file`, the terminal belongs to the UI.
pub fn init(log_file: &Path) -> Result<(), ViewError> {
    let file = File::create(log_file)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| ViewError::LoggingFailed(e.to_string()))
}
