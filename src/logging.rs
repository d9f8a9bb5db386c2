//! Log subscriber setup.
//!
//! The terminal belongs to the user interface while the application runs, so logs can only go to
//! a file. Without a log file no subscriber is installed and every event is discarded.

use std::{fs::File, path::Path, sync::Mutex};

use color_eyre::eyre::{eyre, Result};
use tracing::Level;

/// Installs a global subscriber writing plain-text logs to `path`.
///
/// The file is truncated if it already exists.
///
/// # Errors
///
/// This function may return errors if:
/// - The file cannot be created
/// - A global subscriber has already been installed
pub fn init(path: &Path, level: Level) -> Result<()> {
    let file = File::create(path)?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .try_init()
        .map_err(|err| eyre!("failed to install log subscriber: {err}"))?;

    tracing::info!(path = %path.display(), %level, "logging initialized");

    Ok(())
}
