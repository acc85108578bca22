mod config;
pub mod database;
mod store;

pub use config::{Config, LoggingConfig, StepsConfig};
pub use database::Database;
pub use store::{MemoryStore, StateStore};

use std::path::PathBuf;

use crate::error::Result;

/// Returns the directory holding `config.toml` and `walkfeed.db`.
///
/// `WALKFEED_DATA_DIR` wins when set. Otherwise `~/.config/walkfeed[-dev]/`,
/// where `WALKFEED_ENV=dev` selects the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("WALKFEED_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("WALKFEED_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("walkfeed-dev")
            } else {
                base_dir.join("walkfeed")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
