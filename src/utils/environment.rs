use std::path::PathBuf;

use anyhow::{Context, Result};

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "AI_COMPARE_DATA_DIR";

const APP_DIR_NAME: &str = "ai-compare";

/// Resolve the directory holding the history log and the TUI log file.
///
/// Blank overrides are ignored. Without an override this is the platform data
/// directory (`~/.local/share/ai-compare` on Linux).
pub fn resolve_data_dir(override_dir: Option<String>) -> Result<PathBuf> {
    if let Some(dir) = override_dir.filter(|dir| !dir.trim().is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let base = dirs::data_dir().context("Failed to get platform data directory")?;
    Ok(base.join(APP_DIR_NAME))
}
