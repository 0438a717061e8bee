use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::StrengthOptions;
use crate::errors::{JournalError, Result};

/// User configuration, loaded from `.journalbear.toml`.
///
/// Every field has a default, so JournalBear works without any config
/// file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Parent directory for session scratch space (default: OS temp dir).
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,

    /// Shortest password accepted for encryption.
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,

    /// Log filter used when `JOURNALBEAR_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Characters of entry content shown per row by `list`.
    #[serde(default = "default_preview_length")]
    pub preview_length: usize,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_min_password_length() -> usize {
    8
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_preview_length() -> usize {
    60
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            scratch_dir: None,
            min_password_length: default_min_password_length(),
            log_level: default_log_level(),
            preview_length: default_preview_length(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for.
    pub const FILE_NAME: &'static str = ".journalbear.toml";

    /// Load settings from `<dir>/.journalbear.toml`.
    ///
    /// A missing file yields defaults; a file that does not parse is an error.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            JournalError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        if settings.min_password_length == 0 {
            return Err(JournalError::ConfigError(
                "min_password_length must be at least 1".into(),
            ));
        }

        Ok(settings)
    }

    /// Password rules for new passwords.
    pub fn strength_options(&self) -> StrengthOptions {
        StrengthOptions::with_min_length(self.min_password_length)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
