//! Configuration management
//!
//! Settings live in a TOML file under the platform data directory (override
//! with `--config`). The GitHub token may come from the file or from the
//! `GITHUB_TOKEN` environment variable.

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Data directory for config, the cached sheet map, and the ledger.
pub fn data_dir() -> Result<PathBuf> {
    ProjectDirs::from("io", "solvetrack", "solvetrack")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| anyhow!("Could not determine home directory"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub identity: IdentityConfig,
    pub sheet: SheetConfig,
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Student display name, exactly as it appears on the sheet roster.
    pub student_name: String,
    /// Group identifier, e.g. "G71".
    pub group: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Spreadsheet endpoint URL (map fetch and record delivery).
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Repository in `owner/name` form.
    pub repo: String,
    /// Path prefix inside the repository, may be empty.
    #[serde(default)]
    pub folder_path: String,
    /// Token for the archive API; falls back to `GITHUB_TOKEN`.
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Wait between retries while the sheet is busy.
    #[serde(with = "humantime_serde", default = "default_busy_backoff")]
    pub busy_backoff: Duration,
    /// Give up after this many busy retries; 0 means retry forever.
    #[serde(default = "default_max_busy_retries")]
    pub max_busy_retries: u32,
}

impl DeliveryConfig {
    /// Busy retry cap for the engine; `None` when retries are unbounded.
    pub fn busy_cap(&self) -> Option<u32> {
        (self.max_busy_retries > 0).then_some(self.max_busy_retries)
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            busy_backoff: default_busy_backoff(),
            max_busy_retries: default_max_busy_retries(),
        }
    }
}

fn default_busy_backoff() -> Duration {
    Duration::from_secs(3)
}

fn default_max_busy_retries() -> u32 {
    100
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load configuration from the given path, or the default location.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };
        let contents = fs::read_to_string(&path).with_context(|| {
            format!(
                "Failed to read config at {} (create it with student_name, group, \
                 sheet endpoint and archive repo)",
                path.display()
            )
        })?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.identity.student_name.trim().is_empty() {
            return Err(anyhow!("identity.student_name must not be empty"));
        }
        if self.identity.group.trim().is_empty() {
            return Err(anyhow!("identity.group must not be empty"));
        }
        if self.sheet.endpoint.trim().is_empty() {
            return Err(anyhow!("sheet.endpoint must not be empty"));
        }
        if !self.archive.repo.contains('/') {
            return Err(anyhow!("archive.repo must be in owner/name form"));
        }
        Ok(())
    }

    /// Resolve the archive token from config or environment.
    pub fn archive_token(&self) -> Result<String> {
        if let Some(token) = &self.archive.token {
            if !token.trim().is_empty() {
                return Ok(token.clone());
            }
        }
        std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| anyhow!("No archive token: set archive.token or GITHUB_TOKEN"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [identity]
        student_name = "Ada Lovelace"
        group = "G71"

        [sheet]
        endpoint = "https://script.example/exec"

        [archive]
        repo = "ada/solutions"
    "#;

    #[test]
    fn minimal_config_gets_delivery_defaults() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        config.validate().unwrap();
        assert_eq!(config.delivery.busy_backoff, Duration::from_secs(3));
        assert_eq!(config.delivery.busy_cap(), Some(100));
        assert_eq!(config.archive.folder_path, "");
    }

    #[test]
    fn delivery_tuning_is_overridable() {
        let toml_src = format!(
            "{MINIMAL}\n[delivery]\nbusy_backoff = \"500ms\"\nmax_busy_retries = 5\n"
        );
        let config: Config = toml::from_str(&toml_src).unwrap();
        assert_eq!(config.delivery.busy_backoff, Duration::from_millis(500));
        assert_eq!(config.delivery.busy_cap(), Some(5));
    }

    #[test]
    fn rejects_invalid_repo() {
        let bad = MINIMAL.replace("ada/solutions", "solutions");
        let config: Config = toml::from_str(&bad).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_blank_identity() {
        let bad = MINIMAL.replace("Ada Lovelace", "  ");
        let config: Config = toml::from_str(&bad).unwrap();
        assert!(config.validate().is_err());
    }
}
