//! `frota.toml` configuration.
//!
//! Every section and key is optional. Without `--config`, `./frota.toml` is
//! read when it exists and built-in defaults are used otherwise.
//!
//! # Example
//!
//! ```toml
//! [submission]
//! timeout_ms = 5000
//!
//! [store]
//! kind = "directory"
//! dir = "./data"
//!
//! [logging]
//! filter = "frota_form=debug,info"
//! format = "json"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Config file looked up in the working directory when `--config` is absent.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "frota.toml";

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("could not read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not parse '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("[store] kind = \"directory\" needs a dir")]
    MissingStoreDir,

    #[error("[submission] timeout_ms must be greater than 0")]
    ZeroTimeout,
}

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    pub submission: SubmissionSettings,
    pub store: StoreSettings,
    pub logging: LoggingSettings,
}

/// `[submission]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SubmissionSettings {
    /// Budget for one store call, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        SubmissionSettings {
            timeout_ms: frota_form::DEFAULT_TIMEOUT.as_millis() as u64,
        }
    }
}

impl SubmissionSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum StoreKind {
    /// Process-local; nothing survives the command.
    #[default]
    Memory,
    /// One JSON file per entity under `dir`.
    Directory,
}

/// `[store]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct StoreSettings {
    pub kind: StoreKind,
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum LogFormat {
    #[default]
    Text,
    Json,
}

/// `[logging]`. `FROTA_LOG` overrides `filter`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LoggingSettings {
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: "warn".to_string(),
            format: LogFormat::Text,
        }
    }
}

// ── Functions ─────────────────────────────────────────────────────────────────

/// Read and parse a config file from `path`.
pub(crate) fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    check(&config)?;
    Ok(config)
}

/// The config named by `--config`, else `./frota.toml` if present, else defaults.
pub(crate) fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    match explicit {
        Some(path) => read_config(path),
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            if fallback.is_file() {
                read_config(fallback)
            } else {
                Ok(Config::default())
            }
        }
    }
}

fn check(config: &Config) -> Result<(), ConfigError> {
    if config.store.kind == StoreKind::Directory && config.store.dir.is_none() {
        return Err(ConfigError::MissingStoreDir);
    }
    if config.submission.timeout_ms == 0 {
        return Err(ConfigError::ZeroTimeout);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(toml_str).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("test.toml"),
            source,
        })?;
        check(&config)?;
        Ok(config)
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.submission.timeout_ms, 10_000);
        assert_eq!(config.store.kind, StoreKind::Memory);
        assert_eq!(config.logging.filter, "warn");
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn parses_all_sections() {
        let config = parse(
            r#"
            [submission]
            timeout_ms = 250

            [store]
            kind = "directory"
            dir = "/var/lib/frota"

            [logging]
            filter = "debug"
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.submission.timeout(), Duration::from_millis(250));
        assert_eq!(config.store.kind, StoreKind::Directory);
        assert_eq!(config.store.dir, Some(PathBuf::from("/var/lib/frota")));
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn directory_store_requires_dir() {
        let err = parse("[store]\nkind = \"directory\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingStoreDir));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = parse("[store]\nbackend = \"sqlite\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = parse("[submission]\ntimeout_ms = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroTimeout));
    }
}
