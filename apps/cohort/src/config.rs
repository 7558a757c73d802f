//! # Configuration
//!
//! Startup settings are layered, highest priority first:
//! 1. Command-line flags
//! 2. Environment variables (`COHORT_RATE_LIMIT`)
//! 3. The optional TOML file given with `--config`
//! 4. Built-in defaults
//!
//! ## Example `cohort.toml`
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8080
//! database = "/var/lib/cohort/students.redb"
//! backend = "redb"
//! rate_limit = 50
//! ```

use clap::ValueEnum;
use cohort_core::CohortError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default bind address.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default database location.
pub const DEFAULT_DATABASE: &str = "cohort.db";

/// Default rate limit in requests per second.
pub const DEFAULT_RATE_LIMIT: u32 = 100;

/// Largest config file accepted.
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

// =============================================================================
// BACKEND
// =============================================================================

/// Where students are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// redb ACID database
    #[default]
    Redb,
    /// JSON roster file, loaded into memory
    File,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Redb => write!(f, "redb"),
            Self::File => write!(f, "file"),
        }
    }
}

// =============================================================================
// FILE CONFIG
// =============================================================================

/// Contents of the TOML config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<PathBuf>,
    pub backend: Option<Backend>,
    pub rate_limit: Option<u32>,
}

impl FileConfig {
    /// Parse TOML text.
    pub fn from_toml(text: &str) -> Result<Self, CohortError> {
        toml::from_str(text).map_err(|e| CohortError::Config(format!("Invalid config: {}", e)))
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, CohortError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            CohortError::Config(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(CohortError::Config(format!(
                "Config file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            CohortError::Config(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }
}

// =============================================================================
// RESOLVED SETTINGS
// =============================================================================

/// Settings after every layer has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub database: PathBuf,
    pub backend: Backend,
    pub rate_limit: u32,
}

/// Values supplied on the command line, `None` when the flag was omitted.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<PathBuf>,
    pub backend: Option<Backend>,
}

impl Settings {
    /// Merge command-line overrides, environment, and file config.
    #[must_use]
    pub fn resolve(overrides: Overrides, file: FileConfig) -> Self {
        Self::resolve_with_env(overrides, file, rate_limit_from_env())
    }

    /// Same as `resolve` with the environment rate limit passed in.
    #[must_use]
    pub fn resolve_with_env(overrides: Overrides, file: FileConfig, env_rate: Option<u32>) -> Self {
        Self {
            host: overrides
                .host
                .or(file.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: overrides.port.or(file.port).unwrap_or(DEFAULT_PORT),
            database: overrides
                .database
                .or(file.database)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE)),
            backend: overrides.backend.or(file.backend).unwrap_or_default(),
            rate_limit: env_rate.or(file.rate_limit).unwrap_or(DEFAULT_RATE_LIMIT),
        }
    }

    /// `host:port` for the listener.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Rate limit from `COHORT_RATE_LIMIT`, if set and numeric.
pub fn rate_limit_from_env() -> Option<u32> {
    std::env::var("COHORT_RATE_LIMIT")
        .ok()
        .and_then(|s| s.parse().ok())
}

// =============================================================================
// TESTS
// =============================================================================
