//! Configuration module for cairn.
//!
//! Configuration lives in a TOML file with support for environment
//! variable interpolation using `${VAR_NAME}` syntax.
//!
//! # Example
//!
//! ```toml
//! [database]
//! type = "sqlite"
//! path = "cairn.db"
//!
//! [object_store]
//! backend = "s3"
//!
//! [object_store.s3]
//! region = "us-east-1"
//! access_key_id = "${AWS_ACCESS_KEY_ID}"
//! secret_access_key = "${AWS_SECRET_ACCESS_KEY}"
//!
//! [jobs.daily]
//! adapter = "postgresql"
//! bucket = "nightly-backups"
//! keep_backups = 7
//! ```

mod database;
mod jobs;
mod observability;
mod storage;

use std::{
    collections::BTreeMap,
    path::Path,
    sync::LazyLock,
};

pub use database::*;
pub use jobs::*;
pub use observability::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
pub use storage::*;

/// Root configuration.
///
/// The database section is required; everything else has defaults so a
/// filesystem-backed catalog with no jobs is a valid (if inert) setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CairnConfig {
    /// Metadata catalog storage.
    pub database: DatabaseConfig,

    /// Connection settings for the remote object store that holds the
    /// backup artifacts. Passed to every retention and purge pass.
    #[serde(default)]
    pub object_store: ObjectStoreConfig,

    /// Backup jobs keyed by trigger name.
    #[serde(default)]
    pub jobs: BTreeMap<String, JobConfig>,

    /// Logging configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl CairnConfig {
    /// Load configuration from a TOML file.
    ///
    /// Environment variables in the format `${VAR_NAME}` are expanded.
    /// Missing variables cause an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;

        let raw: toml::Value = toml::from_str(&expanded).map_err(ConfigError::Parse)?;
        check_disabled_features(&raw)?;

        let config: CairnConfig = toml::from_str(&expanded).map_err(ConfigError::Parse)?;
        config.validate()?;

        Ok(config)
    }

    /// Look up a configured job by trigger.
    pub fn job(&self, trigger: &str) -> Result<&JobConfig, ConfigError> {
        self.jobs
            .get(trigger)
            .ok_or_else(|| ConfigError::UnknownJob(trigger.to_string()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        self.object_store
            .validate()
            .map_err(ConfigError::Validation)?;

        for (trigger, job) in &self.jobs {
            job.validate()
                .map_err(|e| ConfigError::Validation(format!("jobs.{trigger}: {e}")))?;
        }

        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, std::path::PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("No job configured for trigger '{0}'")]
    UnknownJob(String),
}

/// Detect backends that need a cargo feature this binary was built without.
///
/// Without this, serde reports an opaque "unknown variant" error.
fn check_disabled_features(raw: &toml::Value) -> Result<(), ConfigError> {
    let mut issues: Vec<String> = Vec::new();

    if let Some(type_val) = raw
        .get("database")
        .and_then(|v| v.get("type"))
        .and_then(|v| v.as_str())
    {
        check_database_feature(type_val, &mut issues);
    }

    if let Some(backend) = raw
        .get("object_store")
        .and_then(|v| v.get("backend"))
        .and_then(|v| v.as_str())
    {
        check_object_store_feature(backend, &mut issues);
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(issues.join("; ")))
    }
}

fn check_database_feature(type_val: &str, _issues: &mut Vec<String>) {
    match type_val {
        #[cfg(not(feature = "database-sqlite"))]
        "sqlite" => {
            _issues.push("database type 'sqlite' requires the 'database-sqlite' feature".into())
        }
        #[cfg(not(feature = "database-postgres"))]
        "postgres" => _issues
            .push("database type 'postgres' requires the 'database-postgres' feature".into()),
        _ => {}
    }
}

fn check_object_store_feature(backend: &str, _issues: &mut Vec<String>) {
    match backend {
        #[cfg(not(feature = "s3-storage"))]
        "s3" => _issues.push("object_store backend 's3' requires the 's3-storage' feature".into()),
        _ => {}
    }
}

static ENV_VAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

/// Expand environment variables in the format `${VAR_NAME}`.
/// Variables that appear after a `#` on the same line are left alone.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(input.len());

    for line in input.lines() {
        let comment_pos = line.find('#');
        let mut last_end = 0;

        for cap in ENV_VAR_REGEX.captures_iter(line) {
            let Some(whole) = cap.get(0) else { continue };

            if let Some(pos) = comment_pos
                && whole.start() >= pos
            {
                continue;
            }

            result.push_str(&line[last_end..whole.start()]);

            let var_name = &cap[1];
            let value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
            result.push_str(&value);

            last_end = whole.end();
        }

        result.push_str(&line[last_end..]);
        result.push('\n');
    }

    if !input.ends_with('\n') && result.ends_with('\n') {
        result.pop();
    }

    Ok(result)
}
