//! Settings and runtime configuration for Custodian
//!
//! `Settings` is the optional `config.json` file. `RuntimeConfig` is what the
//! core actually runs with: settings overlaid with the `DATABASE_URL` and
//! `SENSITIVE_FIELDS` environment variables.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::CustodianPaths;
use crate::audit::SensitiveFields;
use crate::error::CustodianError;
use crate::validation::UserSchema;

/// Environment variable naming the record store
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Environment variable overriding the sensitive field list
pub const SENSITIVE_FIELDS_ENV: &str = "SENSITIVE_FIELDS";

/// Persisted settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Connection string for the record store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,

    /// Fields whose changes are audited
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitive_fields: Option<Vec<String>>,

    /// Mutable user attributes and their format rules
    #[serde(default)]
    pub attributes: UserSchema,
}

fn default_schema_version() -> u32 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            database_url: None,
            sensitive_fields: None,
            attributes: UserSchema::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or defaults if the file doesn't exist
    pub fn load_or_default(paths: &CustodianPaths) -> Result<Self, CustodianError> {
        let settings_path = paths.settings_file();
        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| CustodianError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| CustodianError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Save settings to disk
    pub fn save(&self, paths: &CustodianPaths) -> Result<(), CustodianError> {
        paths.ensure_base_dir()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| CustodianError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| CustodianError::Io(format!("Failed to write settings file: {}", e)))
    }
}

/// Resolved configuration the core runs with
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Directory holding the record store
    pub database_dir: PathBuf,
    pub sensitive_fields: SensitiveFields,
    pub schema: UserSchema,
}

impl RuntimeConfig {
    /// Resolve against the process environment
    pub fn from_env(settings: Settings) -> Result<Self, CustodianError> {
        Self::resolve(settings, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup
    ///
    /// The database URL is required; a missing one is a fatal configuration
    /// error. The sensitive field list falls back to the built-in default.
    pub fn resolve<F>(settings: Settings, env: F) -> Result<Self, CustodianError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = env(DATABASE_URL_ENV)
            .filter(|v| !v.trim().is_empty())
            .or(settings.database_url)
            .ok_or_else(|| {
                CustodianError::Config(format!(
                    "{} is not set in the environment or settings",
                    DATABASE_URL_ENV
                ))
            })?;

        let sensitive_fields = match env(SENSITIVE_FIELDS_ENV) {
            Some(list) => SensitiveFields::parse_list(&list),
            None => settings
                .sensitive_fields
                .map(SensitiveFields::new)
                .unwrap_or_default(),
        };

        Ok(Self {
            database_dir: parse_database_url(&url)?,
            sensitive_fields,
            schema: settings.attributes,
        })
    }
}

/// Turn a connection string into the store's directory
///
/// Accepts `file:///abs/path`, `file:relative/path`, or a bare path.
pub fn parse_database_url(url: &str) -> Result<PathBuf, CustodianError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(CustodianError::Config("database URL is empty".into()));
    }

    let path = if let Some(rest) = url.strip_prefix("file://") {
        rest
    } else if let Some(rest) = url.strip_prefix("file:") {
        rest
    } else if let Some((scheme, _)) = url.split_once("://") {
        return Err(CustodianError::Config(format!(
            "unsupported database scheme '{}' (expected file:)",
            scheme
        )));
    } else {
        url
    };

    if path.is_empty() {
        return Err(CustodianError::Config(format!(
            "database URL '{}' has no path",
            url
        )));
    }

    Ok(PathBuf::from(path))
}
