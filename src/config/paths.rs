//! Path management for Custodian
//!
//! ## Path Resolution Order
//!
//! 1. `CUSTODIAN_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/custodian` or `~/.config/custodian`
//! 3. Windows: `%APPDATA%\custodian`

use std::path::PathBuf;

use crate::error::CustodianError;

/// Manages the paths used by Custodian
#[derive(Debug, Clone)]
pub struct CustodianPaths {
    base_dir: PathBuf,
}

impl CustodianPaths {
    /// Resolve the base directory from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, CustodianError> {
        let base_dir = match std::env::var("CUSTODIAN_DATA_DIR") {
            Ok(custom) if !custom.trim().is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Use an explicit base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Suggested database directory when none is configured
    pub fn default_database_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn ensure_base_dir(&self) -> Result<(), CustodianError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| CustodianError::Io(format!("Failed to create base directory: {}", e)))
    }
}

#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, CustodianError> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => {
            let home = std::env::var("HOME").map_err(|_| {
                CustodianError::Config("HOME environment variable not set".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("custodian"))
}

#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, CustodianError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| CustodianError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("custodian"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CustodianPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(paths.default_database_dir(), temp_dir.path().join("data"));
    }

    #[test]
    fn test_ensure_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CustodianPaths::with_base_dir(temp_dir.path().join("nested"));

        paths.ensure_base_dir().unwrap();
        assert!(paths.base_dir().exists());
    }
}
