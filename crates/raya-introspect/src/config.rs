//! Introspection configuration (`[introspect]` table)
//!
//! ```toml
//! [introspect]
//! exposure = "safe"          # all | safe | properties-only | nothing
//! expose_fields = false
//! unsafe_methods = ["Runtime.exec", "*.finalize"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::policy::{parse_pattern, ExposureLevel, UnsafeMethods, DEFAULT_UNSAFE_METHODS};

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid config: {0}")]
    ValidationError(String),
}

/// Settings for a [`HostWrapper`](crate::HostWrapper)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntrospectConfig {
    /// Which members templates can see
    #[serde(default)]
    pub exposure: ExposureLevel,

    /// Expose public fields as members
    #[serde(default)]
    pub expose_fields: bool,

    /// Methods hidden under `safe` exposure
    #[serde(default = "default_unsafe_methods")]
    pub unsafe_methods: Vec<String>,
}

fn default_unsafe_methods() -> Vec<String> {
    DEFAULT_UNSAFE_METHODS.iter().map(|s| s.to_string()).collect()
}

impl Default for IntrospectConfig {
    fn default() -> Self {
        Self {
            exposure: ExposureLevel::default(),
            expose_fields: false,
            unsafe_methods: default_unsafe_methods(),
        }
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    #[serde(default)]
    introspect: IntrospectConfig,
}

impl IntrospectConfig {
    /// Parse from TOML text containing an `[introspect]` table
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        file.introspect.validate()?;
        Ok(file.introspect)
    }

    /// Load from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Check that every unsafe method pattern is well-formed
    pub fn validate(&self) -> Result<(), ConfigError> {
        for pattern in &self.unsafe_methods {
            parse_pattern(pattern).map_err(ConfigError::ValidationError)?;
        }
        Ok(())
    }

    /// Build the deny-list policy described by this config
    pub fn unsafe_method_policy(&self) -> Result<UnsafeMethods, ConfigError> {
        let mut list = UnsafeMethods::new();
        for pattern in &self.unsafe_methods {
            list.add(pattern).map_err(ConfigError::ValidationError)?;
        }
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[introspect]
exposure = "properties-only"
expose_fields = true
unsafe_methods = ["Runtime.exec"]
"#;
        let config = IntrospectConfig::from_str(toml).unwrap();
        assert_eq!(config.exposure, ExposureLevel::PropertiesOnly);
        assert!(config.expose_fields);
        assert_eq!(config.unsafe_methods, vec!["Runtime.exec".to_string()]);
    }

    #[test]
    fn test_missing_table_uses_defaults() {
        let config = IntrospectConfig::from_str("").unwrap();
        assert_eq!(config, IntrospectConfig::default());
        assert_eq!(config.exposure, ExposureLevel::Safe);
        assert!(!config.unsafe_methods.is_empty());
    }

    #[test]
    fn test_invalid_exposure_is_parse_error() {
        let toml = r#"
[introspect]
exposure = "everything"
"#;
        assert!(matches!(
            IntrospectConfig::from_str(toml),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_invalid_pattern_is_validation_error() {
        let toml = r#"
[introspect]
unsafe_methods = ["exec"]
"#;
        assert!(matches!(
            IntrospectConfig::from_str(toml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raya.toml");
        std::fs::write(&path, "[introspect]\nexposure = \"all\"\n").unwrap();

        let config = IntrospectConfig::load_from_file(&path).unwrap();
        assert_eq!(config.exposure, ExposureLevel::All);

        let missing = IntrospectConfig::load_from_file(&dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(ConfigError::IoError(_))));
    }
}
