//! Permission engine configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use sentinel_core::{ConfigError, Result, DEFAULT_SEPARATOR};

/// Property key holding the open-by-default switch.
pub const OPEN_BY_DEFAULT_PROPERTY: &str = "Permissions.OpenByDefault";

/// Permission engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionsConfig {
    /// Answer given when no global or role rule matches at all
    #[serde(default = "default_open_by_default")]
    pub open_by_default: bool,

    /// Character separating namespace segments in resource identifiers
    #[serde(default = "default_separator")]
    pub separator: char,
}

fn default_open_by_default() -> bool {
    true
}

fn default_separator() -> char {
    DEFAULT_SEPARATOR
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        Self {
            open_by_default: default_open_by_default(),
            separator: default_separator(),
        }
    }
}

/// File layout: settings live under a `[permissions]` table.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    permissions: PermissionsConfig,
}

impl PermissionsConfig {
    /// Configuration with the given default answer.
    pub fn with_open_by_default(open_by_default: bool) -> Self {
        Self {
            open_by_default,
            ..Self::default()
        }
    }

    /// Read settings from a properties map.
    ///
    /// # Arguments
    ///
    /// * `properties` - Flat key/value settings.
    ///
    /// # Returns
    ///
    /// A configuration that is open unless `Permissions.OpenByDefault` is
    /// present with a value other than `true`.
    pub fn from_properties(properties: &HashMap<String, String>) -> Self {
        let open_by_default = properties
            .get(OPEN_BY_DEFAULT_PROPERTY)
            .map_or(true, |value| value == "true");

        Self::with_open_by_default(open_by_default)
    }

    /// Parse TOML with a `[permissions]` table.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(source).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        file.permissions.validate()?;
        Ok(file.permissions)
    }

    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    /// Reject separators that cannot delimit anything.
    pub fn validate(&self) -> Result<()> {
        if self.separator.is_whitespace() || self.separator.is_control() {
            return Err(ConfigError::Invalid(format!(
                "separator {:?} must be a visible character",
                self.separator
            ))
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_core::Error;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PermissionsConfig::default();
        assert!(config.open_by_default);
        assert_eq!(config.separator, '.');
    }

    #[test]
    fn test_from_properties() {
        let mut properties = HashMap::new();
        assert!(PermissionsConfig::from_properties(&properties).open_by_default);

        properties.insert(OPEN_BY_DEFAULT_PROPERTY.to_string(), "true".to_string());
        assert!(PermissionsConfig::from_properties(&properties).open_by_default);

        properties.insert(OPEN_BY_DEFAULT_PROPERTY.to_string(), "false".to_string());
        assert!(!PermissionsConfig::from_properties(&properties).open_by_default);

        // Only the exact literal opens the engine.
        properties.insert(OPEN_BY_DEFAULT_PROPERTY.to_string(), "TRUE".to_string());
        assert!(!PermissionsConfig::from_properties(&properties).open_by_default);
    }

    #[test]
    fn test_from_toml() {
        let config = PermissionsConfig::from_toml_str(
            r#"
            [permissions]
            open_by_default = false
            separator = "/"
            "#,
        )
        .unwrap();
        assert!(!config.open_by_default);
        assert_eq!(config.separator, '/');

        let config = PermissionsConfig::from_toml_str("").unwrap();
        assert_eq!(config, PermissionsConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let result = PermissionsConfig::from_toml_str("[permissions]\nseparator = \" \"\n");
        assert!(matches!(result, Err(Error::Config(ConfigError::Invalid(_)))));

        let result = PermissionsConfig::from_toml_str("[permissions\n");
        assert!(matches!(result, Err(Error::Config(ConfigError::ParseFailed(_)))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[permissions]\nopen_by_default = false").unwrap();

        let config = PermissionsConfig::load(file.path()).unwrap();
        assert!(!config.open_by_default);
        assert_eq!(config.separator, '.');
    }
}
