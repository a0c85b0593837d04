//! Configuration file parsing for `smokescreen.toml`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{ParseError, ParseResult};

/// Main configuration structure for `smokescreen.toml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SmokescreenConfig {
    /// Output envelope and encoding settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Debug/logging settings.
    #[serde(default)]
    pub debug: DebugConfig,

    /// Environment-specific overrides.
    #[serde(default)]
    pub environments: HashMap<String, EnvironmentOverride>,
}

impl SmokescreenConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> ParseResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ParseError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> ParseResult<Self> {
        let expanded = expand_env_vars(content)?;

        toml::from_str(&expanded).map_err(|e| ParseError::TomlError { source: e })
    }

    /// Apply environment-specific overrides.
    pub fn with_environment(mut self, env: &str) -> Self {
        if let Some(overrides) = self.environments.remove(env) {
            if let Some(output) = overrides.output {
                if let Some(serializer) = output.serializer {
                    self.output.serializer = serializer;
                }
                if let Some(compositor) = output.compositor {
                    self.output.compositor = compositor;
                }
                if let Some(pretty_json) = output.pretty_json {
                    self.output.pretty_json = pretty_json;
                }
            }
            if let Some(debug) = overrides.debug {
                if let Some(enabled) = debug.enabled {
                    self.debug.enabled = enabled;
                }
                if let Some(log_level) = debug.log_level {
                    self.debug.log_level = log_level;
                }
                if let Some(log_format) = debug.log_format {
                    self.debug.log_format = log_format;
                }
            }
        }
        self
    }
}

/// Output settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Serializer name: `default`, `simple_collection` or `none`.
    #[serde(default = "default_strategy")]
    pub serializer: String,

    /// Compositor name: `default` or `none`.
    #[serde(default = "default_strategy")]
    pub compositor: String,

    /// Pretty print JSON output.
    #[serde(default)]
    pub pretty_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            serializer: default_strategy(),
            compositor: default_strategy(),
            pretty_json: false,
        }
    }
}

fn default_strategy() -> String {
    "default".to_string()
}

/// Debug/logging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugConfig {
    /// Install a log subscriber at startup.
    #[serde(default)]
    pub enabled: bool,

    /// Log level: `trace`, `debug`, `info`, `warn` or `error`.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: `json`, `pretty` or `compact`.
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

/// Environment-specific configuration overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentOverride {
    /// Output overrides.
    pub output: Option<OutputOverride>,

    /// Debug overrides.
    pub debug: Option<DebugOverride>,
}

/// Output configuration overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OutputOverride {
    /// Override serializer.
    pub serializer: Option<String>,

    /// Override compositor.
    pub compositor: Option<String>,

    /// Override pretty_json.
    pub pretty_json: Option<bool>,
}

/// Debug configuration overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugOverride {
    /// Override enabled.
    pub enabled: Option<bool>,

    /// Override log_level.
    pub log_level: Option<String>,

    /// Override log_format.
    pub log_format: Option<String>,
}

/// Expand `${VAR}` references from the process environment.
/// Unset variables are left as written.
fn expand_env_vars(content: &str) -> ParseResult<String> {
    let re = regex_lite::Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| ParseError::config(format!("invalid interpolation pattern: {e}")))?;

    let mut result = content.to_string();
    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        let full_match = &cap[0];

        if let Ok(value) = std::env::var(var_name) {
            result = result.replace(full_match, &value);
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SmokescreenConfig::default();
        assert_eq!(config.output.serializer, "default");
        assert_eq!(config.output.compositor, "default");
        assert!(!config.output.pretty_json);
        assert_eq!(config.debug.log_level, "warn");
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
            [output]
            serializer = "simple_collection"
        "#;

        let config = SmokescreenConfig::from_str(toml).unwrap();
        assert_eq!(config.output.serializer, "simple_collection");
        assert_eq!(config.output.compositor, "default");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let toml = r#"
            [output]
            envelope = "data"
        "#;

        let err = SmokescreenConfig::from_str(toml).unwrap_err();
        assert!(matches!(err, ParseError::TomlError { .. }));
    }

    #[test]
    fn test_environment_override() {
        let toml = r#"
            [output]
            pretty_json = false

            [environments.development.output]
            pretty_json = true
            serializer = "none"

            [environments.development.debug]
            log_level = "debug"
        "#;

        let config = SmokescreenConfig::from_str(toml)
            .unwrap()
            .with_environment("development");
        assert!(config.output.pretty_json);
        assert_eq!(config.output.serializer, "none");
        assert_eq!(config.debug.log_level, "debug");
        assert!(config.environments.is_empty());
    }

    #[test]
    fn test_unknown_environment_is_noop() {
        let config = SmokescreenConfig::default().with_environment("staging");
        assert_eq!(config.output.serializer, "default");
    }

    #[test]
    fn test_env_var_expansion() {
        // SAFETY: This test runs single-threaded and we clean up after
        unsafe {
            std::env::set_var("SMOKESCREEN_TEST_SERIALIZER", "simple_collection");
        }
        let expanded = expand_env_vars("serializer = \"${SMOKESCREEN_TEST_SERIALIZER}\"").unwrap();
        assert_eq!(expanded, "serializer = \"simple_collection\"");
        unsafe {
            std::env::remove_var("SMOKESCREEN_TEST_SERIALIZER");
        }
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("smokescreen.toml");
        std::fs::write(&path, "[debug]\nenabled = true\n").unwrap();

        let config = SmokescreenConfig::from_file(&path).unwrap();
        assert!(config.debug.enabled);

        let err = SmokescreenConfig::from_file(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ParseError::IoError { .. }));
    }

    #[test]
    fn test_unset_var_left_alone() {
        let expanded = expand_env_vars("serializer = \"${SMOKESCREEN_UNSET_VAR_XYZ}\"").unwrap();
        assert_eq!(expanded, "serializer = \"${SMOKESCREEN_UNSET_VAR_XYZ}\"");
    }
}
