//! Configuration loading from disk.

use regex::{Captures, Regex};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::config::schema::PilotConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the default config path.
pub const CONFIG_PATH_VAR: &str = "CONTAINERPILOT";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// No path given and `$CONTAINERPILOT` is unset.
    Undefined,
    Io(PathBuf, std::io::Error),
    Json(serde_json::Error),
    Toml(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Undefined => {
                write!(f, "no config file given and ${} is not set", CONFIG_PATH_VAR)
            }
            ConfigError::Io(path, e) => write!(f, "IO error reading {}: {}", path.display(), e),
            ConfigError::Json(e) => write!(f, "Parse error: {}", e),
            ConfigError::Toml(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(_, e) => Some(e),
            ConfigError::Json(e) => Some(e),
            ConfigError::Toml(e) => Some(e),
            _ => None,
        }
    }
}

/// On-disk syntax of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// `.toml` files are TOML; everything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

/// Pick the config path: the explicit argument, else `$CONTAINERPILOT`.
pub fn resolve_config_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(path.to_path_buf());
    }
    match std::env::var(CONFIG_PATH_VAR) {
        Ok(value) if !value.is_empty() => Ok(PathBuf::from(value)),
        _ => Err(ConfigError::Undefined),
    }
}

fn template_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{\{\s*\.(\w+)\s*\}\}").expect("template pattern is valid"))
}

/// Replace `{{ .NAME }}` with the value `lookup` returns for `NAME`.
/// Names that resolve to nothing (or to an empty string) are left as written.
pub fn expand_templates_with<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    template_pattern()
        .replace_all(input, |caps: &Captures| match lookup(&caps[1]) {
            Some(value) if !value.is_empty() => value,
            _ => caps[0].to_string(),
        })
        .into_owned()
}

/// Expand `{{ .NAME }}` templates from the process environment.
pub fn expand_env_templates(input: &str) -> String {
    expand_templates_with(input, |name| std::env::var(name).ok())
}

/// Parse and validate config text.
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<PilotConfig, ConfigError> {
    let config: PilotConfig = match format {
        ConfigFormat::Json => serde_json::from_str(content).map_err(ConfigError::Json)?,
        ConfigFormat::Toml => toml::from_str(content).map_err(ConfigError::Toml)?,
    };

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load, expand templates, and validate configuration from a file.
pub fn load_config(path: &Path) -> Result<PilotConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
    let content = expand_env_templates(&raw);

    let config = parse_config(&content, ConfigFormat::from_path(path))?;
    tracing::debug!(path = %path.display(), services = config.backends.len(), "Configuration parsed");

    Ok(config)
}
