//! Configuration management for Folio

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::logging::LogFormat;
use crate::templates::PageTemplate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Template used when a page is created without naming one
    #[serde(default = "default_template")]
    pub default_template: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_template: default_template(),
        }
    }
}

impl EditorConfig {
    pub fn template(&self) -> PageTemplate {
        PageTemplate::from_name(&self.default_template)
    }
}

fn default_template() -> String {
    PageTemplate::Blank.name().to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_format() -> String {
    LogFormat::Text.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from the default location, or fall back to
    /// [`Config::default_config`] if no file exists there yet
    pub fn load_or_default() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            tracing::debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default_config());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        if config.database.path.trim().is_empty() {
            return Err(ConfigError::MissingField("database.path".to_string()).into());
        }
        Ok(config)
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            database: DatabaseConfig {
                path: "~/.local/share/folio/pages.db".to_string(),
            },
            editor: EditorConfig::default(),
            logging: None,
        }
    }
}

/// Resolve the configuration file path under the XDG base directories
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("FOLIO_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("folio").join("config.toml"))
}

/// Resolve the data directory path under the XDG base directories
pub fn resolve_data_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| ConfigError::MissingField("data directory".to_string()))?;

    Ok(data_dir.join("folio"))
}

/// Expand `~` in a configured database path
pub fn resolve_db_path(path: &str) -> Result<PathBuf> {
    if path.trim().is_empty() {
        return Ok(resolve_data_path()?.join("pages.db"));
    }
    Ok(PathBuf::from(shellexpand::tilde(path).to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_minimal_config() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[database]
path = "/tmp/folio/pages.db"
"#,
        );

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.database.path, "/tmp/folio/pages.db");
        assert_eq!(config.editor.template(), PageTemplate::Blank);
        assert!(config.logging.is_none());
    }

    #[test]
    fn test_load_full_config() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[database]
path = "~/pages.db"

[editor]
default_template = "landing"

[logging]
format = "json"
"#,
        );

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.editor.template(), PageTemplate::Landing);
        let logging = config.logging.unwrap();
        assert_eq!(logging.format, "json");
        assert_eq!(logging.level, "info");
    }

    #[test]
    fn test_load_missing_database_section() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[editor]\ndefault_template = \"about\"\n");

        let result = Config::load_from_path(&path);
        assert!(matches!(
            result,
            Err(crate::error::FolioError::Config(ConfigError::ParseError(_)))
        ));
    }

    #[test]
    fn test_load_empty_database_path() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[database]\npath = \"\"\n");

        let result = Config::load_from_path(&path);
        assert!(matches!(
            result,
            Err(crate::error::FolioError::Config(ConfigError::MissingField(_)))
        ));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load_from_path(Path::new("/definitely/not/here.toml"));
        assert!(matches!(
            result,
            Err(crate::error::FolioError::Config(ConfigError::ReadError(_)))
        ));
    }

    #[test]
    fn test_unknown_default_template_falls_back_to_blank() {
        let editor = EditorConfig {
            default_template: "gallery-wall".to_string(),
        };
        assert_eq!(editor.template(), PageTemplate::Blank);
    }

    #[test]
    #[serial]
    fn test_resolve_config_path_from_env() {
        std::env::set_var("FOLIO_CONFIG", "/etc/folio/custom.toml");
        let path = resolve_config_path().unwrap();
        std::env::remove_var("FOLIO_CONFIG");

        assert_eq!(path, PathBuf::from("/etc/folio/custom.toml"));
    }

    #[test]
    #[serial]
    fn test_load_or_default_without_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.toml");
        std::env::set_var("FOLIO_CONFIG", missing.to_str().unwrap());
        let config = Config::load_or_default();
        std::env::remove_var("FOLIO_CONFIG");

        let config = config.unwrap();
        assert_eq!(config.database.path, "~/.local/share/folio/pages.db");
    }

    #[test]
    fn test_resolve_db_path_expands_tilde() {
        let path = resolve_db_path("~/folio/pages.db").unwrap();
        assert!(!path.to_string_lossy().starts_with('~'));
        assert!(path.ends_with("folio/pages.db"));
    }

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let config = Config::default_config();
        let text = toml::to_string(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.database.path, config.database.path);
        assert_eq!(back.editor.default_template, "blank");
    }
}
