use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::model::EventKind;
use crate::sync::SourceSpec;

pub const DEFAULT_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";

const SPREADSHEET_ENV: &str = "DATESYNC_SPREADSHEET_ID";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Spreadsheet holding the Birthdays/Anniversaries sheets
    pub spreadsheet_id: String,

    /// Target calendar. Birthday-type events can only live on `primary`.
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,

    /// Sort each sheet by name before reading it
    #[serde(default = "default_sort_on_read")]
    pub sort_on_read: bool,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub google: GoogleConfig,

    #[serde(default)]
    pub api: ApiConfig,
}

/// Sheet names to read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    pub birthdays: String,
    /// Optional; a missing sheet is skipped at run time
    pub anniversaries: Option<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            birthdays: "Birthdays".to_string(),
            anniversaries: Some("Anniversaries".to_string()),
        }
    }
}

/// Google OAuth client credentials
/// Create at: https://console.cloud.google.com/apis/credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
}

impl GoogleConfig {
    /// Check if credentials are configured (not placeholders)
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty()
            && !self.client_secret.is_empty()
            && !self.client_id.starts_with("YOUR_")
            && !self.client_secret.starts_with("YOUR_")
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: "YOUR_GOOGLE_CLIENT_ID".to_string(),
            client_secret: "YOUR_GOOGLE_CLIENT_SECRET".to_string(),
        }
    }
}

/// API endpoints (overridable for testing against a local server)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_calendar_base_url")]
    pub calendar_base_url: String,
    #[serde(default = "default_sheets_base_url")]
    pub sheets_base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            calendar_base_url: default_calendar_base_url(),
            sheets_base_url: default_sheets_base_url(),
        }
    }
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

fn default_sort_on_read() -> bool {
    true
}

fn default_calendar_base_url() -> String {
    DEFAULT_CALENDAR_API_BASE.to_string()
}

fn default_sheets_base_url() -> String {
    DEFAULT_SHEETS_API_BASE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spreadsheet_id: "YOUR_SPREADSHEET_ID".to_string(),
            calendar_id: default_calendar_id(),
            sort_on_read: default_sort_on_read(),
            sources: SourcesConfig::default(),
            google: GoogleConfig::default(),
            api: ApiConfig::default(),
        }
    }
}

/// Directory holding config.toml and stored tokens (e.g. ~/.config/datesync)
pub fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Failed to get config directory")?
        .join("datesync"))
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!("Wrote default config to {}", path.display());
            config
        };

        if let Ok(id) = std::env::var(SPREADSHEET_ENV) {
            if !id.trim().is_empty() {
                config.spreadsheet_id = id.trim().to_string();
            }
        }

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Warnings are logged. Returns an error if validation fails.
    pub fn load_validated(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok(config)
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        let id = self.spreadsheet_id.trim();
        if id.is_empty() || id.starts_with("YOUR_") {
            result.add_error(
                "spreadsheet_id",
                format!("Spreadsheet id not set (edit the config or set {})", SPREADSHEET_ENV),
            );
        }

        if self.calendar_id.trim().is_empty() {
            result.add_error("calendar_id", "Calendar id must not be empty");
        } else if self.calendar_id != "primary" {
            result.add_warning(
                "calendar_id",
                "Birthday events can only be created on the primary calendar",
            );
        }

        if self.sources.birthdays.trim().is_empty() {
            result.add_error("sources.birthdays", "Sheet name must not be empty");
        }
        if let Some(name) = &self.sources.anniversaries {
            if name.trim().is_empty() {
                result.add_error(
                    "sources.anniversaries",
                    "Sheet name must not be empty (remove the key to disable)",
                );
            }
        }

        self.validate_url(&self.api.calendar_base_url, "api.calendar_base_url", &mut result);
        self.validate_url(&self.api.sheets_base_url, "api.sheets_base_url", &mut result);

        if !self.google.is_configured() {
            result.add_warning(
                "google",
                "Google OAuth not configured - `datesync auth` and token refresh are unavailable",
            );
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }
                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Sheets to sync, in processing order
    pub fn source_specs(&self) -> Vec<SourceSpec> {
        let mut specs = vec![SourceSpec::new(&self.sources.birthdays, EventKind::Birthday)];
        if let Some(name) = &self.sources.anniversaries {
            specs.push(SourceSpec::new(name, EventKind::Anniversary));
        }
        specs
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        Ok(config_dir()?.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn configured() -> Config {
        Config {
            spreadsheet_id: "1AbCdEf".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_default_config_needs_spreadsheet() {
        let result = Config::default().validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "spreadsheet_id"));
    }

    #[test]
    fn test_configured_is_valid() {
        let result = configured().validate();
        assert!(result.is_valid(), "{:?}", result.errors);
    }

    #[test]
    fn test_google_not_configured_is_warning() {
        let result = configured().validate();
        assert!(result.warnings.iter().any(|w| w.field == "google"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = configured();
        config.api.sheets_base_url = "ftp://localhost:8080".to_string();
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_secondary_calendar_warns() {
        let mut config = configured();
        config.calendar_id = "family@group.calendar.google.com".to_string();
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "calendar_id"));
    }

    #[test]
    fn test_source_specs_order() {
        let specs = configured().source_specs();
        assert_eq!(specs[0], SourceSpec::new("Birthdays", EventKind::Birthday));
        assert_eq!(specs[1], SourceSpec::new("Anniversaries", EventKind::Anniversary));

        let mut config = configured();
        config.sources.anniversaries = None;
        assert_eq!(config.source_specs().len(), 1);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "spreadsheet_id = \"abc\"\nsort_on_read = false\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(!config.sort_on_read);
        assert_eq!(config.calendar_id, "primary");
        assert_eq!(config.sources.birthdays, "Birthdays");
        assert_eq!(config.api.calendar_base_url, DEFAULT_CALENDAR_API_BASE);
    }

    #[test]
    fn test_missing_file_written_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        Config::load_from(&path).unwrap();
        assert!(path.exists());
        let reloaded: Config = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reloaded.sources.anniversaries.as_deref(), Some("Anniversaries"));
    }

    #[test]
    fn test_spreadsheet_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "spreadsheet_id = \"from-file\"\n").unwrap();

        std::env::set_var(SPREADSHEET_ENV, "  from-env  ");
        let overridden = Config::load_from(&path).unwrap();

        // Blank values are ignored
        std::env::set_var(SPREADSHEET_ENV, "   ");
        let blank = Config::load_from(&path).unwrap();
        std::env::remove_var(SPREADSHEET_ENV);

        assert_eq!(overridden.spreadsheet_id, "from-env");
        assert_eq!(blank.spreadsheet_id, "from-file");
    }
}
