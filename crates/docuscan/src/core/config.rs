//! Configuration loading and management.
//!
//! [`DocuscanConfig`] can be created programmatically, loaded from TOML, YAML or JSON, or
//! discovered by searching for `docuscan.toml` from the current directory upward. A small set
//! of environment variables overrides file values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::decode::DEFAULT_RENDER_DPI;
use crate::loader::DEFAULT_UPLOAD_DIR;
use crate::{DocuscanError, Result};

/// File name searched for by [`DocuscanConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "docuscan.toml";

/// Lowest accepted rasterization resolution.
pub const MIN_RENDER_DPI: u16 = 36;
/// Highest accepted rasterization resolution.
pub const MAX_RENDER_DPI: u16 = 1200;

pub const ENV_UPLOAD_DIR: &str = "DOCUSCAN_UPLOAD_DIR";
pub const ENV_MAX_PAGES: &str = "DOCUSCAN_MAX_PAGES";
pub const ENV_RENDER_DPI: &str = "DOCUSCAN_RENDER_DPI";
pub const ENV_MAX_REQUEST_BODY_BYTES: &str = "DOCUSCAN_MAX_REQUEST_BODY_BYTES";

/// Main docuscan configuration.
///
/// # Example
///
/// ```rust
/// use docuscan::core::config::DocuscanConfig;
///
/// let config = DocuscanConfig::default();
/// assert_eq!(config.render_dpi, 200);
/// assert!(config.max_pages.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocuscanConfig {
    /// Directory for uploaded sources and temporary page files
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Reject PDFs with more pages than this (None = unlimited)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<usize>,

    /// PDF rasterization resolution
    #[serde(default = "default_render_dpi")]
    pub render_dpi: u16,

    /// Keep the uploaded source file after the request finishes
    #[serde(default)]
    pub keep_upload: bool,

    /// HTTP boundary limits
    #[serde(default)]
    pub api: ApiConfig,
}

/// Limits applied by the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Maximum accepted request body, in bytes
    #[serde(default = "default_max_request_body_bytes")]
    pub max_request_body_bytes: usize,
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from(DEFAULT_UPLOAD_DIR)
}

fn default_render_dpi() -> u16 {
    DEFAULT_RENDER_DPI
}

fn default_max_request_body_bytes() -> usize {
    100 * 1024 * 1024
}

impl Default for DocuscanConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            max_pages: None,
            render_dpi: default_render_dpi(),
            keep_upload: false,
            api: ApiConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            max_request_body_bytes: default_max_request_body_bytes(),
        }
    }
}

impl DocuscanConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `DocuscanError::Validation` if the file doesn't exist, is invalid TOML, or holds
    /// out-of-range values.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| DocuscanError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = serde_yaml_ng::from_str(&content)
            .map_err(|e| DocuscanError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| DocuscanError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, picking the format from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "toml" => Self::from_toml_file(path),
            "yaml" | "yml" => Self::from_yaml_file(path),
            "json" => Self::from_json_file(path),
            _ => Err(DocuscanError::validation(format!(
                "Unsupported config file format: {} (expected .toml, .yaml, .yml or .json)",
                path.display()
            ))),
        }
    }

    /// Discover `docuscan.toml` in the current directory or any parent.
    ///
    /// # Returns
    ///
    /// - `Some(config)` if found
    /// - `None` if no config file found
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir()
            .map_err(|e| DocuscanError::validation_with_source("Cannot determine current directory", e))?;

        loop {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "Discovered configuration file");
                return Ok(Some(Self::from_toml_file(candidate)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }

    /// Effective configuration: `path` if given, else a discovered file, else defaults, with
    /// environment overrides applied last.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::discover()?.unwrap_or_default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `DOCUSCAN_*` environment variables on top of the current values.
    ///
    /// `DOCUSCAN_MAX_PAGES` accepts `none` or an empty value to clear the limit.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(dir) = env_value(ENV_UPLOAD_DIR) {
            self.upload_dir = PathBuf::from(dir);
        }

        if let Some(value) = std::env::var(ENV_MAX_PAGES).ok().map(|v| v.trim().to_string()) {
            self.max_pages = if value.is_empty() || value.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(parse_env(ENV_MAX_PAGES, &value)?)
            };
        }

        if let Some(value) = env_value(ENV_RENDER_DPI) {
            self.render_dpi = parse_env(ENV_RENDER_DPI, &value)?;
        }

        if let Some(value) = env_value(ENV_MAX_REQUEST_BODY_BYTES) {
            self.api.max_request_body_bytes = parse_env(ENV_MAX_REQUEST_BODY_BYTES, &value)?;
        }

        self.validate()
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_RENDER_DPI..=MAX_RENDER_DPI).contains(&self.render_dpi) {
            return Err(DocuscanError::validation(format!(
                "render_dpi must be between {} and {}, got {}",
                MIN_RENDER_DPI, MAX_RENDER_DPI, self.render_dpi
            )));
        }

        if self.upload_dir.as_os_str().is_empty() {
            return Err(DocuscanError::validation("upload_dir must not be empty"));
        }

        if self.api.max_request_body_bytes == 0 {
            return Err(DocuscanError::validation("api.max_request_body_bytes must be positive"));
        }

        Ok(())
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| DocuscanError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(name: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| DocuscanError::validation(format!("Invalid {}='{}': {}", name, value, e)))
}
