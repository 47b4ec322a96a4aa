//! Configuration file support for pm2md CLI
//!
//! Loads settings from `_pm2md.toml` configuration file.

use anyhow::{Context, Result};
use pm2md_core::{Bullet, HardBreak};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "_pm2md.toml";

/// Schema URL for the configuration file
pub const SCHEMA_URL: &str =
    "https://raw.githubusercontent.com/pm2md/pm2md/main/crates/pm2md-cli/schema/pm2md.schema.json";

/// Root configuration structure
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Markdown output configuration
    #[serde(skip_serializing_if = "OutputConfig::is_empty")]
    pub output: OutputConfig,
    /// Input discovery configuration
    #[serde(skip_serializing_if = "InputConfig::is_empty")]
    pub input: InputConfig,
}

/// Markdown output configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Bullet list marker: "*", "-" or "+" (default: "*")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bullet: Option<Bullet>,
    /// Hard line break style: "backslash" or "spaces" (default: "backslash")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hard_break: Option<HardBreak>,
    /// Extension of written Markdown files (default: "md")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    /// End every written document with a newline (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_newline: Option<bool>,
}

impl OutputConfig {
    fn is_empty(&self) -> bool {
        self.bullet.is_none()
            && self.hard_break.is_none()
            && self.extension.is_none()
            && self.trailing_newline.is_none()
    }
}

/// Input discovery configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct InputConfig {
    /// Extension of the JSON documents picked up in directory mode (default: "json")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl InputConfig {
    fn is_empty(&self) -> bool {
        self.extension.is_none()
    }
}

impl Config {
    /// Load configuration from a specific file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Try to load configuration from a directory (looks for `_pm2md.toml`)
    ///
    /// Returns `Ok(None)` if the config file doesn't exist.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Generate JSON schema for the configuration
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// Generate JSON schema as a string
    pub fn json_schema_string() -> Result<String> {
        let schema = Self::json_schema();
        serde_json::to_string_pretty(&schema).context("Failed to serialize JSON schema")
    }

    /// Serialize configuration to TOML string with schema directive
    pub fn to_toml_with_schema(&self) -> Result<String> {
        let toml_content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        Ok(format!("#:schema {}\n\n{}", SCHEMA_URL, toml_content))
    }

    /// Create a sample configuration with the defaults spelled out, for the init command
    pub fn sample() -> Self {
        Config {
            output: OutputConfig {
                bullet: Some(Bullet::Asterisk),
                hard_break: Some(HardBreak::Backslash),
                extension: Some("md".to_string()),
                trailing_newline: Some(true),
            },
            input: InputConfig {
                extension: Some("json".to_string()),
            },
        }
    }
}
