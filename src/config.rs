//! Generation settings loaded from TOML
//!
//! ```toml
//! ref_prefix = "$"
//!
//! [notice]
//! comment = "//"
//! text = "File generated by slotgen. DO NOT EDIT."
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::model::DEFAULT_REF_PREFIX;

/// Errors that can occur when loading or parsing a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Default banner placed at the top of generated outputs
pub const DEFAULT_NOTICE: &str = "File generated by slotgen. DO NOT EDIT.";

/// Settings shared by models and the output registry
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prefix marking string values as references into the model
    pub ref_prefix: String,
    /// Banner written before every registered output
    pub notice: Option<Notice>,
}

/// A generated-file banner written as a comment
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Notice {
    /// Line comment marker of the target language (`//`, `#`)
    pub comment: String,
    #[serde(default = "default_notice_text")]
    pub text: String,
}

fn default_notice_text() -> String {
    DEFAULT_NOTICE.to_string()
}

impl Notice {
    pub fn new(comment: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
            text: default_notice_text(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ref_prefix: DEFAULT_REF_PREFIX.to_string(),
            notice: None,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        log::debug!("loaded config with ref prefix '{}'", config.ref_prefix);
        Ok(config)
    }

    /// Set the reference prefix
    pub fn with_ref_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ref_prefix = prefix.into();
        self
    }

    /// Set the generated-file banner
    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }

    /// Text written before each output: `"<comment> <text>\n\n"`
    pub fn preamble(&self) -> Option<String> {
        self.notice
            .as_ref()
            .map(|notice| format!("{} {}\n\n", notice.comment, notice.text))
    }
}
