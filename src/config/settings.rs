//! Persisted user settings
//!
//! Stored as JSON under the platform config directory. Missing files load
//! as defaults so a fresh installation works without any setup step beyond
//! providing an API key.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{ChatError, Result};

/// Environment variable consulted when no API key is configured
pub const API_KEY_ENV: &str = "SILICONFLOW_API_KEY";

/// User settings (stored in `<config-dir>/chatdesk/settings.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Provider API key
    #[serde(default)]
    pub api_key: String,

    /// Provider API host; empty means "use the provider default"
    #[serde(default)]
    pub api_host: String,

    /// Override for the chat-completion request path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_path: Option<String>,

    /// Selected model id (may be the `custom-model` sentinel)
    #[serde(default = "default_model")]
    pub model: String,

    /// Model name substituted when the `custom-model` sentinel is selected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_model_name: Option<String>,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling top-p
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Verbose logging enabled
    #[serde(default)]
    pub verbose: bool,
}

fn default_model() -> String {
    "deepseek-ai/DeepSeek-V3".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    1.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_host: String::new(),
            api_path: None,
            model: default_model(),
            custom_model_name: None,
            temperature: default_temperature(),
            top_p: default_top_p(),
            verbose: false,
        }
    }
}

impl Settings {
    /// Load settings from disk
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load() -> Result<Self> {
        let path = super::settings_path();
        Self::load_from_path(&path)
    }

    /// Load settings from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| ChatError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        serde_json::from_str(&contents).map_err(|e| ChatError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Save settings to disk
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save(&self) -> Result<()> {
        let path = super::settings_path();
        self.save_to_path(&path)
    }

    /// Save settings to a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the API key from settings, falling back to the environment
    #[must_use]
    pub fn effective_api_key(&self) -> Option<String> {
        if self.api_key.is_empty() {
            std::env::var(API_KEY_ENV).ok()
        } else {
            Some(self.api_key.clone())
        }
    }
}
