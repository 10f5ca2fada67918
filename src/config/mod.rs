//! Configuration for chatdesk
//!
//! Two layers: the static model metadata table (process-wide, read-only) and
//! user settings persisted as JSON under the platform config directory.

pub mod models;
pub mod settings;

use std::path::PathBuf;

pub use self::{
    models::{model_ids, model_info, ModelInfo, CUSTOM_MODEL},
    settings::Settings,
};

/// Get the configuration directory path
#[must_use]
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chatdesk")
}

/// Get the settings file path
#[must_use]
pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}
