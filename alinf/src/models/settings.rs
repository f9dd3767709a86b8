//! User settings backed by a RON file.
//!
//! Holds the active inflector, the default run options, the confirmation
//! toggle and per-provider endpoints/credentials. Loaded/saved from
//! `alinf_settings.ron` (see `config::settings_path`).

use crate::config::defaults;
use alinf_types::{InflectionOptions, InflectorKind};
use serde::{Deserialize, Serialize};
use std::path::Path;
use strum::IntoEnumIterator;

/// Top-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_inflector")]
    pub inflector: InflectorKind,
    #[serde(default = "default_true")]
    pub include_plural: bool,
    #[serde(default = "default_true")]
    pub inflect_filename: bool,
    /// Ask the user to confirm the run options before inflecting
    #[serde(default = "default_true")]
    pub confirm_before_apply: bool,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub morpher: MorpherSettings,
    #[serde(default)]
    pub openai: OpenAiSettings,
}

/// Morpher declension service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MorpherSettings {
    #[serde(default = "default_morpher_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MorpherSettings {
    fn default() -> Self {
        Self {
            base_url: default_morpher_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiSettings {
    /// Empty = no Authorization header (local compatible servers)
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_url")]
    pub api_url: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: default_openai_url(),
            model: default_openai_model(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_inflector() -> InflectorKind { InflectorKind::Morpher }
fn default_true() -> bool { true }
fn default_morpher_url() -> String { defaults::MORPHER_URL.to_string() }
fn default_openai_url() -> String { defaults::OPENAI_API_URL.to_string() }
fn default_openai_model() -> String { defaults::OPENAI_MODEL.to_string() }
fn default_timeout_secs() -> u64 { defaults::REQUEST_TIMEOUT_SECS }
fn default_temperature() -> f32 { defaults::OPENAI_TEMPERATURE }
fn default_max_tokens() -> u32 { defaults::OPENAI_MAX_TOKENS }

impl Default for Settings {
    fn default() -> Self {
        Self {
            inflector: default_inflector(),
            include_plural: true,
            inflect_filename: true,
            confirm_before_apply: true,
            debug: false,
            morpher: MorpherSettings::default(),
            openai: OpenAiSettings::default(),
        }
    }
}

/// Inflectors a settings screen may offer. The stub is hidden unless debugging.
pub fn available_inflectors(debug: bool) -> Vec<InflectorKind> {
    InflectorKind::iter()
        .filter(|kind| debug || !kind.is_debug_only())
        .collect()
}

impl Settings {
    /// Load from `path`, falling back to `Default` on any error.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match ron::from_str::<Settings>(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("Failed to parse {:?}: {}, using defaults", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                log::debug!("Could not read {:?} ({}), using defaults", path, e);
                Self::default()
            }
        }
    }

    /// Serialize to pretty RON and write to `path`.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config dir: {}", e))?;
        }
        let content = self.to_ron()?;
        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write {:?}: {}", path, e))?;
        Ok(())
    }

    pub fn to_ron(&self) -> Result<String, String> {
        let pretty = ron::ser::PrettyConfig::default();
        ron::ser::to_string_pretty(self, pretty)
            .map_err(|e| format!("Failed to serialize settings: {}", e))
    }

    /// Run options a note starts from when it has no remembered values.
    pub fn default_options(&self) -> InflectionOptions {
        InflectionOptions {
            include_plural: self.include_plural,
            inflect_filename: self.inflect_filename,
        }
    }

    /// The inflector actually used: the stub requires debug mode.
    pub fn effective_inflector(&self) -> InflectorKind {
        if self.inflector.is_debug_only() && !self.debug {
            log::warn!(
                "[SETTINGS] {} inflector requires debug mode, falling back to {}",
                self.inflector.display_name(),
                InflectorKind::Morpher.display_name()
            );
            return InflectorKind::Morpher;
        }
        self.inflector
    }
}
