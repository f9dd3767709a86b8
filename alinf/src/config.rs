use crate::models::settings::Settings;
use std::env;
use std::path::PathBuf;

/// Environment variable names - single source of truth
pub mod env_vars {
    /// Directory holding `alinf_settings.ron` (default: current directory)
    pub const CONFIG_DIR: &str = "ALINF_CONFIG_DIR";
    /// Explicit settings file path; wins over CONFIG_DIR
    pub const SETTINGS_PATH: &str = "ALINF_SETTINGS_PATH";
    /// Overrides the stored OpenAI credential when set and non-empty
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    /// "1"/"true" turns on debug mode (exposes the stub inflector)
    pub const DEBUG: &str = "ALINF_DEBUG";
}

/// Default values
pub mod defaults {
    pub const SETTINGS_FILE: &str = "alinf_settings.ron";
    pub const MORPHER_URL: &str = "https://ws3.morpher.ru/russian/declension";
    pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";
    pub const OPENAI_MODEL: &str = "gpt-3.5-turbo";
    pub const REQUEST_TIMEOUT_SECS: u64 = 15;
    pub const OPENAI_TEMPERATURE: f32 = 0.3;
    pub const OPENAI_MAX_TOKENS: u32 = 200;
}

/// Get the directory the settings file lives in
pub fn config_dir() -> PathBuf {
    match env::var(env_vars::CONFIG_DIR) {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => PathBuf::from("."),
    }
}

/// Get the runtime settings path
pub fn settings_path() -> PathBuf {
    match env::var(env_vars::SETTINGS_PATH) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => config_dir().join(defaults::SETTINGS_FILE),
    }
}

/// Parse a boolean-ish environment flag ("1", "true", "yes" / "0", "false", "no")
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Process-level overrides read from the environment at start-up.
#[derive(Clone, Debug)]
pub struct Config {
    pub settings_path: PathBuf,
    pub debug: Option<bool>,
    pub openai_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let debug = env::var(env_vars::DEBUG).ok().and_then(|v| {
            let parsed = parse_flag(&v);
            if parsed.is_none() {
                log::warn!("Ignoring unrecognised {} value: {:?}", env_vars::DEBUG, v);
            }
            parsed
        });

        Self {
            settings_path: settings_path(),
            debug,
            openai_api_key: env::var(env_vars::OPENAI_API_KEY)
                .ok()
                .filter(|k| !k.trim().is_empty()),
        }
    }

    /// Load settings from `settings_path` and layer the environment overrides on top.
    pub fn load_settings(&self) -> Settings {
        let mut settings = Settings::load(&self.settings_path);
        self.apply(&mut settings);
        settings
    }

    fn apply(&self, settings: &mut Settings) {
        if let Some(debug) = self.debug {
            settings.debug = debug;
        }
        if let Some(key) = &self.openai_api_key {
            log::debug!("Using OpenAI API key from {}", env_vars::OPENAI_API_KEY);
            settings.openai.api_key = key.clone();
        }
    }
}
