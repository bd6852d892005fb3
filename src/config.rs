use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/app.json";

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_database_path() -> String {
    "data/trips.db".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model Gemini dùng cho mọi lời gọi (text, structured output, grounded search).
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            database_path: default_database_path(),
        }
    }
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); writing defaults",
                path.display()
            );
            let config = AppConfig::default();
            if let Err(err) = save_config(path, &config) {
                log::warn!("Unable to create {}: {err}", path.display());
            }
            config
        }
    }
}

pub fn save_config(path: &Path, config: &AppConfig) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_fills_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.database_path, "data/trips.db");
    }

    #[test]
    fn partial_config_keeps_overrides() {
        let config: AppConfig = serde_json::from_str(r#"{"model":"gemini-2.5-pro"}"#).unwrap();
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.database_path, "data/trips.db");
    }
}
