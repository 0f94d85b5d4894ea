use crate::dialogs::DialogConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Application settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Element fade-in duration in milliseconds
    pub fade_in_ms: u64,

    /// Element fade-out duration in milliseconds
    pub fade_out_ms: u64,

    /// Interval between timer ticks in milliseconds
    pub tick_interval_ms: u64,

    /// Priority for dialogs that do not set one
    pub default_priority: i32,

    /// Whether dialogs are modal unless they say otherwise
    pub default_modal: bool,

    /// Whether dialogs render a close control unless they say otherwise
    pub default_show_close: bool,

    /// Enable mouse support in the terminal demo
    pub mouse_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fade_in_ms: 200,
            fade_out_ms: 150,
            tick_interval_ms: 50,
            default_priority: 1,
            default_modal: false,
            default_show_close: true,
            mouse_enabled: true,
        }
    }
}

impl Settings {
    /// Initialize settings: defaults, then a settings file, then environment
    pub fn init() -> Result<Self> {
        debug!("Initializing settings");

        let mut settings = match Self::find_file() {
            Some(path) => Self::load_from_path(&path)?,
            None => Self::default(),
        };
        settings.load_from_env();
        settings.validate()?;

        Ok(settings)
    }

    /// Settings file candidates, in priority order:
    /// 1. ./.dialogq.json
    /// 2. ./dialogq.json
    /// 3. $CONFIG_DIR/dialogq/config.json
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("./.dialogq.json"), PathBuf::from("./dialogq.json")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("dialogq").join("config.json"));
        }
        paths
    }

    fn find_file() -> Option<PathBuf> {
        Self::candidate_paths().into_iter().find(|path| path.exists())
    }

    /// Load settings from a JSON file; missing fields keep their defaults
    pub fn load_from_path(path: &Path) -> Result<Self> {
        debug!("Loading settings from: {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid settings file {}", path.display()))
    }

    /// Load settings from `DIALOGQ_*` environment variables
    pub fn load_from_env(&mut self) {
        self.apply_env(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an environment lookup; unparsable values are ignored
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        fn parse<T: std::str::FromStr>(value: Option<String>) -> Option<T> {
            value.and_then(|value| value.trim().parse().ok())
        }
        fn flag(value: Option<String>) -> Option<bool> {
            value.map(|value| matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
        }

        if let Some(ms) = parse(lookup("DIALOGQ_FADE_IN_MS")) {
            self.fade_in_ms = ms;
        }
        if let Some(ms) = parse(lookup("DIALOGQ_FADE_OUT_MS")) {
            self.fade_out_ms = ms;
        }
        if let Some(ms) = parse(lookup("DIALOGQ_TICK_INTERVAL_MS")) {
            self.tick_interval_ms = ms;
        }
        if let Some(priority) = parse(lookup("DIALOGQ_DEFAULT_PRIORITY")) {
            self.default_priority = priority;
        }
        if let Some(modal) = flag(lookup("DIALOGQ_DEFAULT_MODAL")) {
            self.default_modal = modal;
        }
        if let Some(show_close) = flag(lookup("DIALOGQ_DEFAULT_SHOW_CLOSE")) {
            self.default_show_close = show_close;
        }
        if let Some(mouse) = flag(lookup("DIALOGQ_MOUSE")) {
            self.mouse_enabled = mouse;
        }
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(anyhow::anyhow!("tick_interval_ms must be greater than 0"));
        }
        if self.tick_interval_ms > 1000 {
            return Err(anyhow::anyhow!(
                "tick_interval_ms must not exceed 1000, countdowns tick once per second"
            ));
        }
        Ok(())
    }

    pub fn fade_in(&self) -> Duration {
        Duration::from_millis(self.fade_in_ms)
    }

    pub fn fade_out(&self) -> Duration {
        Duration::from_millis(self.fade_out_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Built-in dialog defaults adjusted by these settings
    pub fn dialog_defaults(&self) -> DialogConfig {
        DialogConfig::default()
            .with_priority(self.default_priority)
            .modal(self.default_modal)
            .show_close(self.default_show_close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"fade_in_ms": 500, "default_modal": true}}"#).unwrap();

        let settings = Settings::load_from_path(file.path()).unwrap();
        assert_eq!(settings.fade_in_ms, 500);
        assert!(settings.default_modal);
        assert_eq!(settings.fade_out_ms, Settings::default().fade_out_ms);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = Settings::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid settings file"));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"default_priority": 4, "mouse_enabled": true}}"#).unwrap();
        let mut settings = Settings::load_from_path(file.path()).unwrap();

        let env: HashMap<&str, &str> = [
            ("DIALOGQ_DEFAULT_PRIORITY", "9"),
            ("DIALOGQ_MOUSE", "false"),
            ("DIALOGQ_FADE_OUT_MS", "not a number"),
        ]
        .into_iter()
        .collect();
        settings.apply_env(|key| env.get(key).map(|value| value.to_string()));

        assert_eq!(settings.default_priority, 9);
        assert!(!settings.mouse_enabled);
        assert_eq!(settings.fade_out_ms, Settings::default().fade_out_ms);
    }

    #[test]
    fn test_validate() {
        assert!(Settings::default().validate().is_ok());

        let settings = Settings {
            tick_interval_ms: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_dialog_defaults() {
        let settings = Settings {
            default_priority: 3,
            default_modal: true,
            default_show_close: false,
            ..Settings::default()
        };
        let config = settings.dialog_defaults();

        assert_eq!(config.priority, 3);
        assert!(config.modal);
        assert!(!config.show_close);
        assert!(config.auto_show);
    }
}
