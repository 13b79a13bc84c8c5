//! Configuration types for the monitor.
//!
//! Loads settings from config.json at startup, then applies environment
//! overrides (a `.env` file is loaded into the environment first). Provides
//! the timeout, tick cadence, recovery script and OCR parameters.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::capture::Region;
use crate::error::ConfigError;

pub const ENV_TIMEOUT_SECS: &str = "ZONE_MONITOR_TIMEOUT_SECS";
pub const ENV_TICK_MS: &str = "ZONE_MONITOR_TICK_MS";
pub const ENV_SCRIPT_PATH: &str = "AUTOHOTKEY_SCRIPT_PATH";
pub const ENV_EXECUTABLE: &str = "AUTOHOTKEY_EXE";
pub const ENV_ACTION_WAIT_SECS: &str = "ZONE_MONITOR_ACTION_WAIT_SECS";
pub const ENV_REGION: &str = "ZONE_MONITOR_REGION";
pub const ENV_HEADLESS: &str = "ZONE_MONITOR_HEADLESS";

/// Largest accepted `ocr.upscale`; a desktop-sized capture stays within image limits.
pub const MAX_UPSCALE: u32 = 8;

/// How the recovery script is run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    /// Script passed as the single argument to the executable.
    /// Relative paths that do not exist in the working directory are
    /// resolved against the executable's directory.
    pub script_path: PathBuf,
    /// Interpreter to run the script with. When unset, AutoHotkey is
    /// searched in its well-known install locations.
    pub executable: Option<PathBuf>,
    /// Maximum time to wait for the script to finish (seconds)
    pub wait_secs: u64,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            script_path: PathBuf::from("CallAutomation.ahk"),
            executable: None,
            wait_secs: 15,
        }
    }
}

impl ActionConfig {
    pub fn wait(&self) -> Duration {
        Duration::from_secs(self.wait_secs)
    }

    /// Returns the script path, resolving relative paths as described on `script_path`.
    pub fn resolved_script_path(&self) -> PathBuf {
        if self.script_path.is_relative() && !self.script_path.exists() {
            crate::paths::get_exe_dir().join(&self.script_path)
        } else {
            self.script_path.clone()
        }
    }
}

/// Tesseract parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract language code
    pub language: String,
    /// Tesseract page segmentation mode (6 = single uniform block of text)
    pub page_segmentation_mode: u8,
    /// Integer upscale factor applied before OCR (small UI text reads better enlarged)
    pub upscale: u32,
    /// When set, only pixels with R, G, B all above this value are kept as text
    pub threshold: Option<u8>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            page_segmentation_mode: 6,
            upscale: 2,
            threshold: None,
        }
    }
}

/// Complete monitor configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Unchanged-text duration after which the recovery action fires (seconds)
    pub timeout_secs: u64,
    /// Pause between the end of one tick and the start of the next (milliseconds)
    pub tick_interval_ms: u64,
    /// Region as `[x1, y1, x2, y2]`. When unset the region selector is shown.
    pub region: Option<[i32; 4]>,
    /// Run without a window, logging status to the console
    pub headless: bool,
    /// Maximum number of characters of detected text shown in status updates
    pub display_text_limit: usize,
    pub action: ActionConfig,
    pub ocr: OcrConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 35,
            tick_interval_ms: 1000,
            region: None,
            headless: false,
            display_text_limit: 300,
            action: ActionConfig::default(),
            ocr: OcrConfig::default(),
        }
    }
}

impl MonitorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Returns the configured region, if any, validated.
    pub fn region(&self) -> Result<Option<Region>, ConfigError> {
        self.region.map(Region::from_corners).transpose()
    }

    /// Checks every value that would make monitoring impossible.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidTickInterval);
        }
        if self.action.wait_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "action.wait_secs".to_string(),
                value: "0".to_string(),
            });
        }
        if !(1..=MAX_UPSCALE).contains(&self.ocr.upscale) {
            return Err(ConfigError::InvalidValue {
                key: "ocr.upscale".to_string(),
                value: self.ocr.upscale.to_string(),
            });
        }
        self.region()?;
        if self.headless && self.region.is_none() {
            return Err(ConfigError::MissingRegion);
        }
        Ok(())
    }

    /// Applies overrides from the environment. `lookup` returns the value of
    /// a variable, or `None` when it is unset.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = parse_env(ENV_TIMEOUT_SECS, &value)?;
        }
        if let Some(value) = lookup(ENV_TICK_MS) {
            self.tick_interval_ms = parse_env(ENV_TICK_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_SCRIPT_PATH) {
            self.action.script_path = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_EXECUTABLE) {
            self.action.executable = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup(ENV_ACTION_WAIT_SECS) {
            self.action.wait_secs = parse_env(ENV_ACTION_WAIT_SECS, &value)?;
        }
        if let Some(value) = lookup(ENV_REGION) {
            self.region = Some(Region::parse(&value)?.corners());
        }
        if let Some(value) = lookup(ENV_HEADLESS) {
            self.headless = parse_flag(ENV_HEADLESS, &value)?;
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Reads a config file. A missing file means defaults; a file that cannot
/// be read or parsed is an error.
pub fn load_config_from(config_path: &Path) -> Result<MonitorConfig, ConfigError> {
    crate::log(&format!("Looking for config at: {}", config_path.display()));

    if !config_path.exists() {
        crate::log("config.json not found. Using default config.");
        return Ok(MonitorConfig::default());
    }

    let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    let config = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: config_path.to_path_buf(),
        source,
    })?;
    crate::log("Config loaded from config.json");
    Ok(config)
}

/// Loads config.json from beside the executable, loads `.env`, applies
/// environment overrides and validates the result.
pub fn load_config() -> Result<MonitorConfig, ConfigError> {
    let mut config = load_config_from(&crate::paths::get_config_path())?;

    if let Ok(path) = dotenv::dotenv() {
        crate::log(&format!("Loaded environment from {}", path.display()));
    }

    config.apply_env_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(35));
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.action.wait(), Duration::from_secs(15));
        assert_eq!(config.display_text_limit, 300);
        assert!(config.region.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: MonitorConfig =
            serde_json::from_str(r#"{ "timeout_secs": 60, "ocr": { "upscale": 3 } }"#).unwrap();
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.tick_interval_ms, 1000);
        assert_eq!(config.ocr.upscale, 3);
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.action.script_path, PathBuf::from("CallAutomation.ahk"));
    }

    #[test]
    fn test_region_from_json() {
        let config: MonitorConfig =
            serde_json::from_str(r#"{ "region": [10, 20, 300, 400] }"#).unwrap();
        let region = config.region().unwrap().unwrap();
        assert_eq!(region.width(), 290);
        assert_eq!(region.height(), 380);
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = MonitorConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTimeout)));
    }

    #[test]
    fn test_validate_rejects_zero_tick() {
        let config = MonitorConfig {
            tick_interval_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTickInterval)
        ));
    }

    #[test]
    fn test_validate_bounds_upscale() {
        for (upscale, ok) in [(0, false), (1, true), (MAX_UPSCALE, true), (u32::MAX, false)] {
            let mut config = MonitorConfig::default();
            config.ocr.upscale = upscale;
            match config.validate() {
                Ok(()) => assert!(ok, "upscale {} accepted", upscale),
                Err(ConfigError::InvalidValue { key, value }) => {
                    assert!(!ok, "upscale {} rejected", upscale);
                    assert_eq!(key, "ocr.upscale");
                    assert_eq!(value, upscale.to_string());
                }
                Err(e) => panic!("unexpected error: {}", e),
            }
        }
    }

    #[test]
    fn test_validate_rejects_inverted_region() {
        let config = MonitorConfig {
            region: Some([300, 20, 10, 400]),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRegion { .. })
        ));
    }

    #[test]
    fn test_headless_requires_region() {
        let config = MonitorConfig {
            headless: true,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::MissingRegion)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = MonitorConfig::default();
        config
            .apply_env_overrides(env(&[
                (ENV_TIMEOUT_SECS, "90"),
                (ENV_TICK_MS, "250"),
                (ENV_SCRIPT_PATH, "C:\\bots\\Restart.ahk"),
                (ENV_EXECUTABLE, "C:\\AHK\\AutoHotkey64.exe"),
                (ENV_ACTION_WAIT_SECS, "5"),
                (ENV_REGION, "0,0,200,100"),
                (ENV_HEADLESS, "true"),
            ]))
            .unwrap();

        assert_eq!(config.timeout_secs, 90);
        assert_eq!(config.tick_interval_ms, 250);
        assert_eq!(
            config.action.script_path,
            PathBuf::from("C:\\bots\\Restart.ahk")
        );
        assert_eq!(
            config.action.executable,
            Some(PathBuf::from("C:\\AHK\\AutoHotkey64.exe"))
        );
        assert_eq!(config.action.wait_secs, 5);
        assert_eq!(config.region, Some([0, 0, 200, 100]));
        assert!(config.headless);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_override_invalid_number() {
        let mut config = MonitorConfig::default();
        let result = config.apply_env_overrides(env(&[(ENV_TIMEOUT_SECS, "soon")]));
        match result {
            Err(ConfigError::InvalidValue { key, value }) => {
                assert_eq!(key, ENV_TIMEOUT_SECS);
                assert_eq!(value, "soon");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_env_unset_keeps_file_values() {
        let mut config = MonitorConfig {
            timeout_secs: 12,
            ..Default::default()
        };
        config.apply_env_overrides(env(&[])).unwrap();
        assert_eq!(config.timeout_secs, 12);
    }

    #[test]
    fn test_load_config_from_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.timeout_secs, 35);
    }

    #[test]
    fn test_load_config_from_malformed_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        match load_config_from(&path) {
            Err(ConfigError::Parse { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_config_from_negative_timeout_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "timeout_secs": -5, "region": [0, 0, 100, 100], "headless": true }"#,
        )
        .unwrap();
        assert!(matches!(
            load_config_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "timeout_secs": 20, "headless": true }"#).unwrap();
        let config = load_config_from(&path).unwrap();
        assert_eq!(config.timeout_secs, 20);
        assert!(config.headless);
    }

    #[test]
    fn test_absolute_script_path_is_kept() {
        let dir = tempdir().unwrap();
        let script = dir.path().join("Recover.ahk");
        let action = ActionConfig {
            script_path: script.clone(),
            ..Default::default()
        };
        assert_eq!(action.resolved_script_path(), script);
    }
}
