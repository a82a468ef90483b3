use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "chill_pulse.json";
const DATA_DIR_ENV: &str = "CHILL_PULSE_DATA_DIR";

fn default_weather_api_base() -> String {
    "https://api.openweathermap.org/data/2.5/weather".into()
}

fn default_window_size() -> (f32, f32) {
    (1000.0, 700.0)
}

/// Launch configuration. Everything the user edits at runtime lives in the
/// settings document instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Directory holding the persisted store. Defaults to `./chill_pulse_data`.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub debug_logging: bool,
    /// Write logs to this file instead of stderr.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default = "default_weather_api_base")]
    pub weather_api_base: String,
    #[serde(default = "default_window_size")]
    pub window_size: (f32, f32),
    #[serde(default)]
    pub always_on_top: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            debug_logging: false,
            log_file: None,
            weather_api_base: default_weather_api_base(),
            window_size: default_window_size(),
            always_on_top: false,
        }
    }
}

impl AppConfig {
    /// Load the config file. A missing or empty file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).unwrap_or_default();
        let mut cfg = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_json::from_str(&content)?
        };
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            cfg.data_dir = Some(PathBuf::from(dir));
        }
        Ok(cfg)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("chill_pulse_data"))
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir().join("config.json")
    }
}
