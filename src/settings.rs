use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tauri::AppHandle;
use tauri::Manager;
use url::Url;

use crate::modules::surface::SurfaceProfile;
use crate::modules::tabs::TabDefaults;

pub const DEFAULT_HOME_URL: &str = "https://chatgpt.com/";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub home_url: String,
    pub default_title: String,
    pub tab_bar_height: f64, // logical pixels
    pub profile: String,
    pub user_agent: Option<String>,
    pub always_on_top: bool,
    pub hide_on_close: bool,
    pub log_level: String, // "error", "warn", "info", "debug", "trace"
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            home_url: DEFAULT_HOME_URL.to_string(),
            default_title: "ChatGPT".to_string(),
            tab_bar_height: 42.0,
            profile: "chatgpt".to_string(),
            user_agent: None,
            always_on_top: false,
            hide_on_close: true,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn get_path(app: &AppHandle) -> PathBuf {
        app.path()
            .app_data_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join("settings.json")
    }

    pub fn load(app: &AppHandle) -> Self {
        Self::load_from(&Self::get_path(app))
    }

    pub fn save(&self, app: &AppHandle) -> Result<(), String> {
        self.save_to(&Self::get_path(app))
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("[Settings] Failed to parse settings: {}, returning defaults", e);
                Self::default()
            }),
            Err(e) => {
                log::warn!("[Settings] Failed to read file: {}, returning defaults", e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        let tmp_path = path.with_extension("tmp");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;

        // Write to tmp, then rename, so a crash never leaves a half-written file.
        fs::write(&tmp_path, json).map_err(|e| e.to_string())?;
        fs::rename(tmp_path, path).map_err(|e| e.to_string())?;

        Ok(())
    }

    /// Home page, falling back to the default when the configured one is unusable.
    pub fn home_url(&self) -> String {
        match Url::parse(self.home_url.trim()) {
            Ok(u) if matches!(u.scheme(), "http" | "https" | "about") => u.to_string(),
            _ => {
                log::warn!("[Settings] Ignoring invalid home_url {:?}", self.home_url);
                DEFAULT_HOME_URL.to_string()
            }
        }
    }

    pub fn tab_defaults(&self) -> TabDefaults {
        TabDefaults {
            url: self.home_url(),
            title: self.default_title.clone(),
        }
    }

    pub fn surface_profile(&self) -> SurfaceProfile {
        SurfaceProfile {
            partition: self.profile.clone(),
            user_agent: self.user_agent.clone(),
        }
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}
