use crate::error::ConfigError;
use crate::storage::SqliteStore;
use crate::voice::SpeechSettings;
use adw::prelude::*;
use adw::Application;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8500/api";
pub const API_URL_ENV: &str = "CAMPUS_ASSISTANT_API_URL";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub speech: SpeechSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            speech: SpeechSettings::default(),
        }
    }
}

impl Settings {
    fn toml_path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.config_dir().join("campus-assistant.toml"))
    }

    /// Reads the settings file, writing the defaults out on first run.
    /// A broken file is reported and replaced by defaults for this session.
    pub fn load() -> Self {
        let mut settings = match Self::toml_path() {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                log::warn!("Ignoring settings at {}: {}", path.display(), e);
                Self::default()
            }),
            Some(path) => {
                let settings = Self::default();
                if let Err(e) = settings.save_to(&path) {
                    log::warn!("Could not write default settings: {}", e);
                }
                settings
            }
            None => Self::default(),
        };
        settings.apply_env(std::env::var(API_URL_ENV).ok());
        settings
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    fn apply_env(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url;
        }
    }
}

/// Remembers whether the window was already built for this process.
#[derive(Debug, Default)]
pub struct Activation {
    built: Cell<bool>,
}

impl Activation {
    /// True for the first call only.
    pub fn claim(&self) -> bool {
        !self.built.replace(true)
    }
}

/// Handles `activate`. Storage, session and voice are set up once; a later
/// activation (e.g. launching the app again) raises the existing window.
pub fn activate(app: &Application, activation: &Activation) {
    if !activation.claim() {
        if let Some(window) = app.active_window() {
            window.present();
        }
        return;
    }
    build_ui(app);
}

fn build_ui(app: &Application) {
    let settings = Settings::load();
    let store = match SqliteStore::open_default() {
        Ok(store) => store,
        Err(e) => {
            log::warn!("Chat history will not survive a restart: {}", e);
            match SqliteStore::open_in_memory() {
                Ok(store) => store,
                Err(e) => {
                    log::error!("No storage available: {}", e);
                    return;
                }
            }
        }
    };
    crate::ui::main_window::show_main_window(app, &settings, Rc::new(store));
}
