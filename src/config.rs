use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::ImageVariant;

pub const APP_NAME: &str = "weather-bg-picker";
pub const ACCESS_KEY_ENV: &str = "UNSPLASH_ACCESS_KEY";
pub const MAX_PER_PAGE: usize = 5;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub access_key: String,
    pub output_dir: PathBuf,
    pub per_page: usize,
    pub orientation: String,
    pub content_filter: String,
    pub preview_max: u32,
    pub export_side: u32,
    pub jpeg_quality: u8,
    pub preview_variant: ImageVariant,
    pub export_variant: ImageVariant,
    pub thread_count: usize,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "https://api.unsplash.com/search/photos".to_string(),
            access_key: String::new(),
            output_dir: PathBuf::from("assets/images/weather_backgrounds"),
            per_page: MAX_PER_PAGE,
            orientation: "portrait".to_string(),
            content_filter: "high".to_string(),
            preview_max: 200,
            export_side: 1024,
            jpeg_quality: 95,
            preview_variant: ImageVariant::Regular,
            export_variant: ImageVariant::Full,
            thread_count: 0,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_NAME).join("config.toml"))
    }

    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<Config>(s).map(Config::normalized)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Missing file yields the defaults; a file that fails to parse is an error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Loads the user config (if any) and applies the environment override.
    pub fn load() -> Result<Self> {
        let config = match Self::default_path() {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_access_key_override(std::env::var(ACCESS_KEY_ENV).ok()))
    }

    pub fn with_access_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.access_key = key.trim().to_string();
        }
        self
    }

    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }

    fn normalized(mut self) -> Self {
        self.per_page = self.per_page.clamp(1, MAX_PER_PAGE);
        self.jpeg_quality = self.jpeg_quality.clamp(1, 100);
        self.preview_max = self.preview_max.max(1);
        self.export_side = self.export_side.max(1);
        self
    }
}
