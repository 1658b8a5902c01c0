use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const APP_DIR: &str = "media-cover";
const CONFIG_FILE: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// How the hosted page's DOM is walked to reach a media container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum LocatorConfig {
    /// Fixed `previousSibling` offsets from the click target.
    SiblingOffset {
        video_offset: usize,
        picture_offset: usize,
        button_ancestor_depth: usize,
    },
    /// Nearest ancestor matching a CSS selector.
    ClosestAncestor {
        selector: String,
        button_ancestor_depth: usize,
    },
}

impl Default for LocatorConfig {
    fn default() -> Self {
        LocatorConfig::SiblingOffset {
            video_offset: 2,
            picture_offset: 1,
            button_ancestor_depth: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverConfig {
    pub dark_mode: bool,
    /// Share of the viewport the constrained media dimension fills
    pub fill_ratio: f32,
    pub max_download_bytes: u64,
    pub download_dir: PathBuf,
    pub random_name_length: usize,
    pub notification_icon: PathBuf,
    pub locator: LocatorConfig,
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            dark_mode: false,
            fill_ratio: 0.9,
            max_download_bytes: 512 * 1024 * 1024,
            download_dir: default_download_dir(),
            random_name_length: 6,
            notification_icon: PathBuf::from("static/icon.png"),
            locator: LocatorConfig::default(),
        }
    }
}

impl CoverConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
}
