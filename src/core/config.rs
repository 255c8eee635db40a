use crate::core::scale::ScaleMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Largest frame side ffmpeg's common encoders accept.
pub const MAX_DIMENSION: u32 = 16384;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionPreset {
    pub label: String,
    pub width: u32,
    pub height: u32,
}

impl ResolutionPreset {
    fn new(label: &str, width: u32, height: u32) -> Self {
        Self {
            label: label.to_string(),
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    pub output_formats: Vec<String>,
    pub pixel_formats: Vec<String>,
    pub presets: Vec<ResolutionPreset>,
    pub default_width: u32,
    pub default_height: u32,
    pub default_scale_mode: ScaleMode,
    pub max_width: u32,
    pub max_height: u32,
    pub jpeg_quality: u8,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            output_formats: ["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm", "m4v"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            pixel_formats: [
                "yuv420p", "yuv422p", "yuv444p", "rgb24", "bgr24", "argb", "rgba", "abgr",
                "bgra", "gray", "nv12", "nv21",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            presets: vec![
                ResolutionPreset::new("720p", 1280, 720),
                ResolutionPreset::new("1080p", 1920, 1080),
                ResolutionPreset::new("4K", 3840, 2160),
            ],
            default_width: 1280,
            default_height: 720,
            default_scale_mode: ScaleMode::AspectFit,
            max_width: 7680,
            max_height: 4320,
            jpeg_quality: 95,
        }
    }
}

impl AppConfig {
    /// Reads the optional config file. Nothing is ever written back: a
    /// missing or broken file just means defaults.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        if !config_path.exists() {
            log::info!("No config file at {}, using defaults", config_path.display());
            return Self::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(content) => match Self::from_json(&content) {
                Ok(config) => {
                    log::info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Config file {} has issues ({}), using defaults", config_path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read config file at {}: {}", config_path.display(), e);
                Self::default()
            }
        }
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        if config.max_width < 2 || config.max_height < 2 {
            return Err(anyhow::anyhow!(
                "Maximum resolution {}x{} is below 2x2",
                config.max_width,
                config.max_height
            ));
        }
        if config.max_width > MAX_DIMENSION || config.max_height > MAX_DIMENSION {
            return Err(anyhow::anyhow!(
                "Maximum resolution {}x{} exceeds {}x{}",
                config.max_width,
                config.max_height,
                MAX_DIMENSION,
                MAX_DIMENSION
            ));
        }
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("video-tools")
            .join("config.json")
    }
}
