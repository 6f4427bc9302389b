use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::logging::LogLevel;
use crate::video::{VideoCodec, VideoFormat};
use crate::wifi::WIFI_MANIFEST_FILENAME;

/// Environment variable overriding the manifest location
pub const MANIFEST_PATH_ENV: &str = "OPENHD_WIFI_MANIFEST";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Log level
    pub log_level: LogLevel,
    /// Camera stream settings
    pub video: VideoConfig,
    /// WiFi adapter settings
    pub wifi: WifiConfig,
}

/// Camera stream configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VideoConfig {
    /// Video codec
    pub codec: VideoCodec,
    /// Resolution width
    pub width: u32,
    /// Resolution height
    pub height: u32,
    /// Frame rate
    pub fps: u32,
    /// Target bitrate in kbit/s
    pub bitrate_kbps: u32,
    /// Local UDP port the RTP stream is sent to
    pub udp_port: u16,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            codec: VideoCodec::H264,
            width: 1280,
            height: 720,
            fps: 30,
            bitrate_kbps: 5000,
            udp_port: 5600,
        }
    }
}

impl VideoConfig {
    /// Requested video format
    pub fn format(&self) -> VideoFormat {
        VideoFormat::new(self.codec, self.width, self.height, self.fps)
    }
}

/// WiFi configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WifiConfig {
    /// Manifest file location
    pub manifest_path: PathBuf,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            manifest_path: PathBuf::from(WIFI_MANIFEST_FILENAME),
        }
    }
}

impl WifiConfig {
    /// Manifest path, with the environment variable taking priority
    pub fn resolved_manifest_path(&self) -> PathBuf {
        match std::env::var(MANIFEST_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => self.manifest_path.clone(),
        }
    }
}
