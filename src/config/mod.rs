//! Configuration
//!
//! Every section defaults independently, so a partial JSON document only
//! overrides the keys it names.

mod schema;

pub use schema::*;

use crate::error::{Error, Result};

impl AppConfig {
    /// Parse configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AppConfig =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configured stream can be assembled at all
    pub fn validate(&self) -> Result<()> {
        self.video
            .format()
            .validate()
            .map_err(|reason| Error::Config(format!("video: {}", reason)))?;

        if self.video.bitrate_kbps == 0 {
            return Err(Error::Config("video: bitrate must be non-zero".to_string()));
        }
        if self.video.udp_port == 0 {
            return Err(Error::Config("video: udp_port must be non-zero".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;
    use crate::video::VideoCodec;
    use std::path::PathBuf;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.video.format().to_string(), "h264|1280x720@30");
        assert_eq!(config.video.udp_port, 5600);
        assert_eq!(config.wifi.manifest_path, PathBuf::from("/tmp/wifi_manifest"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = AppConfig::from_json(
            r#"{ "log_level": "debug", "video": { "codec": "h265", "bitrate_kbps": 8000 } }"#,
        )
        .unwrap();

        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.video.codec, VideoCodec::H265);
        assert_eq!(config.video.bitrate_kbps, 8000);
        assert_eq!(config.video.width, 1280);
        assert_eq!(config.wifi, WifiConfig::default());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            AppConfig::from_json(r#"{ "video": { "codec": "vp8" } }"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            AppConfig::from_json(r#"{ "video": { "fps": 0 } }"#),
            Err(Error::Config(msg)) if msg.contains("framerate")
        ));
        assert!(AppConfig::from_json(r#"{ "video": { "udp_port": 0 } }"#).is_err());
    }

    #[test]
    fn test_manifest_path_env_override() {
        let config = WifiConfig::default();
        std::env::set_var(MANIFEST_PATH_ENV, "/run/openhd/wifi_manifest");
        assert_eq!(
            config.resolved_manifest_path(),
            PathBuf::from("/run/openhd/wifi_manifest")
        );
        std::env::remove_var(MANIFEST_PATH_ENV);
        assert_eq!(config.resolved_manifest_path(), PathBuf::from("/tmp/wifi_manifest"));
    }

    #[test]
    fn test_round_trip_json() {
        let mut config = AppConfig::default();
        config.video.codec = VideoCodec::Mjpeg;
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(AppConfig::from_json(&json).unwrap(), config);
    }
}
