//! Video codec and format definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Video codecs understood by the pipeline assembler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    /// H.264/AVC
    #[default]
    H264,
    /// H.265/HEVC
    H265,
    /// Motion JPEG
    Mjpeg,
    /// Not a usable codec; never accepted by the assembler
    Unknown,
}

impl VideoCodec {
    /// Short lowercase identifier
    pub fn id(&self) -> &'static str {
        match self {
            VideoCodec::H264 => "h264",
            VideoCodec::H265 => "h265",
            VideoCodec::Mjpeg => "mjpeg",
            VideoCodec::Unknown => "unknown",
        }
    }

    /// Media type of the encoded elementary stream
    pub fn encoded_media_type(&self) -> Option<&'static str> {
        match self {
            VideoCodec::H264 => Some("video/x-h264"),
            VideoCodec::H265 => Some("video/x-h265"),
            VideoCodec::Mjpeg => Some("image/jpeg"),
            VideoCodec::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, VideoCodec::Unknown)
    }

    /// All codecs a pipeline can be assembled for
    pub fn all() -> &'static [VideoCodec] {
        &[VideoCodec::H264, VideoCodec::H265, VideoCodec::Mjpeg]
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl std::str::FromStr for VideoCodec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "h264" | "avc" => Ok(VideoCodec::H264),
            "h265" | "hevc" => Ok(VideoCodec::H265),
            "mjpeg" | "mjpg" | "jpeg" => Ok(VideoCodec::Mjpeg),
            _ => Err(format!("Unknown video codec: {}", s)),
        }
    }
}

/// Requested output format of a camera pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoFormat {
    pub codec: VideoCodec,
    pub width: u32,
    pub height: u32,
    pub framerate: u32,
}

impl VideoFormat {
    pub fn new(codec: VideoCodec, width: u32, height: u32, framerate: u32) -> Self {
        Self {
            codec,
            width,
            height,
            framerate,
        }
    }

    /// Check the format, returning the first violated constraint
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.codec.is_known() {
            return Err("codec is unknown");
        }
        if self.width == 0 || self.height == 0 {
            return Err("resolution must be non-zero");
        }
        if self.framerate == 0 {
            return Err("framerate must be non-zero");
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Framerate as a caps fraction (e.g. "30/1")
    pub fn framerate_fraction(&self) -> String {
        format!("{}/1", self.framerate)
    }
}

impl Default for VideoFormat {
    fn default() -> Self {
        Self::new(VideoCodec::H264, 1280, 720, 30)
    }
}

/// Textual form: `h264|1280x720@30`
impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}x{}@{}",
            self.codec, self.width, self.height, self.framerate
        )
    }
}

impl std::str::FromStr for VideoFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("Invalid video format: {}", s);

        let (codec, rest) = s.split_once('|').ok_or_else(invalid)?;
        let (resolution, framerate) = rest.split_once('@').ok_or_else(invalid)?;
        let (width, height) = resolution.split_once('x').ok_or_else(invalid)?;

        Ok(Self {
            codec: codec.parse()?,
            width: width.trim().parse().map_err(|_| invalid())?,
            height: height.trim().parse().map_err(|_| invalid())?,
            framerate: framerate.trim().parse().map_err(|_| invalid())?,
        })
    }
}
