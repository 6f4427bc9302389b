//! Encoder backends - which encoder element exists for which codec
//!
//! Software encoders cover H.264 and H.265 only. The Jetson hardware
//! encoders cover all three codecs. Sources with a built-in encoder
//! (rpicamsrc, uvch264src) are not listed here since they never get a
//! separate encoder stage.

use std::fmt;

use super::format::{VideoCodec, VideoFormat};
use super::stage::{PipelineStage, StageKind};

/// Bitrate used for the synthetic test source, independent of the request
pub const DUMMY_BITRATE_KBPS: u32 = 5000;

/// Keyframe interval for software H.264 encoding
pub const SW_KEYFRAME_INTERVAL: u32 = 10;

/// Quality used by the Jetson hardware JPEG encoder
pub const JETSON_JPEG_QUALITY: u32 = 50;

/// Encoder backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncoderBackend {
    /// CPU encoding (x264, x265)
    Software,
    /// NVIDIA Jetson V4L2 encoders (nvv4l2h264enc, nvv4l2h265enc, nvjpegenc)
    Jetson,
}

impl EncoderBackend {
    /// Check if this is a hardware backend
    pub fn is_hardware(&self) -> bool {
        !matches!(self, EncoderBackend::Software)
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            EncoderBackend::Software => "Software",
            EncoderBackend::Jetson => "Jetson",
        }
    }

    /// Encoder element for `codec`, if this backend has one
    pub fn element_for(&self, codec: VideoCodec) -> Option<&'static str> {
        match (self, codec) {
            (EncoderBackend::Software, VideoCodec::H264) => Some("x264enc"),
            (EncoderBackend::Software, VideoCodec::H265) => Some("x265enc"),
            (EncoderBackend::Jetson, VideoCodec::H264) => Some("nvv4l2h264enc"),
            (EncoderBackend::Jetson, VideoCodec::H265) => Some("nvv4l2h265enc"),
            (EncoderBackend::Jetson, VideoCodec::Mjpeg) => Some("nvjpegenc"),
            _ => None,
        }
    }

    pub fn supports(&self, codec: VideoCodec) -> bool {
        self.element_for(codec).is_some()
    }

    fn stage_kind(&self) -> StageKind {
        if self.is_hardware() {
            StageKind::HardwareEncoder
        } else {
            StageKind::SoftwareEncoder
        }
    }

    /// Build the encoder stage for `format`.
    ///
    /// Returns `None` if the backend cannot encode the requested codec.
    pub fn encoder_stage(&self, format: &VideoFormat, bitrate_kbps: u32) -> Option<PipelineStage> {
        let element = self.element_for(format.codec)?;
        let stage = PipelineStage::new(element, self.stage_kind());

        let stage = match (self, format.codec) {
            (EncoderBackend::Software, VideoCodec::H264) => stage
                .param("name", "encodectrl")
                .param("bitrate", bitrate_kbps)
                .param("tune", "zerolatency")
                .param("key-int-max", SW_KEYFRAME_INTERVAL),
            (EncoderBackend::Software, _) => stage
                .param("name", "encodectrl")
                .param("bitrate", bitrate_kbps),
            (EncoderBackend::Jetson, VideoCodec::Mjpeg) => {
                stage.param("quality", JETSON_JPEG_QUALITY)
            }
            (EncoderBackend::Jetson, codec) => {
                let name = if codec == VideoCodec::H265 { "vnenc" } else { "nvenc" };
                stage
                    .param("name", name)
                    .param("control-rate", 1u32)
                    .param("insert-sps-pps", 1u32)
                    .param("bitrate", bitrate_kbps)
            }
        };
        Some(stage)
    }
}

/// Software H.264 stage for the synthetic test source.
///
/// Unlike the camera paths the element stays anonymous and the bitrate is
/// fixed at [`DUMMY_BITRATE_KBPS`].
pub fn test_pattern_encoder_stage() -> PipelineStage {
    PipelineStage::new("x264enc", StageKind::SoftwareEncoder)
        .param("bitrate", DUMMY_BITRATE_KBPS)
        .param("tune", "zerolatency")
        .param("key-int-max", SW_KEYFRAME_INTERVAL)
}

impl fmt::Display for EncoderBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
