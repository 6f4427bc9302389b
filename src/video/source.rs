//! Camera sources and their codec compatibility
//!
//! A [`CameraSource`] only identifies the hardware (bus, sensor, device node
//! or URL). Which codecs a source can deliver is a property of its
//! [`SourceKind`] and is kept in a single table, [`supported_codecs`].

use serde::{Deserialize, Serialize};
use std::fmt;

use super::format::VideoCodec;

/// Camera hardware or transport a pipeline starts from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "handle", rename_all = "snake_case")]
pub enum CameraSource {
    /// Synthetic test pattern
    Dummy,
    /// Raspberry Pi CSI camera on the given bus
    RaspberryPiCsi(String),
    /// Jetson CSI camera with the given sensor id
    JetsonCsi(u32),
    /// V4L2 device producing raw frames (e.g. /dev/video0)
    V4l2Raw(String),
    /// V4L2 device producing already encoded frames
    V4l2Encoded(String),
    /// UVC camera with on-board H.264 encoder
    UvcH264(String),
    /// IP camera reachable over RTSP
    IpCameraRtsp(String),
}

impl CameraSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            CameraSource::Dummy => SourceKind::Dummy,
            CameraSource::RaspberryPiCsi(_) => SourceKind::RaspberryPiCsi,
            CameraSource::JetsonCsi(_) => SourceKind::JetsonCsi,
            CameraSource::V4l2Raw(_) => SourceKind::V4l2Raw,
            CameraSource::V4l2Encoded(_) => SourceKind::V4l2Encoded,
            CameraSource::UvcH264(_) => SourceKind::UvcH264,
            CameraSource::IpCameraRtsp(_) => SourceKind::IpCameraRtsp,
        }
    }
}

impl fmt::Display for CameraSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraSource::Dummy => write!(f, "{}", self.kind()),
            CameraSource::JetsonCsi(sensor_id) => write!(f, "{} [{}]", self.kind(), sensor_id),
            CameraSource::RaspberryPiCsi(handle)
            | CameraSource::V4l2Raw(handle)
            | CameraSource::V4l2Encoded(handle)
            | CameraSource::UvcH264(handle)
            | CameraSource::IpCameraRtsp(handle) => write!(f, "{} [{}]", self.kind(), handle),
        }
    }
}

/// Variant tag of a [`CameraSource`], without the hardware handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Dummy,
    RaspberryPiCsi,
    JetsonCsi,
    V4l2Raw,
    V4l2Encoded,
    UvcH264,
    IpCameraRtsp,
}

impl SourceKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            SourceKind::Dummy => "dummy",
            SourceKind::RaspberryPiCsi => "raspberry pi csi",
            SourceKind::JetsonCsi => "jetson csi",
            SourceKind::V4l2Raw => "v4l2 raw",
            SourceKind::V4l2Encoded => "v4l2 encoded",
            SourceKind::UvcH264 => "uvc h264",
            SourceKind::IpCameraRtsp => "ip camera (rtsp)",
        }
    }

    pub fn supports(&self, codec: VideoCodec) -> bool {
        supported_codecs(*self).contains(&codec)
    }

    /// Whether the source delivers an already packetized stream
    pub fn is_prepacketized(&self) -> bool {
        matches!(self, SourceKind::IpCameraRtsp)
    }

    pub fn all() -> &'static [SourceKind] {
        &[
            SourceKind::Dummy,
            SourceKind::RaspberryPiCsi,
            SourceKind::JetsonCsi,
            SourceKind::V4l2Raw,
            SourceKind::V4l2Encoded,
            SourceKind::UvcH264,
            SourceKind::IpCameraRtsp,
        ]
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Codecs a pipeline can be assembled for, per source kind.
///
/// An IP camera's codec is whatever the remote stream carries, so every
/// known codec is accepted for it.
pub fn supported_codecs(kind: SourceKind) -> &'static [VideoCodec] {
    use VideoCodec::*;

    match kind {
        SourceKind::Dummy => &[H264],
        SourceKind::RaspberryPiCsi => &[H264],
        SourceKind::JetsonCsi => &[H264, H265, Mjpeg],
        SourceKind::V4l2Raw => &[H264, H265],
        SourceKind::V4l2Encoded => &[H264, H265, Mjpeg],
        SourceKind::UvcH264 => &[H264],
        SourceKind::IpCameraRtsp => &[H264, H265, Mjpeg],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(CameraSource::Dummy.kind(), SourceKind::Dummy);
        assert_eq!(CameraSource::JetsonCsi(1).kind(), SourceKind::JetsonCsi);
        assert_eq!(
            CameraSource::V4l2Encoded("/dev/video2".into()).kind(),
            SourceKind::V4l2Encoded
        );
    }

    #[test]
    fn test_compatibility_table() {
        assert!(SourceKind::Dummy.supports(VideoCodec::H264));
        assert!(!SourceKind::Dummy.supports(VideoCodec::H265));
        assert!(!SourceKind::V4l2Raw.supports(VideoCodec::Mjpeg));
        assert!(SourceKind::JetsonCsi.supports(VideoCodec::Mjpeg));
        assert!(!SourceKind::UvcH264.supports(VideoCodec::Mjpeg));

        // Unknown is never part of any row
        for kind in SourceKind::all() {
            assert!(!kind.supports(VideoCodec::Unknown));
            assert!(!supported_codecs(*kind).is_empty());
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(CameraSource::Dummy.to_string(), "dummy");
        assert_eq!(
            CameraSource::V4l2Raw("/dev/video0".into()).to_string(),
            "v4l2 raw [/dev/video0]"
        );
        assert_eq!(CameraSource::JetsonCsi(0).to_string(), "jetson csi [0]");
    }

    #[test]
    fn test_serde_shape() {
        let source = CameraSource::UvcH264("/dev/video1".into());
        let json = serde_json::to_string(&source).unwrap();
        assert_eq!(json, r#"{"type":"uvc_h264","handle":"/dev/video1"}"#);

        let dummy: CameraSource = serde_json::from_str(r#"{"type":"dummy"}"#).unwrap();
        assert_eq!(dummy, CameraSource::Dummy);
    }
}
