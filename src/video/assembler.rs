//! Pipeline assembler
//!
//! Turns a camera source plus a requested format into an ordered stage list:
//!
//! ```text
//! capture (+ encode) ! payload (parser + RTP payloader) ! udpsink
//! ```
//!
//! Stage selection depends only on the source variant and the codec. All
//! checks run before the first stage is built, so a failed request never
//! yields a partial pipeline.

use thiserror::Error;

use super::encoder::{test_pattern_encoder_stage, EncoderBackend};
use super::format::{VideoCodec, VideoFormat};
use super::source::{CameraSource, SourceKind};
use super::stage::{caps, Pipeline, PipelineStage, StageKind};
use crate::config::VideoConfig;
use crate::logging::Logger;

/// MTU used by all RTP payloaders
pub const RTP_MTU: u32 = 1024;

/// Host the UDP sink sends to
pub const SINK_HOST: &str = "127.0.0.1";

/// Keyframe period (ms) configured on UVC H.264 cameras
pub const UVC_IFRAME_PERIOD_MS: u32 = 1000;

/// Reasons a pipeline description cannot be produced
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("Invalid video format {format}: {reason}")]
    InvalidFormat {
        format: VideoFormat,
        reason: &'static str,
    },

    #[error("{kind} source cannot produce {codec}: {}", unsupported_reason(.kind, .codec))]
    UnsupportedCodecForSource { kind: SourceKind, codec: VideoCodec },
}

fn unsupported_reason(kind: &SourceKind, codec: &VideoCodec) -> &'static str {
    match (*kind, *codec) {
        (SourceKind::Dummy | SourceKind::V4l2Raw, VideoCodec::Mjpeg) => "no software encoder for MJPEG",
        (SourceKind::Dummy, _) => "test source is only encoded as H.264",
        (SourceKind::RaspberryPiCsi, _) => "rpicamsrc only encodes H.264",
        (SourceKind::UvcH264, _) => "uvch264src only delivers H.264",
        _ => "no known stage sequence",
    }
}

/// Builds pipeline descriptions
#[derive(Debug, Clone)]
pub struct PipelineAssembler {
    log: Logger,
}

impl Default for PipelineAssembler {
    fn default() -> Self {
        Self::new(Logger::video())
    }
}

impl PipelineAssembler {
    pub fn new(log: Logger) -> Self {
        Self { log }
    }

    /// Assemble the pipeline for `source` encoding `format` at
    /// `bitrate_kbps`, sending RTP to `127.0.0.1:sink_port`.
    pub fn assemble(
        &self,
        source: &CameraSource,
        format: VideoFormat,
        bitrate_kbps: u32,
        sink_port: u16,
    ) -> Result<Pipeline, AssemblyError> {
        format
            .validate()
            .map_err(|reason| AssemblyError::InvalidFormat { format, reason })?;

        let kind = source.kind();
        if !kind.supports(format.codec) {
            return Err(AssemblyError::UnsupportedCodecForSource {
                kind,
                codec: format.codec,
            });
        }

        let mut stages = capture_stages(source, &format, bitrate_kbps)
            .ok_or(AssemblyError::UnsupportedCodecForSource {
                kind,
                codec: format.codec,
            })?;

        if !kind.is_prepacketized() {
            stages.extend(payload_stages(format.codec));
        }

        let pipeline = Pipeline::from_parts(stages, sink_stage(sink_port)).ok_or(
            AssemblyError::UnsupportedCodecForSource {
                kind,
                codec: format.codec,
            },
        )?;

        self.log.debug(format_args!(
            "Assembled pipeline for {} ({}, {} kbps): {}",
            source, format, bitrate_kbps, pipeline
        ));

        Ok(pipeline)
    }

    /// Assemble using the format, bitrate and port from `config`
    pub fn assemble_configured(
        &self,
        source: &CameraSource,
        config: &VideoConfig,
    ) -> Result<Pipeline, AssemblyError> {
        self.assemble(source, config.format(), config.bitrate_kbps, config.udp_port)
    }
}

/// Assemble with a default video log handle
pub fn assemble(
    source: &CameraSource,
    format: VideoFormat,
    bitrate_kbps: u32,
    sink_port: u16,
) -> Result<Pipeline, AssemblyError> {
    PipelineAssembler::default().assemble(source, format, bitrate_kbps, sink_port)
}

fn geometry(format: &VideoFormat) -> [(&'static str, String); 3] {
    [
        ("width", format.width.to_string()),
        ("height", format.height.to_string()),
        ("framerate", format.framerate_fraction()),
    ]
}

/// Encoded elementary stream caps at the requested geometry
fn encoded_caps(format: &VideoFormat) -> Option<PipelineStage> {
    let media_type = format.codec.encoded_media_type()?;
    Some(PipelineStage::caps(caps(media_type, &geometry(format))))
}

/// Capture (+ encode) group; ends in an encoded stream of `format.codec`.
///
/// `None` means the source has no stage sequence for the codec.
fn capture_stages(
    source: &CameraSource,
    format: &VideoFormat,
    bitrate_kbps: u32,
) -> Option<Vec<PipelineStage>> {
    let stages = match source {
        CameraSource::Dummy => {
            if format.codec != VideoCodec::H264 {
                return None;
            }
            let [width, height, framerate] = geometry(format);
            vec![
                PipelineStage::new("videotestsrc", StageKind::Source),
                PipelineStage::caps(caps(
                    "video/x-raw",
                    &[("format", "NV12".to_string()), width, height, framerate],
                )),
                test_pattern_encoder_stage(),
            ]
        }
        CameraSource::RaspberryPiCsi(bus) => {
            if format.codec != VideoCodec::H264 {
                return None;
            }
            let [width, height, framerate] = geometry(format);
            vec![
                PipelineStage::new("rpicamsrc", StageKind::EncodingSource)
                    .param("name", "bitratectrl")
                    .param("camera-number", bus.as_str())
                    .param("bitrate", bitrate_kbps)
                    .param("preview", 0u32),
                PipelineStage::caps(caps(
                    "video/x-h264",
                    &[
                        ("profile", "constrained-baseline".to_string()),
                        width,
                        height,
                        framerate,
                        ("level", "3.0".to_string()),
                    ],
                )),
            ]
        }
        CameraSource::JetsonCsi(sensor_id) => {
            let [width, height, framerate] = geometry(format);
            vec![
                PipelineStage::new("nvarguscamerasrc", StageKind::Source)
                    .param("do-timestamp", true)
                    .param("sensor-id", *sensor_id),
                PipelineStage::caps(caps(
                    "video/x-raw(memory:NVMM)",
                    &[width, height, ("format", "NV12".to_string()), framerate],
                )),
                EncoderBackend::Jetson.encoder_stage(format, bitrate_kbps)?,
            ]
        }
        CameraSource::V4l2Raw(device) => vec![
            PipelineStage::new("v4l2src", StageKind::Source)
                .param("name", "picturectrl")
                .param("device", device.as_str()),
            // Raw format and geometry are negotiated by the engine
            PipelineStage::caps("video/x-raw"),
            PipelineStage::new("videoconvert", StageKind::Convert),
            PipelineStage::new("queue", StageKind::Queue),
            EncoderBackend::Software.encoder_stage(format, bitrate_kbps)?,
        ],
        CameraSource::V4l2Encoded(device) => vec![
            PipelineStage::new("v4l2src", StageKind::Source)
                .param("name", "picturectrl")
                .param("device", device.as_str()),
            encoded_caps(format)?,
        ],
        CameraSource::UvcH264(device) => {
            if format.codec != VideoCodec::H264 {
                return None;
            }
            vec![
                PipelineStage::new("uvch264src", StageKind::EncodingSource)
                    .param("device", device.as_str())
                    .param("peak-bitrate", bitrate_kbps)
                    .param("initial-bitrate", bitrate_kbps)
                    .param("average-bitrate", bitrate_kbps)
                    .param("rate-control", 1u32)
                    .param("iframe-period", UVC_IFRAME_PERIOD_MS)
                    .param("name", "encodectrl")
                    .param("auto-start", true)
                    .with_src_pad("vidsrc"),
                encoded_caps(format)?,
            ]
        }
        CameraSource::IpCameraRtsp(url) => vec![PipelineStage::new("rtspsrc", StageKind::Source)
            .param("location", url.as_str())
            .param("latency", 0u32)],
    };
    Some(stages)
}

/// Parser + RTP payloader for `codec`
fn payload_stages(codec: VideoCodec) -> Vec<PipelineStage> {
    let (parser, payloader) = match codec {
        VideoCodec::H264 => ("h264parse", "rtph264pay"),
        VideoCodec::H265 => ("h265parse", "rtph265pay"),
        VideoCodec::Mjpeg => ("jpegparse", "rtpjpegpay"),
        VideoCodec::Unknown => return Vec::new(),
    };

    vec![
        PipelineStage::new(parser, StageKind::Parser).param("config-interval", -1i32),
        PipelineStage::new(payloader, StageKind::Payloader).param("mtu", RTP_MTU),
    ]
}

fn sink_stage(port: u16) -> PipelineStage {
    PipelineStage::new("udpsink", StageKind::Sink)
        .param("host", SINK_HOST)
        .param("port", port)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::source::supported_codecs;
    use crate::video::stage::ParamValue;

    fn fmt(codec: VideoCodec, width: u32, height: u32, fps: u32) -> VideoFormat {
        VideoFormat::new(codec, width, height, fps)
    }

    fn sources() -> Vec<CameraSource> {
        vec![
            CameraSource::Dummy,
            CameraSource::RaspberryPiCsi("0".into()),
            CameraSource::JetsonCsi(0),
            CameraSource::V4l2Raw("/dev/video0".into()),
            CameraSource::V4l2Encoded("/dev/video1".into()),
            CameraSource::UvcH264("/dev/video2".into()),
            CameraSource::IpCameraRtsp("rtsp://192.168.0.10:554/stream".into()),
        ]
    }

    #[test]
    fn test_full_compatibility_matrix() {
        for source in sources() {
            for codec in VideoCodec::all() {
                let result = assemble(&source, fmt(*codec, 1280, 720, 30), 4000, 5600);
                if supported_codecs(source.kind()).contains(codec) {
                    let pipeline = result.unwrap();
                    assert!(pipeline.source().kind.is_source(), "{}", pipeline);
                    assert_eq!(pipeline.sink().name, "udpsink");
                    assert_eq!(pipeline.stages_of_kind(StageKind::Sink).count(), 1);
                } else {
                    assert_eq!(
                        result.unwrap_err(),
                        AssemblyError::UnsupportedCodecForSource {
                            kind: source.kind(),
                            codec: *codec,
                        }
                    );
                }
            }
        }
    }

    #[test]
    fn test_jetson_h265() {
        let pipeline = assemble(
            &CameraSource::JetsonCsi(0),
            fmt(VideoCodec::H265, 1280, 720, 30),
            4000,
            5600,
        )
        .unwrap();

        let encoders: Vec<_> = pipeline.stages_of_kind(StageKind::HardwareEncoder).collect();
        assert_eq!(encoders.len(), 1);
        assert_eq!(encoders[0].name, "nvv4l2h265enc");
        assert_eq!(encoders[0].get("bitrate").and_then(ParamValue::as_int), Some(4000));

        let payloader = pipeline.stages_of_kind(StageKind::Payloader).last().unwrap();
        assert_eq!(payloader.name, "rtph265pay");

        assert_eq!(
            pipeline.to_launch_string(),
            "nvarguscamerasrc do-timestamp=true sensor-id=0 ! \
             video/x-raw(memory:NVMM), width=1280, height=720, format=NV12, framerate=30/1 ! \
             nvv4l2h265enc name=vnenc control-rate=1 insert-sps-pps=1 bitrate=4000 ! \
             h265parse config-interval=-1 ! rtph265pay mtu=1024 ! \
             udpsink host=127.0.0.1 port=5600"
        );
    }

    #[test]
    fn test_jetson_mjpeg_uses_hw_jpeg() {
        let pipeline = assemble(
            &CameraSource::JetsonCsi(1),
            fmt(VideoCodec::Mjpeg, 1920, 1080, 30),
            8000,
            5601,
        )
        .unwrap();

        assert!(pipeline.find("nvjpegenc").is_some());
        assert!(pipeline.find("jpegparse").is_some());
        assert!(pipeline.find("rtpjpegpay").is_some());
    }

    #[test]
    fn test_dummy_mjpeg_unsupported() {
        let err = assemble(
            &CameraSource::Dummy,
            fmt(VideoCodec::Mjpeg, 640, 480, 30),
            2000,
            5600,
        )
        .unwrap_err();

        assert!(matches!(err, AssemblyError::UnsupportedCodecForSource { .. }));
        assert!(err.to_string().contains("no software encoder for MJPEG"));
    }

    #[test]
    fn test_dummy_h264_uses_fixed_bitrate() {
        let pipeline = assemble(
            &CameraSource::Dummy,
            fmt(VideoCodec::H264, 640, 480, 30),
            2000,
            5600,
        )
        .unwrap();

        assert_eq!(
            pipeline.to_launch_string(),
            "videotestsrc ! video/x-raw, format=NV12, width=640, height=480, framerate=30/1 ! \
             x264enc bitrate=5000 tune=zerolatency key-int-max=10 ! \
             h264parse config-interval=-1 ! rtph264pay mtu=1024 ! \
             udpsink host=127.0.0.1 port=5600"
        );
    }

    #[test]
    fn test_invalid_format_rejected_first() {
        // Invalid format wins over an unsupported codec
        let err = assemble(&CameraSource::Dummy, fmt(VideoCodec::Mjpeg, 0, 480, 30), 2000, 5600)
            .unwrap_err();
        assert!(matches!(err, AssemblyError::InvalidFormat { .. }));

        let err = assemble(
            &CameraSource::JetsonCsi(0),
            fmt(VideoCodec::Unknown, 1280, 720, 30),
            2000,
            5600,
        )
        .unwrap_err();
        assert_eq!(
            err,
            AssemblyError::InvalidFormat {
                format: fmt(VideoCodec::Unknown, 1280, 720, 30),
                reason: "codec is unknown",
            }
        );

        // The RTSP path does not check the codec, but still checks the format
        let err = assemble(
            &CameraSource::IpCameraRtsp("rtsp://cam".into()),
            fmt(VideoCodec::H264, 1280, 720, 0),
            2000,
            5600,
        )
        .unwrap_err();
        assert!(matches!(err, AssemblyError::InvalidFormat { .. }));
    }

    #[test]
    fn test_rpi_csi() {
        let pipeline = assemble(
            &CameraSource::RaspberryPiCsi("0".into()),
            fmt(VideoCodec::H264, 1280, 720, 49),
            6000,
            5600,
        )
        .unwrap();

        assert_eq!(pipeline.source().kind, StageKind::EncodingSource);
        assert_eq!(
            pipeline.stages()[1].caps_string(),
            Some("video/x-h264, profile=constrained-baseline, width=1280, height=720, framerate=49/1, level=3.0")
        );
        assert_eq!(pipeline.stages_of_kind(StageKind::SoftwareEncoder).count(), 0);
        assert_eq!(pipeline.stages_of_kind(StageKind::HardwareEncoder).count(), 0);
    }

    #[test]
    fn test_v4l2_raw_software_path() {
        let pipeline = assemble(
            &CameraSource::V4l2Raw("/dev/video0".into()),
            fmt(VideoCodec::H265, 640, 480, 30),
            1500,
            5600,
        )
        .unwrap();

        let names: Vec<_> = pipeline.stages().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "v4l2src",
                "capsfilter",
                "videoconvert",
                "queue",
                "x265enc",
                "h265parse",
                "rtph265pay",
                "udpsink"
            ]
        );
        assert_eq!(pipeline.stages()[1].caps_string(), Some("video/x-raw"));
    }

    #[test]
    fn test_v4l2_encoded_has_no_encoder() {
        let pipeline = assemble(
            &CameraSource::V4l2Encoded("/dev/video1".into()),
            fmt(VideoCodec::Mjpeg, 1280, 720, 30),
            1500,
            5600,
        )
        .unwrap();

        assert!(pipeline.stages().iter().all(|s| !s.kind.is_encoder()));
        assert_eq!(
            pipeline.stages()[1].caps_string(),
            Some("image/jpeg, width=1280, height=720, framerate=30/1")
        );
    }

    #[test]
    fn test_uvc_h264() {
        let pipeline = assemble(
            &CameraSource::UvcH264("/dev/video2".into()),
            fmt(VideoCodec::H264, 1920, 1080, 30),
            3500,
            5600,
        )
        .unwrap();

        let source = pipeline.source();
        for key in ["peak-bitrate", "initial-bitrate", "average-bitrate"] {
            assert_eq!(source.get(key).and_then(ParamValue::as_int), Some(3500));
        }
        assert!(source
            .to_string()
            .ends_with("name=encodectrl auto-start=true encodectrl.vidsrc"));
    }

    #[test]
    fn test_rtsp_skips_payload() {
        let pipeline = assemble(
            &CameraSource::IpCameraRtsp("rtsp://192.168.0.10:554/stream".into()),
            fmt(VideoCodec::H265, 1920, 1080, 30),
            3500,
            5700,
        )
        .unwrap();

        assert_eq!(pipeline.len(), 2);
        assert_eq!(
            pipeline.to_launch_string(),
            "rtspsrc location=\"rtsp://192.168.0.10:554/stream\" latency=0 ! \
             udpsink host=127.0.0.1 port=5700"
        );
    }

    #[test]
    fn test_assemble_from_config() {
        let config = VideoConfig {
            codec: VideoCodec::H265,
            bitrate_kbps: 7000,
            udp_port: 5610,
            ..Default::default()
        };
        let pipeline = PipelineAssembler::default()
            .assemble_configured(&CameraSource::V4l2Raw("/dev/video0".into()), &config)
            .unwrap();

        let encoder = pipeline.find("x265enc").unwrap();
        assert_eq!(encoder.get("bitrate").and_then(ParamValue::as_int), Some(7000));
        assert_eq!(pipeline.sink().get("port").and_then(ParamValue::as_int), Some(5610));
    }

    #[test]
    fn test_assembler_instance_with_own_logger() {
        let assembler = PipelineAssembler::new(Logger::new("test_video"));
        let pipeline = assembler
            .assemble(&CameraSource::Dummy, VideoFormat::default(), 1000, 6000)
            .unwrap();
        assert_eq!(pipeline.sink().get("port").and_then(ParamValue::as_int), Some(6000));
    }
}
