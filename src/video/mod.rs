//! Camera pipeline assembly
//!
//! This module turns a camera source and a requested video format into a
//! pipeline description for the media engine. Nothing here touches hardware
//! or the engine itself.

pub mod assembler;
pub mod encoder;
pub mod format;
pub mod source;
pub mod stage;

pub use assembler::{assemble, AssemblyError, PipelineAssembler};
pub use encoder::EncoderBackend;
pub use format::{VideoCodec, VideoFormat};
pub use source::{supported_codecs, CameraSource, SourceKind};
pub use stage::{ParamValue, Pipeline, PipelineStage, StageKind};
