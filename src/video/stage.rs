//! Pipeline stage description
//!
//! A [`Pipeline`] is the handoff to the media engine: an ordered list of
//! named stages with parameters. It is built once by the assembler and is
//! read-only afterwards.

use serde::Serialize;
use std::fmt;

/// Parameter value attached to a stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Bool(bool),
    Str(String),
}

impl ParamValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(v) => Some(v),
            _ => None,
        }
    }}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<u16> for ParamValue {
    fn from(v: u16) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Str(v) if needs_quoting(v) => write!(f, "\"{}\"", v.replace('"', "\\\"")),
            ParamValue::Str(v) => write!(f, "{}", v),
        }
    }
}

fn needs_quoting(value: &str) -> bool {
    value.is_empty()
        || !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/'))
}

/// Role of a stage within the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Capture of raw or already encoded frames
    Source,
    /// Capture element with an encoder built in
    EncodingSource,
    /// Caps restriction between two stages
    CapsFilter,
    /// Colorspace/format conversion
    Convert,
    /// Buffering
    Queue,
    SoftwareEncoder,
    HardwareEncoder,
    Parser,
    Payloader,
    Sink,
}

impl StageKind {
    pub fn is_source(&self) -> bool {
        matches!(self, StageKind::Source | StageKind::EncodingSource)
    }

    pub fn is_encoder(&self) -> bool {
        matches!(
            self,
            StageKind::SoftwareEncoder | StageKind::HardwareEncoder | StageKind::EncodingSource
        )
    }
}

/// One processing step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineStage {
    /// Element name (e.g. `v4l2src`) or `capsfilter` for caps stages
    pub name: String,
    pub kind: StageKind,
    /// Parameters in insertion order
    pub params: Vec<(String, ParamValue)>,
    /// Request pad the next stage links from, if not the default src pad
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_pad: Option<String>,
}

impl PipelineStage {
    pub fn new(name: impl Into<String>, kind: StageKind) -> Self {
        Self {
            name: name.into(),
            kind,
            params: Vec::new(),
            src_pad: None,
        }
    }

    /// Caps filter stage; `caps` is the full caps string
    pub fn caps(caps: impl Into<String>) -> Self {
        let caps: String = caps.into();
        Self::new("capsfilter", StageKind::CapsFilter).param("caps", caps)
    }

    /// Add a parameter, replacing an existing one with the same key
    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => self.params.push((key, value)),
        }
        self
    }

    pub fn with_src_pad(mut self, pad: impl Into<String>) -> Self {
        self.src_pad = Some(pad.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.params.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Caps string of a caps filter stage
    pub fn caps_string(&self) -> Option<&str> {
        if self.kind != StageKind::CapsFilter {
            return None;
        }
        self.get("caps").and_then(ParamValue::as_str)
    }
}

/// `gst-launch` fragment for this stage
impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(caps) = self.caps_string() {
            return write!(f, "{}", caps);
        }

        write!(f, "{}", self.name)?;
        for (key, value) in &self.params {
            write!(f, " {}={}", key, value)?;
        }
        if let Some(pad) = &self.src_pad {
            // Linking from a named pad requires the element to be named
            match self.get("name").and_then(ParamValue::as_str) {
                Some(element) => write!(f, " {}.{}", element, pad)?,
                None => write!(f, " {}.{}", self.name, pad)?,
            }
        }
        Ok(())
    }
}

/// Caps string builder: `media, key=value, ...`
pub(crate) fn caps(media_type: &str, fields: &[(&str, String)]) -> String {
    let mut caps = media_type.to_string();
    for (key, value) in fields {
        caps.push_str(&format!(", {}={}", key, value));
    }
    caps
}

/// Ordered stage sequence ending in exactly one sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pipeline {
    stages: Vec<PipelineStage>,
}

impl Pipeline {
    /// Assemble from body stages and a terminating sink.
    ///
    /// Returns `None` when the body is empty, the body already contains a
    /// sink, or `sink` is not a sink stage.
    pub(crate) fn from_parts(body: Vec<PipelineStage>, sink: PipelineStage) -> Option<Self> {
        if body.is_empty()
            || sink.kind != StageKind::Sink
            || body.iter().any(|s| s.kind == StageKind::Sink)
        {
            return None;
        }

        let mut stages = body;
        stages.push(sink);
        Some(Self { stages })
    }

    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false for an assembled pipeline
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn source(&self) -> &PipelineStage {
        &self.stages[0]
    }

    pub fn sink(&self) -> &PipelineStage {
        &self.stages[self.stages.len() - 1]
    }

    pub fn stages_of_kind(&self, kind: StageKind) -> impl Iterator<Item = &PipelineStage> {
        self.stages.iter().filter(move |s| s.kind == kind)
    }

    pub fn find(&self, name: &str) -> Option<&PipelineStage> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// Render in `gst-launch-1.0` syntax
    pub fn to_launch_string(&self) -> String {
        self.stages
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(" ! ")
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_launch_string())
    }
}
