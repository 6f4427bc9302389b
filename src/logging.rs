//! Logging setup and per-component log handles
//!
//! Each component receives its own [`Logger`] at construction instead of
//! looking one up in a process-wide registry. A handle is a thin wrapper
//! around a [`tracing::Span`] tagged with the component name, so every event
//! emitted through it carries `component=<name>`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::Span;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Component name used by the video pipeline assembler
pub const VIDEO_COMPONENT: &str = "ohd_video";
/// Component name used by the WiFi adapter model
pub const WIFI_COMPONENT: &str = "ohd_wifi";

/// Log level for the process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Verbose,
    Debug,
    Trace,
}

impl LogLevel {
    /// Filter directive for this level
    pub fn filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "openhd_core=error",
            LogLevel::Warn => "openhd_core=warn",
            LogLevel::Info => "openhd_core=info",
            LogLevel::Verbose => "openhd_core=debug",
            LogLevel::Debug => "openhd_core=debug",
            LogLevel::Trace => "openhd_core=trace",
        }
    }

    /// Apply a `-v` style verbosity count on top of this level
    pub fn with_verbosity(self, verbose_count: u8) -> Self {
        match verbose_count {
            0 => self,
            1 => LogLevel::Verbose,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Verbose => "verbose",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "verbose" => Ok(LogLevel::Verbose),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!("Unknown log level: {}", s)),
        }
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes priority over `level`. Calling this more than once is
/// harmless; the second call reports the failure on stderr and keeps the
/// first subscriber.
pub fn init_logging(level: LogLevel, verbose_count: u8) {
    let effective_level = level.with_verbosity(verbose_count);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| effective_level.filter().into());

    if let Err(err) = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
    {
        eprintln!("failed to initialize tracing: {}", err);
    }
}

/// Log handle owned by a single component instance
#[derive(Debug, Clone)]
pub struct Logger {
    component: &'static str,
    span: Span,
}

impl Logger {
    /// Create a handle for the named component
    pub fn new(component: &'static str) -> Self {
        Self {
            component,
            span: tracing::info_span!("component", name = component),
        }
    }

    /// Handle for the video pipeline assembler
    pub fn video() -> Self {
        Self::new(VIDEO_COMPONENT)
    }

    /// Handle for the WiFi adapter model
    pub fn wifi() -> Self {
        Self::new(WIFI_COMPONENT)
    }

    pub fn component(&self) -> &'static str {
        self.component
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.span
            .in_scope(|| tracing::debug!(component = self.component, "{}", message));
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.span
            .in_scope(|| tracing::info!(component = self.component, "{}", message));
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.span
            .in_scope(|| tracing::warn!(component = self.component, "{}", message));
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.span
            .in_scope(|| tracing::error!(component = self.component, "{}", message));
    }
}
