//! OpenHD core - camera pipelines and WiFi adapter manifests
//!
//! This crate provides two independent pieces used by the OpenHD air and
//! ground units:
//!
//! - `video`: builds a validated pipeline description (capture, encode,
//!   RTP payload, UDP sink) for a camera source and requested format
//! - `wifi`: classifies WiFi adapters by driver and persists the detected
//!   set to a JSON manifest for other processes

pub mod config;
pub mod error;
pub mod logging;
pub mod video;
pub mod wifi;

pub use error::{Error, Result};
