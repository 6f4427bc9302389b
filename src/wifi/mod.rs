//! WiFi adapter capability model
//!
//! Classifies adapters by driver, holds their per-adapter settings and
//! persists the detected set to the WiFi manifest for other processes.

pub mod manifest;
pub mod types;

pub use manifest::{
    deserialize, load_manifest, read_manifest, serialize, write_manifest, ManifestError,
    WIFI_MANIFEST_FILENAME,
};
pub use types::{
    classify, purpose_from_string, purpose_to_string, Adapter, AdapterCapabilities,
    AdapterPurpose, AdapterSettings, AdapterType, HotspotType, DEFAULT_TX_POWER,
};
