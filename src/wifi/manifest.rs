//! WiFi manifest - persisted snapshot of detected adapters
//!
//! The detection process writes the manifest whenever the adapter set or an
//! assignment changes; other processes load it once at startup. Only the
//! detected fields plus `use_for` and `txpower` are persisted.
//!
//! ```json
//! { "cards": [ { "driver_name": "rtl88xxau", "type": "88xxau", ... } ] }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::types::{
    classify, purpose_from_string, purpose_to_string, Adapter, AdapterCapabilities,
    AdapterSettings, AdapterType,
};
use crate::logging::Logger;

/// Well-known manifest location
pub const WIFI_MANIFEST_FILENAME: &str = "/tmp/wifi_manifest";

/// Manifest read/write failures
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to access manifest {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid manifest JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Manifest has no \"cards\" array")]
    MissingCards,

    #[error("Invalid card at index {index}: {source}")]
    Card {
        index: usize,
        source: serde_json::Error,
    },
}

/// One persisted card record
#[derive(Debug, Serialize, Deserialize)]
struct CardRecord {
    driver_name: String,
    #[serde(rename = "type")]
    adapter_type: String,
    interface_name: String,
    mac: String,
    supports_5ghz: bool,
    supports_2ghz: bool,
    supports_injection: bool,
    supports_hotspot: bool,
    supports_rts: bool,
    use_for: String,
    txpower: String,
}

impl From<&Adapter> for CardRecord {
    fn from(adapter: &Adapter) -> Self {
        let caps = &adapter.capabilities;
        Self {
            driver_name: adapter.driver_name.clone(),
            adapter_type: adapter.adapter_type.as_str().to_string(),
            interface_name: adapter.interface_name.clone(),
            mac: adapter.mac.clone(),
            supports_5ghz: caps.supports_5ghz,
            supports_2ghz: caps.supports_2ghz,
            supports_injection: caps.supports_injection,
            supports_hotspot: caps.supports_hotspot,
            supports_rts: caps.supports_rts,
            use_for: purpose_to_string(adapter.settings.use_for).to_string(),
            txpower: adapter.settings.txpower.clone(),
        }
    }
}

impl From<CardRecord> for Adapter {
    fn from(record: CardRecord) -> Self {
        // Canonical tokens parse exactly; anything else goes through the
        // driver signature table.
        let adapter_type = AdapterType::from_token(&record.adapter_type)
            .unwrap_or_else(|| classify(&record.adapter_type));

        Self {
            driver_name: record.driver_name,
            adapter_type,
            interface_name: record.interface_name,
            mac: record.mac,
            capabilities: AdapterCapabilities {
                supports_5ghz: record.supports_5ghz,
                supports_2ghz: record.supports_2ghz,
                supports_injection: record.supports_injection,
                supports_hotspot: record.supports_hotspot,
                supports_rts: record.supports_rts,
            },
            settings: AdapterSettings {
                use_for: purpose_from_string(&record.use_for),
                txpower: record.txpower,
                ..Default::default()
            },
        }
    }
}

/// Convert adapters to the manifest document
pub fn serialize(adapters: &[Adapter]) -> Value {
    let cards: Vec<CardRecord> = adapters.iter().map(CardRecord::from).collect();
    json!({ "cards": cards })
}

/// Parse a manifest document.
///
/// Fails as a whole on the first card with a missing or mistyped field.
pub fn deserialize(doc: &Value) -> Result<Vec<Adapter>, ManifestError> {
    let cards = doc
        .get("cards")
        .and_then(Value::as_array)
        .ok_or(ManifestError::MissingCards)?;

    cards
        .iter()
        .enumerate()
        .map(|(index, card)| {
            CardRecord::deserialize(card)
                .map(Adapter::from)
                .map_err(|source| ManifestError::Card { index, source })
        })
        .collect()
}

/// Write the manifest (4-space indented JSON).
///
/// The document is written next to `path` and renamed into place, so
/// readers see either the old or the new manifest.
pub fn write_manifest(path: &Path, adapters: &[Adapter]) -> Result<(), ManifestError> {
    let doc = serialize(adapters);

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    doc.serialize(&mut ser)?;

    let temp_path = temp_path_for(path);
    std::fs::write(&temp_path, &buf).map_err(|source| ManifestError::Io {
        path: temp_path.clone(),
        source,
    })?;

    std::fs::rename(&temp_path, path).map_err(|source| {
        let _ = std::fs::remove_file(&temp_path);
        ManifestError::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Staging file for `path`: the full file name with `.tmp` appended
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Read and parse the manifest, reporting why it could not be loaded
pub fn read_manifest(path: &Path) -> Result<Vec<Adapter>, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let doc: Value = serde_json::from_str(&content)?;
    deserialize(&doc)
}

/// Load the manifest for a consumer process.
///
/// Any failure yields an empty list and an error log entry; a partially
/// parsed adapter set is never returned.
pub fn load_manifest(path: &Path, log: &Logger) -> Vec<Adapter> {
    match read_manifest(path) {
        Ok(adapters) => {
            log.debug(format_args!(
                "Loaded {} WiFi adapter(s) from {}",
                adapters.len(),
                path.display()
            ));
            adapters
        }
        Err(e) => {
            log.error(format_args!("WiFi manifest processing failed: {}", e));
            Vec::new()
        }
    }
}
