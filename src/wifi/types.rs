//! WiFi adapter data types
//!
//! Driver names and purpose strings are matched case-insensitively by
//! substring against ordered tables; the first matching entry wins.

use std::fmt;

/// Default transmit power written to new adapters
pub const DEFAULT_TX_POWER: &str = "3100";

/// Known WiFi driver families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AdapterType {
    Realtek8812au,
    Realtek8814au,
    Realtek88x2bu,
    Realtek8188eu,
    Atheros9kHtc,
    Atheros9k,
    Ralink,
    Intel,
    Broadcom,
    #[default]
    Unknown,
}

/// Driver signatures in match order.
///
/// `ath9k` is checked before `ath9k_htc`, so htc drivers classify as
/// `Atheros9k`. The 8814au family has no signature.
const DRIVER_SIGNATURES: &[(&str, AdapterType)] = &[
    ("ath9k", AdapterType::Atheros9k),
    ("ath9k_htc", AdapterType::Atheros9kHtc),
    ("88xxau", AdapterType::Realtek8812au),
    ("88x2bu", AdapterType::Realtek88x2bu),
    ("8188eu", AdapterType::Realtek8188eu),
    ("rt2800usb", AdapterType::Ralink),
    ("iwlwifi", AdapterType::Intel),
    ("brcmfmac", AdapterType::Broadcom),
];

impl AdapterType {
    /// Canonical token, as written to the manifest
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterType::Realtek8812au => "88xxau",
            AdapterType::Realtek8814au => "8814au",
            AdapterType::Realtek88x2bu => "88x2bu",
            AdapterType::Realtek8188eu => "8188eu",
            AdapterType::Atheros9kHtc => "ath9k_htc",
            AdapterType::Atheros9k => "ath9k",
            AdapterType::Ralink => "rt2800usb",
            AdapterType::Intel => "iwlwifi",
            AdapterType::Broadcom => "brcmfmac",
            AdapterType::Unknown => "unknown",
        }
    }

    /// Exact (case-insensitive) match on a canonical token
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim().to_lowercase();
        Self::all().iter().copied().find(|t| t.as_str() == token)
    }

    pub fn all() -> &'static [AdapterType] {
        &[
            AdapterType::Realtek8812au,
            AdapterType::Realtek8814au,
            AdapterType::Realtek88x2bu,
            AdapterType::Realtek8188eu,
            AdapterType::Atheros9kHtc,
            AdapterType::Atheros9k,
            AdapterType::Ralink,
            AdapterType::Intel,
            AdapterType::Broadcom,
            AdapterType::Unknown,
        ]
    }
}

impl fmt::Display for AdapterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Case-insensitive substring test
fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Classify a driver name into a known adapter family
pub fn classify(driver_name: &str) -> AdapterType {
    DRIVER_SIGNATURES
        .iter()
        .find(|(signature, _)| contains_ignore_case(driver_name, signature))
        .map(|(_, adapter_type)| *adapter_type)
        .unwrap_or(AdapterType::Unknown)
}

/// What an adapter is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AdapterPurpose {
    /// Not used for anything
    #[default]
    Unassigned,
    /// Monitor mode, used for wifibroadcast
    MonitorModeBroadcast,
    /// Runs a WiFi hotspot
    Hotspot,
}

impl AdapterPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterPurpose::Unassigned => "unknown",
            AdapterPurpose::MonitorModeBroadcast => "monitor_mode",
            AdapterPurpose::Hotspot => "hotspot",
        }
    }
}

impl fmt::Display for AdapterPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse a purpose; anything unrecognised is `Unassigned`
pub fn purpose_from_string(s: &str) -> AdapterPurpose {
    if contains_ignore_case(s, "monitor_mode") {
        AdapterPurpose::MonitorModeBroadcast
    } else if contains_ignore_case(s, "hotspot") {
        AdapterPurpose::Hotspot
    } else {
        AdapterPurpose::Unassigned
    }
}

pub fn purpose_to_string(purpose: AdapterPurpose) -> &'static str {
    purpose.as_str()
}

/// Where the ground station hotspot comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HotspotType {
    #[default]
    None,
    Internal2GBand,
    Internal5GBand,
    InternalDualBand,
    External,
}

impl HotspotType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HotspotType::None => "none",
            HotspotType::Internal2GBand => "internal2g",
            HotspotType::Internal5GBand => "internal5g",
            HotspotType::InternalDualBand => "internaldualband",
            HotspotType::External => "external",
        }
    }

    /// Same matching discipline as driver names; unmatched is `None`
    pub fn from_string(s: &str) -> Self {
        [
            HotspotType::Internal2GBand,
            HotspotType::Internal5GBand,
            HotspotType::InternalDualBand,
            HotspotType::External,
        ]
        .into_iter()
        .find(|t| contains_ignore_case(s, t.as_str()))
        .unwrap_or(HotspotType::None)
    }
}

impl fmt::Display for HotspotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operator adjustable adapter settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterSettings {
    /// Must be set for the adapter to be used at all
    pub use_for: AdapterPurpose,
    pub frequency: String,
    pub txpower: String,
    pub client_ap_name: String,
    pub client_password: String,
    pub hotspot_channel: String,
    pub hotspot_password: String,
    pub hotspot_band: String,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            use_for: AdapterPurpose::Unassigned,
            frequency: String::new(),
            txpower: DEFAULT_TX_POWER.to_string(),
            client_ap_name: String::new(),
            client_password: String::new(),
            hotspot_channel: String::new(),
            hotspot_password: String::new(),
            hotspot_band: String::new(),
        }
    }
}

/// Detected hardware capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdapterCapabilities {
    pub supports_5ghz: bool,
    pub supports_2ghz: bool,
    pub supports_injection: bool,
    pub supports_hotspot: bool,
    pub supports_rts: bool,
}

/// One detected WiFi adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adapter {
    /// Driver running the adapter, as detected
    pub driver_name: String,
    /// Derived from `driver_name`
    pub adapter_type: AdapterType,
    pub interface_name: String,
    pub mac: String,
    pub capabilities: AdapterCapabilities,
    pub settings: AdapterSettings,
}

impl Adapter {
    /// Create an adapter from detected values; the type is classified from
    /// the driver name and settings start at their defaults.
    pub fn new(
        driver_name: impl Into<String>,
        interface_name: impl Into<String>,
        mac: impl Into<String>,
        capabilities: AdapterCapabilities,
    ) -> Self {
        let driver_name = driver_name.into();
        Self {
            adapter_type: classify(&driver_name),
            driver_name,
            interface_name: interface_name.into(),
            mac: mac.into(),
            capabilities,
            settings: AdapterSettings::default(),
        }
    }

    pub fn purpose(&self) -> AdapterPurpose {
        self.settings.use_for
    }

    pub fn set_purpose(&mut self, purpose: AdapterPurpose) {
        self.settings.use_for = purpose;
    }

    /// Monitor mode broadcast needs packet injection
    pub fn is_monitor_capable(&self) -> bool {
        self.capabilities.supports_injection
    }

    pub fn is_hotspot_capable(&self) -> bool {
        self.capabilities.supports_hotspot
    }
}
