use std::collections::HashMap;
use serde::Deserialize;

/// Transfer characteristics that identify HDR content: PQ (HDR10) and HLG
pub const HDR_TRANSFERS: &[&str] = &["smpte2084", "arib-std-b67"];

/// Complete ffprobe output structure
///
/// `streams` is optional so a report without a stream list deserializes and
/// can be rejected by the classifier instead of failing inside serde.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FFProbeData {
    #[serde(default)]
    pub streams: Option<Vec<FFProbeStream>>,
    #[serde(default)]
    pub format: Option<FFProbeFormat>,
}

/// Format-level metadata from ffprobe
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FFProbeFormat {
    pub filename: Option<String>,
    #[serde(rename = "format_name")]
    pub format_name: Option<String>,
    pub tags: Option<HashMap<String, String>>,
}

/// Stream-level metadata from ffprobe
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FFProbeStream {
    pub index: i32,
    #[serde(rename = "codec_type")]
    pub codec_type: Option<String>,
    #[serde(rename = "codec_name")]
    pub codec_name: Option<String>,
    pub channels: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub tags: Option<HashMap<String, String>>,
    pub disposition: Option<HashMap<String, i32>>,
    #[serde(rename = "color_transfer")]
    pub color_transfer: Option<String>,
    #[serde(rename = "color_primaries")]
    pub color_primaries: Option<String>,
    #[serde(rename = "color_space")]
    pub color_space: Option<String>,
}

impl FFProbeData {
    /// Parse a `ffprobe -print_format json -show_streams -show_format` report
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl FFProbeStream {
    /// Look up a tag value, ignoring key case (Matroska writers disagree on it)
    ///
    /// An exact key wins; otherwise the smallest matching key is used so the
    /// result never depends on map iteration order.
    pub fn tag(&self, key: &str) -> Option<&str> {
        let tags = self.tags.as_ref()?;
        if let Some(value) = tags.get(key) {
            return Some(value.as_str());
        }
        tags.iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(key))
            .min_by(|a, b| a.0.cmp(b.0))
            .map(|(_, v)| v.as_str())
    }

    /// Check whether a disposition flag is set to 1
    pub fn has_disposition(&self, flag: &str) -> bool {
        self.disposition
            .as_ref()
            .and_then(|d| d.get(flag))
            .map(|v| *v == 1)
            .unwrap_or(false)
    }

    /// Check if content is HDR (High Dynamic Range)
    ///
    /// Only the transfer characteristic is authoritative here; BT.2020
    /// primaries alone are also used by wide-gamut SDR masters.
    pub fn is_hdr_content(&self) -> bool {
        is_hdr_transfer(self.color_transfer.as_deref())
    }
}

/// Check whether a transfer characteristic is one of the HDR curves
pub fn is_hdr_transfer(transfer: Option<&str>) -> bool {
    transfer
        .map(|t| HDR_TRANSFERS.contains(&t.to_lowercase().as_str()))
        .unwrap_or(false)
}
