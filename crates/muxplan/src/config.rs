use std::path::Path;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tunable policy for the mux plan compiler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Language preferences for default selection and subtitle filtering
    pub languages: LanguagePolicy,
    /// Surround-to-stereo downmix policy
    pub downmix: DownmixConfig,
    /// Codec policy for original audio tracks
    pub audio: AudioConfig,
    /// Video encode parameter policy
    pub video: VideoConfig,
    /// Path keywords that mark a file as animation (case-insensitive)
    pub animation_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguagePolicy {
    /// Audio languages preferred as default track (highest channel count wins)
    pub default_audio: Vec<String>,
    /// Subtitle languages that survive filtering
    pub allowed_subtitles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownmixConfig {
    pub enabled: bool,
    /// Pan weights for 4.0 sources
    pub quad: PanWeights,
    /// Pan weights for 5.1 (6 channel) sources
    pub surround_5_1: PanWeights,
    /// Pan weights for 7.1 (8+ channel) sources
    pub surround_7_1: PanWeights,
    pub normalization: NormalizationConfig,
    /// Encoder for generated stereo tracks
    pub codec: String,
    pub bitrate_kbps: u32,
}

/// Per-channel weights folded into each stereo output side.
/// Left takes FL/BL/SL, right takes FR/BR/SR; center and LFE go to both.
/// A zero weight omits the term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanWeights {
    pub front: f64,
    pub center: f64,
    pub lfe: f64,
    pub back: f64,
    pub side: f64,
}

/// Signal chain applied after the pan stage. Stage order is fixed:
/// compressor, loudness normalizer, EQ, high-pass, limiter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    pub compressor: Option<CompressorConfig>,
    pub loudness: LoudnessConfig,
    pub equalizer: EqualizerConfig,
    pub highpass_hz: u32,
    /// Limiter ceiling as linear amplitude (1.0 = full scale)
    pub limiter_ceiling: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompressorConfig {
    pub threshold_db: f64,
    pub ratio: f64,
    pub attack_ms: f64,
    pub release_ms: f64,
    pub mix: f64,
}

/// Dynamic loudness normalizer (dynaudnorm) parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoudnessConfig {
    pub frame_ms: u32,
    pub gauss_size: u32,
    pub peak: f64,
}

/// Single parametric EQ band (Q-width)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EqualizerConfig {
    pub frequency_hz: u32,
    pub width_q: f64,
    pub gain_db: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Re-encode original tracks instead of stream-copying them
    pub reencode_originals: bool,
    pub codec: String,
    /// Source codecs that are always copied when re-encoding is on
    pub passthrough_codecs: Vec<String>,
    pub bitrates: BitrateLadder,
}

/// Channel-count based bitrates for re-encoded originals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BitrateLadder {
    pub mono_kbps: u32,
    pub stereo_kbps: u32,
    /// 3 to 5 channels
    pub surround_kbps: u32,
    /// 6 or more channels
    pub multichannel_kbps: u32,
}

impl BitrateLadder {
    /// Bitrate for a re-encoded track with the given channel count
    pub fn for_channels(&self, channels: u32) -> u32 {
        match channels {
            0 | 1 => self.mono_kbps,
            2 => self.stereo_kbps,
            3..=5 => self.surround_kbps,
            _ => self.multichannel_kbps,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub encoder: String,
    pub preset: u8,
    pub pixel_format: String,
    /// Output container passed to the muxer
    pub container: String,
    pub crf: CrfTable,
    /// CRF increase for animated content
    pub animation_crf_offset: u8,
    pub film_grain: FilmGrainTable,
    /// Colour metadata used when an HDR source leaves a field unset (HDR10)
    pub hdr_fallback: ColorDefaults,
    /// Denoise filter for animation; replaces grain synthesis and sharpening
    pub denoise_filter: String,
    /// Sharpen filter for live-action HDR
    pub hdr_sharpen_filter: Option<String>,
    /// svtav1-params always emitted, in order
    pub base_encoder_params: Vec<String>,
    /// Flag carrying the encoder params; derived from `encoder` when unset
    pub encoder_params_flag: Option<String>,
}

/// CRF per pixel-count tier. Lower CRF = higher quality.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrfTable {
    pub uhd_min_pixels: u64,
    pub hd_min_pixels: u64,
    pub uhd: CrfPair,
    pub hd: CrfPair,
    pub sd: CrfPair,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrfPair {
    pub sdr: u8,
    pub hdr: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilmGrainTable {
    pub uhd_sdr: u8,
    pub sdr: u8,
    pub uhd_hdr: u8,
    pub hdr: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorDefaults {
    pub primaries: String,
    pub transfer: String,
    pub space: String,
    pub chroma_location: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Default for LanguagePolicy {
    fn default() -> Self {
        Self {
            default_audio: strings(&["ger", "de", "deu"]),
            allowed_subtitles: strings(&["eng", "en", "ger", "de", "deu", "jpn", "und"]),
        }
    }
}

impl Default for DownmixConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            quad: PanWeights { front: 0.9, center: 0.0, lfe: 0.0, back: 0.35, side: 0.35 },
            surround_5_1: PanWeights { front: 1.0, center: 1.0, lfe: 0.75, back: 0.25, side: 0.25 },
            surround_7_1: PanWeights { front: 1.0, center: 1.0, lfe: 0.75, back: 0.35, side: 0.35 },
            normalization: NormalizationConfig::default(),
            codec: "libopus".to_string(),
            bitrate_kbps: 192,
        }
    }
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            compressor: Some(CompressorConfig {
                threshold_db: -12.0,
                ratio: 4.0,
                attack_ms: 5.0,
                release_ms: 250.0,
                mix: 0.5,
            }),
            loudness: LoudnessConfig { frame_ms: 125, gauss_size: 13, peak: 0.75 },
            equalizer: EqualizerConfig { frequency_hz: 2000, width_q: 1.0, gain_db: 2.0 },
            highpass_hz: 20,
            limiter_ceiling: 0.9,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            reencode_originals: false,
            codec: "libopus".to_string(),
            passthrough_codecs: strings(&["opus"]),
            bitrates: BitrateLadder {
                mono_kbps: 96,
                stereo_kbps: 160,
                surround_kbps: 320,
                multichannel_kbps: 448,
            },
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            encoder: "libsvtav1".to_string(),
            preset: 5,
            pixel_format: "yuv420p10le".to_string(),
            container: "matroska".to_string(),
            crf: CrfTable::default(),
            animation_crf_offset: 2,
            film_grain: FilmGrainTable { uhd_sdr: 10, sdr: 12, uhd_hdr: 8, hdr: 10 },
            hdr_fallback: ColorDefaults {
                primaries: "bt2020".to_string(),
                transfer: "smpte2084".to_string(),
                space: "bt2020nc".to_string(),
                chroma_location: "topleft".to_string(),
            },
            denoise_filter: "hqdn3d=1.5:1.5:3:3".to_string(),
            hdr_sharpen_filter: Some("cas=0.5".to_string()),
            base_encoder_params: strings(&["tune=0", "enable-overlays=1", "scd=1"]),
            encoder_params_flag: None,
        }
    }
}

impl VideoConfig {
    /// Private-options flag for the configured encoder, if it has one
    pub fn params_flag(&self) -> Option<String> {
        if let Some(flag) = &self.encoder_params_flag {
            return Some(flag.clone());
        }
        let flag = match self.encoder.as_str() {
            "libsvtav1" => "-svtav1-params",
            "libaom-av1" => "-aom-params",
            "libx265" => "-x265-params",
            "libx264" => "-x264-params",
            _ => return None,
        };
        Some(flag.to_string())
    }
}

impl Default for CrfTable {
    fn default() -> Self {
        Self {
            uhd_min_pixels: 5_000_000,
            hd_min_pixels: 1_000_000,
            uhd: CrfPair { sdr: 23, hdr: 21 },
            hd: CrfPair { sdr: 22, hdr: 20 },
            sd: CrfPair { sdr: 28, hdr: 28 },
        }
    }
}

impl PlannerConfig {
    /// Create a default configuration with sensible values
    pub fn default_config() -> Self {
        Self {
            languages: LanguagePolicy::default(),
            downmix: DownmixConfig::default(),
            audio: AudioConfig::default(),
            video: VideoConfig::default(),
            animation_keywords: strings(&["anime", "cartoon", "animation"]),
        }
    }

    /// Load configuration from a file, or return defaults if path is None or file doesn't exist
    pub fn load_config(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default_config();

        if let Some(config_path) = path {
            if config_path.exists() {
                let content = std::fs::read_to_string(config_path)
                    .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

                // TOML by extension, JSON otherwise
                if config_path.extension().and_then(|s| s.to_str()) == Some("toml") {
                    config = toml::from_str(&content)
                        .with_context(|| format!("Failed to parse TOML config: {}", config_path.display()))?;
                } else {
                    config = serde_json::from_str(&content)
                        .with_context(|| format!("Failed to parse JSON config: {}", config_path.display()))?;
                }
            }
        }

        Ok(config)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
