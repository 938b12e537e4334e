use std::collections::HashSet;
use log::{debug, info, warn};
use serde::Serialize;
use crate::classifier::StreamDescriptor;
use crate::config::{DownmixConfig, NormalizationConfig, PanWeights};
use crate::language;
use crate::plan::{AudioPlanEntry, FilterGraphSegment};

/// Surround layouts that get a generated stereo track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SurroundLayout {
    Quad,
    Surround51,
    Surround71,
}

impl SurroundLayout {
    /// 4 channels is 4.0, 6 is 5.1, 8 or more is 7.1; anything else has no downmix
    pub fn from_channels(channels: u32) -> Option<Self> {
        match channels {
            4 => Some(SurroundLayout::Quad),
            6 => Some(SurroundLayout::Surround51),
            c if c >= 8 => Some(SurroundLayout::Surround71),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SurroundLayout::Quad => "4.0",
            SurroundLayout::Surround51 => "5.1",
            SurroundLayout::Surround71 => "7.1",
        }
    }
}

/// Title layout label: 1.0, 2.0, 5.1, 7.1, otherwise "<n>ch"
pub fn channel_layout_name(channels: u32) -> String {
    match channels {
        1 => "1.0".to_string(),
        2 => "2.0".to_string(),
        6 => "5.1".to_string(),
        8 => "7.1".to_string(),
        n => format!("{}ch", n),
    }
}

/// Title given to generated stereo tracks
pub fn generated_title(lang: &str) -> String {
    format!("{} Stereo", language::display_code(lang))
}

/// Lowercased, whitespace-collapsed title (NBSP counts as a space)
fn canonical_title(title: &str) -> String {
    title
        .replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Audio entries and filter graph produced by the downmix planner
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DownmixOutcome {
    /// Source order; a generated entry directly precedes its source stream
    pub entries: Vec<AudioPlanEntry>,
    pub segments: Vec<FilterGraphSegment>,
}

/// Plans stereo downmixes for surround audio
pub struct DownmixPlanner<'a> {
    config: &'a DownmixConfig,
}

impl<'a> DownmixPlanner<'a> {
    pub fn new(config: &'a DownmixConfig) -> Self {
        DownmixPlanner { config }
    }

    /// Stereo streams dropped in favour of a generated track
    ///
    /// A 2-channel track whose title matches the generated title is replaced
    /// when its language receives a new stereo track.
    pub fn replaced_stereo(&self, streams: &[StreamDescriptor]) -> HashSet<i32> {
        let languages_with_new_stereo: HashSet<&str> = streams
            .iter()
            .filter(|s| s.is_audio() && self.layout_of(s).is_some())
            .map(|s| s.language.as_str())
            .collect();

        streams
            .iter()
            .filter(|s| {
                s.is_audio()
                    && s.channels().unwrap_or(2) == 2
                    && languages_with_new_stereo.contains(s.language.as_str())
                    && canonical_title(&s.title) == canonical_title(&generated_title(&s.language))
            })
            .map(|s| s.index)
            .collect()
    }

    /// Build the audio entries for all audio streams, leaving out replaced stereo tracks
    pub fn plan(&self, streams: &[StreamDescriptor], default_audio: Option<i32>) -> DownmixOutcome {
        let mut outcome = DownmixOutcome::default();
        let replaced = self.replaced_stereo(streams);

        for stream in streams.iter().filter(|s| s.is_audio()) {
            let channels = stream.channels().unwrap_or(2);

            if replaced.contains(&stream.index) {
                info!(
                    "Stream #{}: replacing existing stereo track \"{}\"",
                    stream.index, stream.title
                );
                continue;
            }

            match self.layout_of(stream) {
                Some(layout) => {
                    info!(
                        "🎧 Stream #{}: {}ch ({}) -> generating normalized stereo",
                        stream.index,
                        channels,
                        layout.name()
                    );
                    let segment = self.segment(stream.index, layout);
                    outcome.entries.push(AudioPlanEntry {
                        source_index: stream.index,
                        is_generated: true,
                        language: stream.language.clone(),
                        channels: 2,
                        map_label: format!("[{}]", segment.output_label),
                        title: generated_title(&stream.language),
                        is_default_candidate: false,
                    });
                    outcome.segments.push(segment);
                }
                None if channels > 2 && self.config.enabled => {
                    warn!(
                        "Stream #{}: unsupported {}-channel layout, not downmixed",
                        stream.index, channels
                    );
                }
                None => {
                    debug!("Stream #{}: {}ch, no downmix", stream.index, channels);
                }
            }

            outcome.entries.push(AudioPlanEntry {
                source_index: stream.index,
                is_generated: false,
                language: stream.language.clone(),
                channels,
                map_label: format!("0:{}", stream.index),
                title: format!(
                    "{} {}",
                    language::display_code(&stream.language),
                    channel_layout_name(channels)
                ),
                is_default_candidate: default_audio == Some(stream.index),
            });
        }

        outcome
    }

    fn layout_of(&self, stream: &StreamDescriptor) -> Option<SurroundLayout> {
        if !self.config.enabled {
            return None;
        }
        stream.channels().and_then(SurroundLayout::from_channels)
    }

    /// Filter graph segment downmixing one source stream
    pub fn segment(&self, index: i32, layout: SurroundLayout) -> FilterGraphSegment {
        let weights = match layout {
            SurroundLayout::Quad => &self.config.quad,
            SurroundLayout::Surround51 => &self.config.surround_5_1,
            SurroundLayout::Surround71 => &self.config.surround_7_1,
        };

        let mut chain = vec![pan_expression(weights)];
        chain.extend(normalization_chain(&self.config.normalization));

        FilterGraphSegment {
            input_label: format!("0:{}", index),
            chain,
            output_label: format!("aud_norm_{}", index),
        }
    }
}

/// `pan=stereo|FL=...|FR=...` with terms in front, center, LFE, back, side order
pub fn pan_expression(weights: &PanWeights) -> String {
    let side = |front: &str, back: &str, surround: &str| {
        let terms: Vec<String> = [
            (weights.front, front),
            (weights.center, "FC"),
            (weights.lfe, "LFE"),
            (weights.back, back),
            (weights.side, surround),
        ]
        .iter()
        .filter(|(weight, _)| *weight != 0.0)
        .map(|(weight, channel)| format!("{:?}*{}", weight, channel))
        .collect();

        if terms.is_empty() {
            format!("0.0*{}", front)
        } else {
            terms.join("+")
        }
    };

    format!(
        "pan=stereo|FL={}|FR={}",
        side("FL", "BL", "SL"),
        side("FR", "BR", "SR")
    )
}

/// Post-pan stages: compressor (optional), loudness normalizer, EQ, high-pass, limiter
pub fn normalization_chain(config: &NormalizationConfig) -> Vec<String> {
    let mut chain = Vec::new();

    if let Some(comp) = &config.compressor {
        chain.push(format!(
            "acompressor=threshold={}dB:ratio={}:attack={}:release={}:mix={}",
            comp.threshold_db, comp.ratio, comp.attack_ms, comp.release_ms, comp.mix
        ));
    }

    let loudness = &config.loudness;
    chain.push(format!(
        "dynaudnorm=f={}:g={}:p={}",
        loudness.frame_ms, loudness.gauss_size, loudness.peak
    ));

    let eq = &config.equalizer;
    chain.push(format!(
        "equalizer=f={}:t=q:w={}:g={}",
        eq.frequency_hz, eq.width_q, eq.gain_db
    ));

    chain.push(format!("highpass=f={}", config.highpass_hz));

    // Limiter stays last
    chain.push(format!("alimiter=limit={}", config.limiter_ceiling));

    chain
}
