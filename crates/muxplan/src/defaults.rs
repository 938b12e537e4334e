use log::{debug, info};
use crate::classifier::StreamDescriptor;
use crate::config::LanguagePolicy;
use crate::language::LanguageFamily;

/// Picks the default audio and subtitle tracks
pub struct DefaultTrackSelector<'a> {
    policy: &'a LanguagePolicy,
}

impl<'a> DefaultTrackSelector<'a> {
    pub fn new(policy: &'a LanguagePolicy) -> Self {
        DefaultTrackSelector { policy }
    }

    /// Default audio stream
    ///
    /// Preferred-language streams win by channel count (first one on a tie);
    /// then the source-flagged default; then the first audio stream.
    pub fn select_audio<'s>(&self, streams: &'s [StreamDescriptor]) -> Option<&'s StreamDescriptor> {
        let mut preferred: Option<&StreamDescriptor> = None;
        for stream in streams.iter().filter(|s| s.is_audio()) {
            if !self.policy.default_audio.contains(&stream.language) {
                continue;
            }
            let better = match preferred {
                Some(current) => stream.channels() > current.channels(),
                None => true,
            };
            if better {
                preferred = Some(stream);
            }
        }

        let selected = preferred
            .or_else(|| streams.iter().find(|s| s.is_audio() && s.is_default))
            .or_else(|| streams.iter().find(|s| s.is_audio()));

        match selected {
            Some(stream) => info!(
                "🔊 Default audio: stream #{} ({}, {}ch)",
                stream.index,
                stream.language,
                stream.channels().unwrap_or(0)
            ),
            None => debug!("No audio streams, no default audio"),
        }

        selected
    }

    /// Default subtitle among the surviving subtitle streams, first match wins:
    /// German forced, English forced, then for Japanese audio the first full
    /// English track or else the first full German track.
    pub fn select_subtitle<'s>(
        &self,
        survivors: &[&'s StreamDescriptor],
        default_audio_language: Option<&str>,
    ) -> Option<&'s StreamDescriptor> {
        let find = |family: LanguageFamily, forced: bool| {
            survivors
                .iter()
                .copied()
                .find(|s| LanguageFamily::of(&s.language) == family && s.is_forced == forced)
        };

        let audio_is_japanese = default_audio_language
            .map(|lang| LanguageFamily::of(lang) == LanguageFamily::Japanese)
            .unwrap_or(false);

        let selected = find(LanguageFamily::German, true)
            .or_else(|| find(LanguageFamily::English, true))
            .or_else(|| {
                if audio_is_japanese {
                    find(LanguageFamily::English, false)
                        .or_else(|| find(LanguageFamily::German, false))
                } else {
                    None
                }
            });

        match selected {
            Some(stream) => info!(
                "💬 Default subtitle: stream #{} ({}, forced={})",
                stream.index, stream.language, stream.is_forced
            ),
            None => debug!("No default subtitle"),
        }

        selected
    }
}
