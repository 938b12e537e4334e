use std::collections::HashSet;
use log::debug;
use crate::classifier::{StreamDescriptor, SubtitleFormat};
use crate::config::LanguagePolicy;
use crate::language;
use crate::plan::SubtitlePlanEntry;

/// Identity of a subtitle for PGS/SRT duplicate detection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubtitleRegistryKey {
    pub language: String,
    pub is_forced: bool,
}

impl SubtitleRegistryKey {
    fn of(stream: &StreamDescriptor) -> Self {
        SubtitleRegistryKey {
            language: stream.language.clone(),
            is_forced: stream.is_forced,
        }
    }
}

/// Drops disallowed-language, commentary and duplicate subtitles
pub struct SubtitleFilter<'a> {
    policy: &'a LanguagePolicy,
}

impl<'a> SubtitleFilter<'a> {
    pub fn new(policy: &'a LanguagePolicy) -> Self {
        SubtitleFilter { policy }
    }

    /// Surviving subtitle streams in source order
    ///
    /// The image-subtitle registry is built from every subtitle stream, allowed
    /// or not; a text subtitle is a duplicate when its (language, forced) key
    /// is registered. Titles do not take part in the key.
    pub fn filter<'s>(&self, streams: &'s [StreamDescriptor]) -> Vec<&'s StreamDescriptor> {
        let registry: HashSet<SubtitleRegistryKey> = streams
            .iter()
            .filter(|s| s.subtitle_format() == Some(SubtitleFormat::Image))
            .map(SubtitleRegistryKey::of)
            .collect();

        streams
            .iter()
            .filter(|s| s.is_subtitle())
            .filter(|s| {
                if !self.policy.allowed_subtitles.contains(&s.language) {
                    debug!("Subtitle #{}: dropped, language {} not allowed", s.index, s.language);
                    return false;
                }
                if s.title_contains("commentary") {
                    debug!("Subtitle #{}: dropped, commentary", s.index);
                    return false;
                }
                if s.subtitle_format() == Some(SubtitleFormat::Text)
                    && registry.contains(&SubtitleRegistryKey::of(s))
                {
                    debug!(
                        "Subtitle #{}: dropped, duplicates PGS ({}, forced={})",
                        s.index, s.language, s.is_forced
                    );
                    return false;
                }
                true
            })
            .collect()
    }
}

/// Plan entry with a standardized title: Forced, SDH, or Full
pub fn subtitle_entry(stream: &StreamDescriptor) -> SubtitlePlanEntry {
    let kind = if stream.title_contains("sdh") {
        "SDH"
    } else if stream.is_forced {
        "Forced"
    } else {
        "Full"
    };

    SubtitlePlanEntry {
        source_index: stream.index,
        language: stream.language.clone(),
        is_forced: stream.is_forced,
        title: format!("{} {}", language::display_code(&stream.language), kind),
    }
}
