use std::cmp::Reverse;
use crate::language::LanguageFamily;
use crate::plan::{AudioPlanEntry, SubtitlePlanEntry};

fn language_score(lang: &str) -> u8 {
    LanguageFamily::of(lang).sort_score()
}

/// Order audio by language score, then channel count descending (stable)
pub fn sort_audio(entries: &mut [AudioPlanEntry]) {
    entries.sort_by_key(|e| (language_score(&e.language), Reverse(e.channels)));
}

/// Order subtitles by language score, forced before full (stable)
pub fn sort_subtitles(entries: &mut [SubtitlePlanEntry]) {
    entries.sort_by_key(|e| (language_score(&e.language), !e.is_forced));
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn audio_entry(index: i32, language: &str, channels: u32) -> AudioPlanEntry {
        AudioPlanEntry {
            source_index: index,
            is_generated: false,
            language: language.to_string(),
            channels,
            map_label: format!("0:{}", index),
            title: String::new(),
            is_default_candidate: false,
        }
    }

    fn subtitle_entry(index: i32, language: &str, is_forced: bool) -> SubtitlePlanEntry {
        SubtitlePlanEntry {
            source_index: index,
            language: language.to_string(),
            is_forced,
            title: String::new(),
        }
    }

    #[test]
    fn test_audio_order() {
        let mut entries = vec![
            audio_entry(1, "jpn", 6),
            audio_entry(2, "eng", 2),
            audio_entry(3, "ger", 2),
            audio_entry(4, "deu", 8),
            audio_entry(5, "en", 6),
        ];
        sort_audio(&mut entries);
        let order: Vec<i32> = entries.iter().map(|e| e.source_index).collect();
        assert_eq!(order, vec![4, 3, 5, 2, 1]);
    }

    #[test]
    fn test_subtitle_order() {
        let mut entries = vec![
            subtitle_entry(1, "und", true),
            subtitle_entry(2, "eng", false),
            subtitle_entry(3, "eng", true),
            subtitle_entry(4, "ger", false),
            subtitle_entry(5, "ger", true),
        ];
        sort_subtitles(&mut entries);
        let order: Vec<i32> = entries.iter().map(|e| e.source_index).collect();
        assert_eq!(order, vec![5, 4, 3, 2, 1]);
    }

    fn lang_strategy() -> impl Strategy<Value = &'static str> {
        prop_oneof![Just("ger"), Just("de"), Just("eng"), Just("jpn"), Just("fre"), Just("und")]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Entries with equal keys keep their relative order
        #[test]
        fn test_audio_sort_is_stable(
            tracks in prop::collection::vec((lang_strategy(), 1u32..9), 0..12),
        ) {
            let mut entries: Vec<AudioPlanEntry> = tracks
                .iter()
                .enumerate()
                .map(|(i, (lang, ch))| audio_entry(i as i32, lang, *ch))
                .collect();
            sort_audio(&mut entries);

            for pair in entries.windows(2) {
                let a = (language_score(&pair[0].language), Reverse(pair[0].channels));
                let b = (language_score(&pair[1].language), Reverse(pair[1].channels));
                prop_assert!(a <= b);
                if a == b {
                    prop_assert!(pair[0].source_index < pair[1].source_index);
                }
            }
        }

        #[test]
        fn test_subtitle_sort_is_stable(
            subs in prop::collection::vec((lang_strategy(), prop::bool::ANY), 0..12),
        ) {
            let mut entries: Vec<SubtitlePlanEntry> = subs
                .iter()
                .enumerate()
                .map(|(i, (lang, forced))| subtitle_entry(i as i32, lang, *forced))
                .collect();
            sort_subtitles(&mut entries);

            for pair in entries.windows(2) {
                let a = (language_score(&pair[0].language), !pair[0].is_forced);
                let b = (language_score(&pair[1].language), !pair[1].is_forced);
                prop_assert!(a <= b);
                if a == b {
                    prop_assert!(pair[0].source_index < pair[1].source_index);
                }
            }
        }
    }
}
