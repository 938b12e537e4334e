/// Language code used when a stream carries no language tag
pub const UNDETERMINED: &str = "und";

const GERMAN_CODES: &[&str] = &["ger", "de", "deu"];
const ENGLISH_CODES: &[&str] = &["eng", "en"];
const JAPANESE_CODES: &[&str] = &["jpn", "ja"];

/// Language families the track policy distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageFamily {
    German,
    English,
    Japanese,
    Other,
}

impl LanguageFamily {
    /// Map a normalized language code to its family
    pub fn of(code: &str) -> Self {
        if GERMAN_CODES.contains(&code) {
            LanguageFamily::German
        } else if ENGLISH_CODES.contains(&code) {
            LanguageFamily::English
        } else if JAPANESE_CODES.contains(&code) {
            LanguageFamily::Japanese
        } else {
            LanguageFamily::Other
        }
    }

    /// Sort score: German first, English second, everything else last
    pub fn sort_score(&self) -> u8 {
        match self {
            LanguageFamily::German => 1,
            LanguageFamily::English => 2,
            LanguageFamily::Japanese | LanguageFamily::Other => 3,
        }
    }
}

/// Normalize a raw language tag: trimmed, lowercase, "und" when absent or blank
pub fn normalize(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(code) if !code.is_empty() => code.to_lowercase(),
        _ => UNDETERMINED.to_string(),
    }
}

/// Uppercase code used in track titles ("GER 5.1", "ENG Forced")
pub fn display_code(code: &str) -> String {
    code.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Some("GER")), "ger");
        assert_eq!(normalize(Some("  eng ")), "eng");
        assert_eq!(normalize(Some("")), "und");
        assert_eq!(normalize(None), "und");
        assert_eq!(display_code("ger"), "GER");
    }

    #[test]
    fn test_families_and_scores() {
        for code in ["ger", "de", "deu"] {
            assert_eq!(LanguageFamily::of(code), LanguageFamily::German);
            assert_eq!(LanguageFamily::of(code).sort_score(), 1);
        }
        for code in ["eng", "en"] {
            assert_eq!(LanguageFamily::of(code), LanguageFamily::English);
            assert_eq!(LanguageFamily::of(code).sort_score(), 2);
        }
        assert_eq!(LanguageFamily::of("jpn"), LanguageFamily::Japanese);
        assert_eq!(LanguageFamily::of("jpn").sort_score(), 3);
        assert_eq!(LanguageFamily::of("fre").sort_score(), 3);
        assert_eq!(LanguageFamily::of("und").sort_score(), 3);
    }
}
