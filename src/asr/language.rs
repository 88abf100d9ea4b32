//! Heuristic language guess over transcribed text, by dominant script.

use std::ops::RangeInclusive;

const ODIA: RangeInclusive<char> = '\u{0B00}'..='\u{0B7F}';
const DEVANAGARI: RangeInclusive<char> = '\u{0900}'..='\u{097F}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedLanguage {
    Odia,
    Hindi,
    English,
    Mixed,
    Unknown,
}

impl DetectedLanguage {
    pub fn code(self) -> &'static str {
        match self {
            Self::Odia => "or",
            Self::Hindi => "hi",
            Self::English => "en",
            Self::Mixed => "mixed",
            Self::Unknown => "unknown",
        }
    }
}

/// Classify `text` by the share of alphabetic characters falling in the
/// Odia block, the Devanagari block, or basic Latin. A script wins outright
/// above 30% (70% for Latin, which also appears in loanwords); otherwise the
/// text counts as mixed. No alphabetic content at all is unknown.
pub fn detect_language(text: &str) -> DetectedLanguage {
    let mut odia = 0usize;
    let mut devanagari = 0usize;
    let mut latin = 0usize;
    let mut alphabetic = 0usize;

    for c in text.chars() {
        if ODIA.contains(&c) {
            odia += 1;
        } else if DEVANAGARI.contains(&c) {
            devanagari += 1;
        } else if c.is_ascii_alphabetic() {
            latin += 1;
        }
        if c.is_alphabetic() {
            alphabetic += 1;
        }
    }

    if alphabetic == 0 {
        return DetectedLanguage::Unknown;
    }

    let total = alphabetic as f64;
    if odia as f64 / total > 0.3 {
        DetectedLanguage::Odia
    } else if devanagari as f64 / total > 0.3 {
        DetectedLanguage::Hindi
    } else if latin as f64 / total > 0.7 {
        DetectedLanguage::English
    } else {
        DetectedLanguage::Mixed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_hindi_from_devanagari() {
        assert_eq!(detect_language("नमस्ते दुनिया"), DetectedLanguage::Hindi);
    }

    #[test]
    fn detects_odia_script() {
        assert_eq!(detect_language("ନମସ୍କାର ସାଥୀ"), DetectedLanguage::Odia);
    }

    #[test]
    fn detects_english_from_latin() {
        assert_eq!(
            detect_language("hello there general"),
            DetectedLanguage::English
        );
    }

    #[test]
    fn empty_and_non_alphabetic_are_unknown() {
        assert_eq!(detect_language(""), DetectedLanguage::Unknown);
        assert_eq!(detect_language("12 34 !?"), DetectedLanguage::Unknown);
    }

    #[test]
    fn devanagari_share_above_threshold_wins_over_latin() {
        assert_eq!(
            detect_language("hello नमस्ते world दुनिया"),
            DetectedLanguage::Hindi
        );
    }

    #[test]
    fn even_split_is_mixed() {
        // 7 Latin letters, 3 Devanagari consonants: neither script clears
        // its (strict) threshold.
        assert_eq!(detect_language("epsilon कलम"), DetectedLanguage::Mixed);
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(DetectedLanguage::Odia.code(), "or");
        assert_eq!(DetectedLanguage::Hindi.code(), "hi");
        assert_eq!(DetectedLanguage::English.code(), "en");
    }
}
