//! Static catalog of downloadable Vosk model archives.
//!
//! The catalog is compiled in; nothing mutates it at runtime. Each entry's
//! `archive_name` doubles as the on-disk directory name used for presence
//! checks, so archive names must stay unique.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ModelDescriptor {
    /// Short selector used by the CLI and API.
    pub key: &'static str,
    /// Top-level directory name the archive expands to.
    pub archive_name: &'static str,
    pub source_url: &'static str,
    /// Display-only; not used for verification.
    pub approximate_size: &'static str,
    pub language_label: &'static str,
    /// Included in the `download-recommended` batch.
    pub recommended: bool,
}

pub const CATALOG: &[ModelDescriptor] = &[
    ModelDescriptor {
        key: "small-hi",
        archive_name: "vosk-model-small-hi-0.22",
        source_url: "https://alphacephei.com/vosk/models/vosk-model-small-hi-0.22.zip",
        approximate_size: "45MB",
        language_label: "Hindi (Compact)",
        recommended: true,
    },
    ModelDescriptor {
        key: "small-en",
        archive_name: "vosk-model-small-en-us-0.15",
        source_url: "https://alphacephei.com/vosk/models/vosk-model-small-en-us-0.15.zip",
        approximate_size: "40MB",
        language_label: "English (Compact)",
        recommended: true,
    },
    ModelDescriptor {
        key: "hi",
        archive_name: "vosk-model-hi-0.22",
        source_url: "https://alphacephei.com/vosk/models/vosk-model-hi-0.22.zip",
        approximate_size: "1.8GB",
        language_label: "Hindi (Full)",
        recommended: false,
    },
    ModelDescriptor {
        key: "en",
        archive_name: "vosk-model-en-us-0.22",
        source_url: "https://alphacephei.com/vosk/models/vosk-model-en-us-0.22.zip",
        approximate_size: "1.8GB",
        language_label: "English (Full)",
        recommended: false,
    },
];

pub fn find(key: &str) -> Option<&'static ModelDescriptor> {
    CATALOG.iter().find(|model| model.key == key)
}

pub fn recommended() -> impl Iterator<Item = &'static ModelDescriptor> {
    CATALOG.iter().filter(|model| model.recommended)
}

/// Compact model for the preferred language first, then the full one, then
/// the same pair for the other language.
const HINDI_FIRST: &[&str] = &["small-hi", "hi", "small-en", "en"];
const ENGLISH_FIRST: &[&str] = &["small-en", "en", "small-hi", "hi"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguagePreference {
    Hindi,
    English,
    /// No Odia models exist in the catalog; Odia is an explicit alias for
    /// the Hindi priority list, since the Hindi models are the accepted
    /// substitute for Odia speech.
    Odia,
}

impl LanguagePreference {
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "hi" | "hindi" => Some(Self::Hindi),
            "en" | "english" => Some(Self::English),
            "or" | "odia" => Some(Self::Odia),
            _ => None,
        }
    }

    /// Ordered catalog keys to try when picking an already-downloaded model.
    pub fn priority(self) -> &'static [&'static str] {
        match self {
            Self::Hindi | Self::Odia => HINDI_FIRST,
            Self::English => ENGLISH_FIRST,
        }
    }
}
