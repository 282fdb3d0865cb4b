//! Language → synthesis voice lookup.

use std::collections::HashMap;

/// Voice used for any language without its own entry.
pub const DEFAULT_VOICE: &str = "en-US-JennyMultilingualNeural";

const VOICE_TABLE: &[(&str, &str)] = &[
    ("en-US", "en-US-JennyMultilingualNeural"),
    // Indian languages
    ("hi-IN", "hi-IN-SwaraNeural"),
    ("kn-IN", "kn-IN-SapnaNeural"),
    ("ta-IN", "ta-IN-PallaviNeural"),
    ("te-IN", "te-IN-ShrutiNeural"),
    ("mr-IN", "mr-IN-AarohiNeural"),
    ("bn-IN", "bn-IN-BashkarNeural"),
    ("gu-IN", "gu-IN-DhwaniNeural"),
    ("ml-IN", "ml-IN-SobhanaNeural"),
    ("pa-IN", "pa-IN-GurleenNeural"),
    // International languages
    ("es-ES", "es-ES-ElviraNeural"),
    ("fr-FR", "fr-FR-DeniseNeural"),
    ("de-DE", "de-DE-KatjaNeural"),
    ("it-IT", "it-IT-ElsaNeural"),
    ("ja-JP", "ja-JP-NanamiNeural"),
    ("zh-CN", "zh-CN-XiaoxiaoNeural"),
    ("ru-RU", "ru-RU-SvetlanaNeural"),
    ("pt-BR", "pt-BR-FranciscaNeural"),
    ("ar-SA", "ar-SA-ZariyahNeural"),
];

/// Maps locale codes to voice identifiers.
///
/// [`VoiceMap::lookup`] is total: a code without an entry resolves to the
/// default voice and never fails. Codes are matched exactly as the
/// recognizer reports them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceMap {
    voices: HashMap<String, String>,
    default_voice: String,
}

impl Default for VoiceMap {
    fn default() -> Self {
        Self {
            voices: VOICE_TABLE
                .iter()
                .map(|(code, voice)| (code.to_string(), voice.to_string()))
                .collect(),
            default_voice: DEFAULT_VOICE.to_string(),
        }
    }
}

impl VoiceMap {
    /// Replaces the fallback voice. An empty name keeps the current one so
    /// that lookups always yield a usable voice.
    pub fn with_default_voice(mut self, voice: impl Into<String>) -> Self {
        let voice = voice.into();
        if !voice.trim().is_empty() {
            self.default_voice = voice;
        }
        self
    }

    /// Adds or replaces entries. Entries with an empty voice are skipped.
    pub fn with_voices<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (code, voice) in entries {
            let voice = voice.into();
            if !voice.trim().is_empty() {
                self.voices.insert(code.into(), voice);
            }
        }
        self
    }

    pub fn lookup(&self, language: &str) -> &str {
        self.voices
            .get(language)
            .map(String::as_str)
            .unwrap_or(self.default_voice.as_str())
    }

    pub fn contains(&self, language: &str) -> bool {
        self.voices.contains_key(language)
    }

    pub fn default_voice(&self) -> &str {
        &self.default_voice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_return_their_mapping() {
        let map = VoiceMap::default();
        for (code, voice) in VOICE_TABLE {
            assert_eq!(map.lookup(code), *voice, "wrong voice for {code}");
            assert!(map.contains(code));
        }
        assert_eq!(map.lookup("hi-IN"), "hi-IN-SwaraNeural");
    }

    #[test]
    fn unknown_codes_fall_back_to_default() {
        let map = VoiceMap::default();
        for code in ["xx-XX", "", "en-us", "en", "zz-ZZ-extra"] {
            assert_eq!(map.lookup(code), DEFAULT_VOICE);
            assert!(!map.lookup(code).is_empty());
        }
    }

    #[test]
    fn configured_overrides() {
        let map = VoiceMap::default()
            .with_default_voice("en-GB-SoniaNeural")
            .with_voices([("en-GB", "en-GB-RyanNeural"), ("fr-FR", "")]);

        assert_eq!(map.lookup("xx-XX"), "en-GB-SoniaNeural");
        assert_eq!(map.lookup("en-GB"), "en-GB-RyanNeural");
        // Empty override ignored, built-in entry kept.
        assert_eq!(map.lookup("fr-FR"), "fr-FR-DeniseNeural");
    }

    #[test]
    fn empty_default_voice_is_ignored() {
        let map = VoiceMap::default().with_default_voice("  ");
        assert_eq!(map.default_voice(), DEFAULT_VOICE);
    }
}
