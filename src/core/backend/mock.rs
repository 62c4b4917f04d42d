//! Deterministic backend for offline use and testing
//!
//! Known phrases come from a small built-in dictionary; anything else is
//! returned with a `[XX] ` marker naming the target language.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use crate::core::backend::TranslationBackend;
use crate::core::errors::Result;
use crate::core::language::LanguageTag;

const BUILTIN: &[(LanguageTag, &str, &str)] = &[
    (LanguageTag::HinDeva, "Hello, how are you?", "नमस्ते, आप कैसे हैं?"),
    (LanguageTag::HinDeva, "Hello world", "नमस्ते संसार"),
    (LanguageTag::HinDeva, "Hello", "नमस्ते"),
    (LanguageTag::HinDeva, "Your farm is important to us", "आपका खेत हमारे लिए महत्वपूर्ण है"),
    (LanguageTag::HinDeva, "Please fill out the biosecurity questionnaire", "कृपया जैव सुरक्षा प्रश्नावली भरें"),
    (LanguageTag::HinDeva, "Alert: Disease outbreak detected in your area", "चेतावनी: आपके क्षेत्र में बीमारी का प्रकोप पाया गया"),
    (LanguageTag::BenBeng, "Hello, how are you?", "হ্যালো, আপনি কেমন আছেন?"),
    (LanguageTag::BenBeng, "Hello world", "হ্যালো বিশ্ব"),
    (LanguageTag::TelTelu, "Hello, how are you?", "హలో, మీరు ఎలా ఉన్నారు?"),
    (LanguageTag::TelTelu, "Hello world", "హలో ప్రపంచం"),
    (LanguageTag::TamTaml, "Hello, how are you?", "வணக்கம், நீங்கள் எப்படி இருக்கிறீர்கள்?"),
    (LanguageTag::TamTaml, "Hello world", "வணக்கம் உலகம்"),
    (LanguageTag::GujGujr, "Hello, how are you?", "હેલો, તમે કેવા છો?"),
    (LanguageTag::GujGujr, "Hello world", "હેલો વિશ્વ"),
];

/// Dictionary-backed translator
#[derive(Debug, Clone)]
pub struct MockBackend {
    phrases: HashMap<(LanguageTag, String), String>,
    delay: Option<Duration>,
}

impl MockBackend {
    /// Backend preloaded with the built-in phrases
    pub fn new() -> Self {
        let phrases = BUILTIN
            .iter()
            .map(|(tag, source, target)| ((*tag, source.to_string()), target.to_string()))
            .collect();

        Self {
            phrases,
            delay: None,
        }
    }

    /// Add or replace a phrase
    pub fn with_phrase(
        mut self,
        target: LanguageTag,
        text: impl Into<String>,
        translation: impl Into<String>,
    ) -> Self {
        self.phrases.insert((target, text.into()), translation.into());
        self
    }

    /// Simulate model latency on every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn translate_one(&self, text: &str, target: LanguageTag) -> String {
        if target == LanguageTag::EngLatn {
            return text.to_string();
        }

        if let Some(known) = self.phrases.get(&(target, text.to_string())) {
            return known.clone();
        }

        let marker = target
            .alias()
            .map(str::to_ascii_uppercase)
            .unwrap_or_else(|| target.as_str().to_string());
        format!("[{}] {}", marker, text)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranslationBackend for MockBackend {
    async fn translate(
        &self,
        texts: &[String],
        _source: LanguageTag,
        target: LanguageTag,
    ) -> Result<Vec<String>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        Ok(texts
            .iter()
            .map(|text| self.translate_one(text, target))
            .collect())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(backend: &MockBackend, texts: &[&str], target: LanguageTag) -> Vec<String> {
        let texts: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
        backend
            .translate(&texts, LanguageTag::EngLatn, target)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_known_phrases() {
        let backend = MockBackend::new();
        let out = run(&backend, &["Hello world", "Hello, how are you?"], LanguageTag::TamTaml).await;
        assert_eq!(out, vec!["வணக்கம் உலகம்", "வணக்கம், நீங்கள் எப்படி இருக்கிறீர்கள்?"]);
    }

    #[tokio::test]
    async fn test_unknown_phrase_gets_marker() {
        let backend = MockBackend::new();
        assert_eq!(run(&backend, &["Good night"], LanguageTag::HinDeva).await, vec!["[HI] Good night"]);
        assert_eq!(run(&backend, &["Good night"], LanguageTag::SndArab).await, vec!["[snd_Arab] Good night"]);
    }

    #[tokio::test]
    async fn test_english_target_is_identity() {
        let backend = MockBackend::new();
        assert_eq!(run(&backend, &["Hello world"], LanguageTag::EngLatn).await, vec!["Hello world"]);
    }

    #[tokio::test]
    async fn test_custom_phrase() {
        let backend = MockBackend::new().with_phrase(LanguageTag::MarDeva, "Thank you", "धन्यवाद");
        assert_eq!(run(&backend, &["Thank you"], LanguageTag::MarDeva).await, vec!["धन्यवाद"]);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let backend = MockBackend::new();
        assert!(run(&backend, &[], LanguageTag::HinDeva).await.is_empty());
    }
}
