//! Core data models for translation

use serde::{Deserialize, Serialize};

use crate::core::language::{self, LanguageTag};

/// Message attached to same-language short-circuits
pub const SAME_LANGUAGE_MESSAGE: &str = "No translation needed (same language)";

/// Translation request with codes already normalized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub source: LanguageTag,
    pub target: LanguageTag,
}

impl TranslationRequest {
    /// Build a request from caller codes, normalizing both
    pub fn new(text: impl Into<String>, source_code: &str, target_code: &str) -> Self {
        Self {
            text: text.into(),
            source: language::normalize(source_code),
            target: language::normalize(target_code),
        }
    }

    /// Source and target collapse to the same tag
    pub fn is_same_language(&self) -> bool {
        self.source == self.target
    }
}

/// Uniform answer for every translation call.
///
/// On failure `translated` holds the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub success: bool,
    pub original: String,
    pub translated: String,
    pub source_language: LanguageTag,
    pub target_language: LanguageTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub cached: bool,
}

impl TranslationResult {
    /// Successful translation
    pub fn translated(request: &TranslationRequest, translated: String) -> Self {
        Self {
            success: true,
            original: request.text.clone(),
            translated,
            source_language: request.source,
            target_language: request.target,
            message: None,
            error: None,
            cached: false,
        }
    }

    /// Answer served from the cache
    pub fn from_cache(request: &TranslationRequest, translated: String) -> Self {
        Self {
            cached: true,
            ..Self::translated(request, translated)
        }
    }

    /// Source and target are the same language
    pub fn unchanged(request: &TranslationRequest) -> Self {
        Self {
            message: Some(SAME_LANGUAGE_MESSAGE.to_string()),
            ..Self::translated(request, request.text.clone())
        }
    }

    /// Failure: hand the original text back
    pub fn fallback(request: &TranslationRequest, error: impl ToString) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            ..Self::translated(request, request.text.clone())
        }
    }
}

/// Supported language entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub code: String,
    pub tag: LanguageTag,
    pub name: String,
}

impl LanguageInfo {
    /// All short codes with their tags and names
    pub fn all() -> Vec<Self> {
        language::aliases()
            .map(|(code, tag)| Self {
                code: code.to_string(),
                tag,
                name: tag.name().to_string(),
            })
            .collect()
    }
}
