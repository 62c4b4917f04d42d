//! IndicTrans Bridge - translation between English and Indian languages
//!
//! This library normalizes user-facing language codes to IndicTrans2 tags,
//! lazily loads a single model backend shared by every caller, caches
//! results and never lets a backend failure escape as an error.

#![forbid(unsafe_code)]

pub mod cli;
pub mod core;
pub mod processors;

// Re-export key types for convenience
pub use core::{
    backend::{BackendLoader, MockBackend, TranslationBackend},
    client::Translator,
    config::{BackendKind, BridgeConfig},
    errors::{BridgeError, ErrorKind},
    language::{normalize, LanguageTag},
    models::{LanguageInfo, TranslationRequest, TranslationResult},
};

pub use processors::object::ObjectTranslator;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
