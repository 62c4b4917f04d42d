//! CLI command definitions and handlers
//!
//! Everything written to stdout is a single JSON document. Translation
//! failures are reported inside that document; only unusable input makes a
//! handler return an error.

use clap::{Args as ClapArgs, Subcommand};
use serde::Serialize;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::core::client::Translator;
use crate::core::config::{BackendKind, BridgeConfig};
use crate::core::errors::{BridgeError, Result};
use crate::core::models::{LanguageInfo, TranslationRequest, TranslationResult};
use crate::processors::object::ObjectTranslator;

/// Subcommands beyond the default `<text> [source] [target]` form
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate many texts (JSON array of strings, or one text per line)
    Batch {
        /// Input file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        file: PathBuf,

        #[command(flatten)]
        langs: LanguagePair,
    },

    /// Translate string fields of a JSON document
    Object {
        /// Input JSON file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        file: PathBuf,

        /// Keys to translate (comma separated); all strings when omitted
        #[arg(short, long, value_delimiter = ',')]
        keys: Vec<String>,

        #[command(flatten)]
        langs: LanguagePair,
    },

    /// List supported language codes
    Languages,
}

/// Source/target options shared by subcommands
#[derive(ClapArgs, Debug, Clone)]
pub struct LanguagePair {
    /// Source language code
    #[arg(short, long = "source", default_value = "en")]
    pub source_lang: String,

    /// Target language code
    #[arg(short, long = "target", default_value = "hi")]
    pub target_lang: String,
}

/// Settings shared by every handler
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config: Option<PathBuf>,
    pub backend: Option<String>,
    pub pretty: bool,
}

#[derive(Serialize)]
struct ErrorOutput<'a> {
    success: bool,
    error: &'a str,
}

/// Write a value as one JSON document followed by a newline
pub fn emit<T: Serialize, W: Write>(out: &mut W, value: &T, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out)?;
    Ok(())
}

/// Write the malformed-invocation answer
pub fn emit_usage_error<W: Write>(out: &mut W, message: &str) -> Result<()> {
    let output = ErrorOutput {
        success: false,
        error: message,
    };
    emit(out, &output, false)
}

fn load_config(options: &RunOptions) -> Result<BridgeConfig> {
    let mut config = match &options.config {
        Some(path) => BridgeConfig::from_file(path),
        None => BridgeConfig::from_env(),
    }
    .map_err(|e| BridgeError::config(e.to_string()))?;

    if let Some(backend) = &options.backend {
        config.backend = backend
            .parse::<BackendKind>()
            .map_err(|e| BridgeError::config(e.to_string()))?;
    }

    Ok(config)
}

/// Build the façade; a failure here is reported in-band by the caller
pub fn build_translator(options: &RunOptions) -> Result<Translator> {
    let config = load_config(options)?;
    debug!("Configuration: {:?}", config);
    Translator::from_config(config)
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        return Ok(buffer);
    }

    std::fs::read_to_string(path).map_err(|e| BridgeError::InvalidInput {
        message: format!("cannot read {}: {}", path.display(), e),
    })
}

/// Parse batch input: a JSON array of strings, or one text per non-empty line
pub fn parse_batch_input(content: &str) -> Result<Vec<String>> {
    let trimmed = content.trim();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).map_err(|e| BridgeError::InvalidInput {
            message: format!("expected a JSON array of strings: {}", e),
        });
    }

    Ok(trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Handle the default single-text form
pub async fn handle_translate<W: Write>(
    text: String,
    source_lang: String,
    target_lang: String,
    options: &RunOptions,
    out: &mut W,
) -> Result<()> {
    info!("Translating {} chars {} -> {}", text.chars().count(), source_lang, target_lang);

    let result = match build_translator(options) {
        Ok(translator) => translator.translate_one(&text, &source_lang, &target_lang).await,
        Err(e) => {
            warn!("Translator unavailable: {}", e);
            TranslationResult::fallback(&TranslationRequest::new(text, &source_lang, &target_lang), e)
        }
    };

    emit(out, &result, options.pretty)
}

/// Handle batch translation command
pub async fn handle_batch<W: Write>(
    file: PathBuf,
    langs: LanguagePair,
    options: &RunOptions,
    out: &mut W,
) -> Result<()> {
    let texts = parse_batch_input(&read_input(&file)?)?;
    info!("Translating batch of {} texts", texts.len());

    let results = match build_translator(options) {
        Ok(translator) => {
            translator
                .translate_batch(&texts, &langs.source_lang, &langs.target_lang)
                .await
        }
        Err(e) => {
            warn!("Translator unavailable: {}", e);
            texts
                .into_iter()
                .map(|text| {
                    let request = TranslationRequest::new(text, &langs.source_lang, &langs.target_lang);
                    TranslationResult::fallback(&request, &e)
                })
                .collect()
        }
    };

    emit(out, &results, options.pretty)
}

/// Handle JSON document translation command
pub async fn handle_object<W: Write>(
    file: PathBuf,
    keys: Vec<String>,
    langs: LanguagePair,
    options: &RunOptions,
    out: &mut W,
) -> Result<()> {
    let content = read_input(&file)?;
    let document: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| BridgeError::InvalidInput {
            message: format!("invalid JSON document: {}", e),
        })?;

    let translated = match build_translator(options) {
        Ok(translator) => {
            let outcome = ObjectTranslator::new(translator)
                .translate_value(&document, &langs.source_lang, &langs.target_lang, &keys)
                .await;
            if outcome.failures > 0 {
                warn!("{} of {} strings left untranslated", outcome.failures, outcome.strings);
            }
            outcome.value
        }
        Err(e) => {
            warn!("Translator unavailable, returning document unchanged: {}", e);
            document
        }
    };

    emit(out, &translated, options.pretty)
}

/// Handle languages command
pub fn handle_languages<W: Write>(options: &RunOptions, out: &mut W) -> Result<()> {
    emit(out, &LanguageInfo::all(), options.pretty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_batch_json() {
        let texts = parse_batch_input(r#" ["Hello", "नमस्ते", ""] "#).unwrap();
        assert_eq!(texts, vec!["Hello", "नमस्ते", ""]);
    }

    #[test]
    fn test_parse_batch_lines() {
        let texts = parse_batch_input("Hello world\n\n  Good night  \n").unwrap();
        assert_eq!(texts, vec!["Hello world", "Good night"]);
        assert!(parse_batch_input("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_batch_bad_json() {
        assert!(matches!(
            parse_batch_input("[1, 2]"),
            Err(BridgeError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_backend_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.json");
        BridgeConfig::default().to_file(&path).unwrap();

        let options = RunOptions {
            config: Some(path),
            backend: Some("http".to_string()),
            pretty: false,
        };
        assert_eq!(load_config(&options).unwrap().backend, BackendKind::Http);

        let options = RunOptions {
            backend: Some("carrier-pigeon".to_string()),
            ..options
        };
        assert!(matches!(load_config(&options), Err(BridgeError::ConfigError { .. })));
    }

    #[test]
    fn test_missing_input_file() {
        let err = read_input(Path::new("/no/such/batch.json")).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidInput { .. }));
    }
}
