//! Backend adapters around the pretrained translation model
//!
//! The façade only ever sees two capabilities: a [`BackendLoader`] that
//! builds the (expensive) model handle once, and the resulting
//! [`TranslationBackend`] that turns a batch of texts into a batch of
//! translations. Tokenization and decoding stay on the far side of this seam.

pub mod command;
pub mod http;
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::core::config::{BackendKind, BridgeConfig};
use crate::core::errors::{BridgeError, Result};
use crate::core::language::LanguageTag;

pub use command::{CommandBackend, CommandLoader};
pub use http::{HttpBackend, HttpLoader};
pub use mock::MockBackend;

/// A loaded translation model
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Translate `texts` from `source` to `target`.
    ///
    /// Implementations must return exactly one translation per input, in order.
    async fn translate(
        &self,
        texts: &[String],
        source: LanguageTag,
        target: LanguageTag,
    ) -> Result<Vec<String>>;

    /// Name used in logs
    fn name(&self) -> &str;
}

/// Builds a [`TranslationBackend`]. Called at most once per successful load.
#[async_trait]
pub trait BackendLoader: Send + Sync {
    /// Load the model, failing with [`BridgeError::ConfigError`] when the
    /// artifact is missing or unusable
    async fn load(&self) -> Result<Arc<dyn TranslationBackend>>;

    /// Name used in logs
    fn name(&self) -> &str;
}

/// Loader that hands out an already constructed backend
#[derive(Clone)]
pub struct StaticLoader {
    backend: Arc<dyn TranslationBackend>,
}

impl StaticLoader {
    pub fn new(backend: Arc<dyn TranslationBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl BackendLoader for StaticLoader {
    async fn load(&self) -> Result<Arc<dyn TranslationBackend>> {
        Ok(self.backend.clone())
    }

    fn name(&self) -> &str {
        self.backend.name()
    }
}

/// Wire format shared by the command and http backends
#[derive(Debug, Clone, Serialize)]
pub(crate) struct WireRequest<'a> {
    pub texts: &'a [String],
    pub src_lang: LanguageTag,
    pub tgt_lang: LanguageTag,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct WireResponse {
    #[serde(default)]
    pub translations: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl WireResponse {
    /// Extract translations, checking the one-per-input contract
    pub(crate) fn into_translations(self, expected: usize) -> Result<Vec<String>> {
        if let Some(error) = self.error {
            return Err(BridgeError::inference(error));
        }

        let translations = self.translations.ok_or_else(|| BridgeError::InvalidResponseError {
            message: "No translations in response".to_string(),
        })?;

        if translations.len() != expected {
            return Err(BridgeError::InvalidResponseError {
                message: format!(
                    "expected {} translations, got {}",
                    expected,
                    translations.len()
                ),
            });
        }

        Ok(translations)
    }
}

/// Translate a fixed sentence to confirm a freshly built backend works
pub(crate) async fn warm_up(backend: &dyn TranslationBackend, timeout: Duration) -> Result<()> {
    let sample = vec!["Hello".to_string()];
    debug!("Warming up backend {}", backend.name());

    let outcome = tokio::time::timeout(
        timeout,
        backend.translate(&sample, LanguageTag::EngLatn, LanguageTag::HinDeva),
    )
    .await;

    match outcome {
        Ok(Ok(_)) => {
            info!("Backend {} is ready", backend.name());
            Ok(())
        }
        Ok(Err(e)) => {
            let reason = match e {
                BridgeError::ConfigError { message } | BridgeError::InferenceError { message } => message,
                other => other.to_string(),
            };
            Err(BridgeError::config(format!(
                "backend {} failed warm-up: {}",
                backend.name(),
                reason
            )))
        }
        Err(_) => Err(BridgeError::config(format!(
            "backend {} warm-up timed out after {}ms",
            backend.name(),
            timeout.as_millis()
        ))),
    }
}

/// Pick the loader described by `config`
pub fn loader_for(config: &BridgeConfig) -> Result<Arc<dyn BackendLoader>> {
    config
        .validate()
        .map_err(|e| BridgeError::config(e.to_string()))?;

    let loader: Arc<dyn BackendLoader> = match config.backend {
        BackendKind::Mock => Arc::new(StaticLoader::new(Arc::new(MockBackend::new()))),
        BackendKind::Command => Arc::new(CommandLoader::from_config(config)),
        BackendKind::Http => Arc::new(HttpLoader::from_config(config)),
    };

    info!("Using {} backend", config.backend);
    Ok(loader)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_response_length_check() {
        let response = WireResponse {
            translations: Some(vec!["a".to_string()]),
            error: None,
        };
        assert!(matches!(
            response.into_translations(2),
            Err(BridgeError::InvalidResponseError { .. })
        ));
    }

    #[test]
    fn test_wire_response_error_field() {
        let response: WireResponse = serde_json::from_str(r#"{"error": "CUDA out of memory"}"#).unwrap();
        let err = response.into_translations(1).unwrap_err();
        assert!(matches!(err, BridgeError::InferenceError { .. }));
        assert!(err.to_string().contains("CUDA out of memory"));
    }

    #[test]
    fn test_wire_request_uses_canonical_tags() {
        let texts = vec!["Hello".to_string()];
        let request = WireRequest {
            texts: &texts,
            src_lang: LanguageTag::EngLatn,
            tgt_lang: LanguageTag::BenBeng,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["src_lang"], "eng_Latn");
        assert_eq!(json["tgt_lang"], "ben_Beng");
        assert_eq!(json["texts"][0], "Hello");
    }

    #[tokio::test]
    async fn test_static_loader_shares_backend() {
        let loader = StaticLoader::new(Arc::new(MockBackend::new()));
        let a = loader.load().await.unwrap();
        let b = loader.load().await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_loader_for_mock() {
        let loader = loader_for(&BridgeConfig::default()).unwrap();
        let backend = loader.load().await.unwrap();
        let out = backend
            .translate(&["Hello world".to_string()], LanguageTag::EngLatn, LanguageTag::HinDeva)
            .await
            .unwrap();
        assert_eq!(out, vec!["नमस्ते संसार"]);
    }

    struct Unstartable;

    #[async_trait]
    impl TranslationBackend for Unstartable {
        async fn translate(&self, _: &[String], _: LanguageTag, _: LanguageTag) -> Result<Vec<String>> {
            Err(BridgeError::config("failed to start /nonexistent/worker"))
        }

        fn name(&self) -> &str {
            "/nonexistent/worker"
        }
    }

    #[tokio::test]
    async fn test_warm_up_failure_message_has_single_prefix() {
        let err = warm_up(&Unstartable, Duration::from_secs(1)).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: backend /nonexistent/worker failed warm-up: failed to start /nonexistent/worker"
        );
    }

    #[test]
    fn test_loader_for_rejects_invalid_config() {
        let config = BridgeConfig {
            timeout_ms: 0,
            ..Default::default()
        };
        assert!(loader_for(&config).is_err());
    }
}
