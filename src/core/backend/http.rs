//! Backend that talks to a model inference server over HTTP

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::core::backend::{warm_up, BackendLoader, TranslationBackend, WireRequest, WireResponse};
use crate::core::config::BridgeConfig;
use crate::core::errors::{BridgeError, Result};
use crate::core::language::LanguageTag;

/// POSTs the wire request to `endpoint` and reads the wire response
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpBackend {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .build()
            .map_err(|e| BridgeError::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl TranslationBackend for HttpBackend {
    async fn translate(
        &self,
        texts: &[String],
        source: LanguageTag,
        target: LanguageTag,
    ) -> Result<Vec<String>> {
        debug!("POST {} ({} texts, {} -> {})", self.endpoint, texts.len(), source, target);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&WireRequest {
                texts,
                src_lang: source,
                tgt_lang: target,
            })
            .send()
            .await
            .map_err(|e| BridgeError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::inference(format!(
                "inference server returned {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let bytes = response.bytes().await?;
        let body: WireResponse =
            serde_json::from_slice(&bytes).map_err(|e| BridgeError::InvalidResponseError {
                message: e.to_string(),
            })?;

        body.into_translations(texts.len())
    }

    fn name(&self) -> &str {
        &self.endpoint
    }
}

/// Builds an [`HttpBackend`] and checks the server answers
#[derive(Debug, Clone)]
pub struct HttpLoader {
    endpoint: String,
    timeout: Duration,
}

impl HttpLoader {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(config.endpoint.clone(), config.timeout())
    }
}

#[async_trait]
impl BackendLoader for HttpLoader {
    async fn load(&self) -> Result<Arc<dyn TranslationBackend>> {
        let backend = HttpBackend::new(self.endpoint.clone(), self.timeout)?;
        warm_up(&backend, self.timeout).await?;
        Ok(Arc::new(backend))
    }

    fn name(&self) -> &str {
        &self.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response, returning the endpoint URL
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];

            // Read headers, then as much body as Content-Length announces
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}/translate", addr)
    }

    #[tokio::test]
    async fn test_http_round_trip() {
        let endpoint = serve_once("200 OK", r#"{"translations": ["নমস্কার"]}"#).await;
        let backend = HttpBackend::new(endpoint, Duration::from_secs(5)).unwrap();

        let out = backend
            .translate(&["Hello".to_string()], LanguageTag::EngLatn, LanguageTag::BenBeng)
            .await
            .unwrap();
        assert_eq!(out, vec!["নমস্কার"]);
    }

    #[tokio::test]
    async fn test_http_server_error() {
        let endpoint = serve_once("500 Internal Server Error", r#"{"detail": "oom"}"#).await;
        let backend = HttpBackend::new(endpoint, Duration::from_secs(5)).unwrap();

        let err = backend
            .translate(&["Hello".to_string()], LanguageTag::EngLatn, LanguageTag::BenBeng)
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::InferenceError { .. }));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_http_malformed_body() {
        let endpoint = serve_once("200 OK", "<html>gateway</html>").await;
        let backend = HttpBackend::new(endpoint, Duration::from_secs(5)).unwrap();

        let err = backend
            .translate(&["Hello".to_string()], LanguageTag::EngLatn, LanguageTag::TamTaml)
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidResponseError { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_load() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let loader = HttpLoader::new(format!("http://{}/translate", addr), Duration::from_secs(2));
        assert!(matches!(loader.load().await, Err(BridgeError::ConfigError { .. })));
    }
}
