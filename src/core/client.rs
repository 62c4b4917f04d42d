//! Translation façade: normalize, short-circuit, cache, delegate, fall back.
//!
//! Every public translate method returns [`TranslationResult`]s and never an
//! error. When anything below the façade fails the caller gets its own text
//! back with `success: false`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::core::backend::{self, BackendLoader, StaticLoader, TranslationBackend};
use crate::core::cache::{CacheKey, CacheStats, TranslationCache};
use crate::core::config::BridgeConfig;
use crate::core::errors::{BridgeError, Result};
use crate::core::language::{self, LanguageTag};
use crate::core::models::{LanguageInfo, TranslationRequest, TranslationResult};
use crate::core::stats::{StatsTracker, UsageStats};

/// Lazily loaded backend handle shared by every clone of a [`Translator`]
struct BackendSlot {
    loader: Arc<dyn BackendLoader>,
    backend: OnceLock<Arc<dyn TranslationBackend>>,
    failed_loads: AtomicU64,
    /// Held for the whole duration of a load; remembers the last failure
    last_failure: Mutex<Option<(Instant, String)>>,
}

impl BackendSlot {
    fn new(loader: Arc<dyn BackendLoader>) -> Self {
        Self {
            loader,
            backend: OnceLock::new(),
            failed_loads: AtomicU64::new(0),
            last_failure: Mutex::new(None),
        }
    }

    /// Return the backend, loading it if needed. At most one load runs at a
    /// time; callers that queued behind a failed load share its error.
    async fn get(&self, cooldown: Option<Duration>) -> Result<Arc<dyn TranslationBackend>> {
        if let Some(backend) = self.backend.get() {
            return Ok(backend.clone());
        }

        let seen_failures = self.failed_loads.load(Ordering::SeqCst);
        let mut last_failure = self.last_failure.lock().await;

        if let Some(backend) = self.backend.get() {
            return Ok(backend.clone());
        }

        if let Some((failed_at, message)) = last_failure.as_ref() {
            if self.failed_loads.load(Ordering::SeqCst) != seen_failures {
                return Err(BridgeError::config(message.clone()));
            }
            if let Some(cooldown) = cooldown {
                if failed_at.elapsed() < cooldown {
                    return Err(BridgeError::config(format!(
                        "backend unavailable, last load failed {}ms ago: {}",
                        failed_at.elapsed().as_millis(),
                        message
                    )));
                }
            }
        }

        info!("Loading translation backend {}", self.loader.name());
        let started = Instant::now();

        match self.loader.load().await {
            Ok(backend) => {
                info!("Backend {} loaded in {:?}", backend.name(), started.elapsed());
                *last_failure = None;
                Ok(self.backend.get_or_init(|| backend).clone())
            }
            Err(e) => {
                let message = match e {
                    BridgeError::ConfigError { message } => message,
                    other => other.to_string(),
                };
                error!("Failed to load backend {}: {}", self.loader.name(), message);
                *last_failure = Some((Instant::now(), message.clone()));
                self.failed_loads.fetch_add(1, Ordering::SeqCst);
                Err(BridgeError::config(message))
            }
        }
    }

    fn is_loaded(&self) -> bool {
        self.backend.get().is_some()
    }
}

/// Translation façade with lazy backend loading, caching and fallback
#[derive(Clone)]
pub struct Translator {
    config: Arc<BridgeConfig>,
    slot: Arc<BackendSlot>,
    cache: Arc<TranslationCache>,
    stats: StatsTracker,
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("backend", &self.slot.loader.name())
            .field("loaded", &self.slot.is_loaded())
            .field("cache", &self.cache)
            .finish()
    }
}

impl Translator {
    /// Create a translator that loads its backend through `loader` on first use
    pub fn new(config: BridgeConfig, loader: Arc<dyn BackendLoader>) -> Result<Self> {
        config
            .validate()
            .map_err(|e| BridgeError::config(e.to_string()))?;

        let cache = TranslationCache::new(config.cache_capacity, config.cache_ttl());

        Ok(Self {
            config: Arc::new(config),
            slot: Arc::new(BackendSlot::new(loader)),
            cache: Arc::new(cache),
            stats: StatsTracker::new(),
        })
    }

    /// Create a translator around an already constructed backend
    pub fn with_backend(config: BridgeConfig, backend: Arc<dyn TranslationBackend>) -> Result<Self> {
        Self::new(config, Arc::new(StaticLoader::new(backend)))
    }

    /// Create a translator using the backend named in `config`
    pub fn from_config(config: BridgeConfig) -> Result<Self> {
        let loader = backend::loader_for(&config)?;
        Self::new(config, loader)
    }

    /// Create from environment
    pub fn from_env() -> Result<Self> {
        let config = BridgeConfig::from_env().map_err(|e| BridgeError::config(e.to_string()))?;
        Self::from_config(config)
    }

    /// Translate one text. Never fails; see [`TranslationResult`].
    pub async fn translate_one(&self, text: &str, source_code: &str, target_code: &str) -> TranslationResult {
        let request = TranslationRequest::new(text, source_code, target_code);
        self.stats.record_requests(1).await;

        if request.is_same_language() {
            debug!("Same language ({}), skipping translation", request.source);
            self.stats.record_same_language(1).await;
            return TranslationResult::unchanged(&request);
        }

        let key = CacheKey::new(text, request.source, request.target);
        if let Some(cached) = self.cache.get(&key) {
            debug!("Cache hit for {} -> {}", request.source, request.target);
            self.stats.record_cache_hits(1).await;
            return TranslationResult::from_cache(&request, cached);
        }

        let outcome = self
            .run(std::slice::from_ref(&request.text), request.source, request.target)
            .await
            .and_then(|translations| {
                translations.into_iter().next().ok_or_else(|| BridgeError::InvalidResponseError {
                    message: "backend returned no translation".to_string(),
                })
            });

        match outcome {
            Ok(translated) => {
                self.cache.put(key, translated.clone());
                TranslationResult::translated(&request, translated)
            }
            Err(e) => {
                error!(
                    "Translation failed ({}) for {} -> {}: {}",
                    e.kind(),
                    request.source,
                    request.target,
                    e
                );
                self.stats.record_fallbacks(1).await;
                TranslationResult::fallback(&request, e)
            }
        }
    }

    /// Translate many texts with one language pair.
    ///
    /// Always returns exactly one result per input, in input order. Cache hits
    /// are answered locally; the misses go to the backend in a single call.
    pub async fn translate_batch(
        &self,
        texts: &[String],
        source_code: &str,
        target_code: &str,
    ) -> Vec<TranslationResult> {
        let source = language::normalize(source_code);
        let target = language::normalize(target_code);
        let requests: Vec<TranslationRequest> = texts
            .iter()
            .map(|text| TranslationRequest {
                text: text.clone(),
                source,
                target,
            })
            .collect();

        self.stats.record_requests(requests.len()).await;
        if requests.is_empty() {
            return Vec::new();
        }

        if source == target {
            debug!("Same language ({}), skipping batch of {}", source, requests.len());
            self.stats.record_same_language(requests.len()).await;
            return requests.iter().map(TranslationResult::unchanged).collect();
        }

        let mut results: Vec<Option<TranslationResult>> = vec![None; requests.len()];
        let mut pending = Vec::new();

        for (index, request) in requests.iter().enumerate() {
            let key = CacheKey::new(request.text.as_str(), source, target);
            match self.cache.get(&key) {
                Some(cached) => results[index] = Some(TranslationResult::from_cache(request, cached)),
                None => pending.push(index),
            }
        }

        let hits = requests.len() - pending.len();
        if hits > 0 {
            self.stats.record_cache_hits(hits).await;
        }

        if !pending.is_empty() {
            let misses: Vec<String> = pending.iter().map(|&i| requests[i].text.clone()).collect();
            debug!("Batch: {} cached, {} sent to backend", hits, misses.len());

            match self.run(&misses, source, target).await {
                Ok(translations) => {
                    for (&index, translated) in pending.iter().zip(translations) {
                        let request = &requests[index];
                        self.cache
                            .put(CacheKey::new(request.text.as_str(), source, target), translated.clone());
                        results[index] = Some(TranslationResult::translated(request, translated));
                    }
                }
                Err(e) => {
                    error!(
                        "Batch translation failed ({}) for {} texts {} -> {}: {}",
                        e.kind(),
                        pending.len(),
                        source,
                        target,
                        e
                    );
                    self.stats.record_fallbacks(pending.len()).await;
                    for &index in &pending {
                        results[index] = Some(TranslationResult::fallback(&requests[index], &e));
                    }
                }
            }
        }

        results
            .into_iter()
            .zip(&requests)
            .map(|(result, request)| {
                result.unwrap_or_else(|| TranslationResult::fallback(request, "missing translation"))
            })
            .collect()
    }

    /// Load the backend now instead of on the first translation
    pub async fn preload(&self) -> Result<()> {
        self.slot.get(self.config.init_cooldown()).await.map(|_| ())
    }

    /// Whether the backend has been loaded
    pub fn is_loaded(&self) -> bool {
        self.slot.is_loaded()
    }

    /// Known short language codes
    pub fn supported_languages(&self) -> Vec<&'static str> {
        language::supported_codes()
    }

    /// Short codes with their tags and names
    pub fn language_info(&self) -> Vec<LanguageInfo> {
        LanguageInfo::all()
    }

    /// Whether `code` resolves without falling back to the default
    pub fn is_supported(&self, code: &str) -> bool {
        language::is_supported(code)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("Translation cache cleared");
    }

    /// Get current usage statistics
    pub async fn stats(&self) -> UsageStats {
        self.stats.get_stats().await
    }

    /// Get the active configuration
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Backend lookup plus the retrying, time-limited backend call
    async fn run(&self, texts: &[String], source: LanguageTag, target: LanguageTag) -> Result<Vec<String>> {
        let backend = self.slot.get(self.config.init_cooldown()).await?;
        self.invoke(backend.as_ref(), texts, source, target).await
    }

    async fn invoke(
        &self,
        backend: &dyn TranslationBackend,
        texts: &[String],
        source: LanguageTag,
        target: LanguageTag,
    ) -> Result<Vec<String>> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay = self.config.retry_delay_ms.saturating_mul(2_u64.saturating_pow(attempt - 1));
                debug!("Retry attempt {} on {} after {}ms", attempt, backend.name(), delay);
                sleep(Duration::from_millis(delay)).await;
            }

            self.stats.record_backend_call().await;
            let outcome = match tokio::time::timeout(self.config.timeout(), backend.translate(texts, source, target)).await {
                Ok(result) => result,
                Err(_) => Err(BridgeError::TimeoutError {
                    timeout_ms: self.config.timeout_ms,
                }),
            };

            let outcome = outcome.and_then(|translations| {
                if translations.len() == texts.len() {
                    Ok(translations)
                } else {
                    Err(BridgeError::InvalidResponseError {
                        message: format!(
                            "expected {} translations, got {}",
                            texts.len(),
                            translations.len()
                        ),
                    })
                }
            });

            match outcome {
                Ok(translations) => {
                    if attempt > 0 {
                        info!("Successfully translated after {} retries", attempt);
                    }
                    return Ok(translations);
                }
                Err(e) => {
                    warn!("Backend {} attempt {} failed: {}", backend.name(), attempt + 1, e);
                    let retryable = e.is_retryable();
                    last_error = Some(e);
                    if !retryable {
                        break;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| BridgeError::inference("backend was never called")))
    }
}
