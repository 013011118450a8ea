use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::cache::{CacheKey, TranslationCache};
use crate::detect;
use polyglot_core::models::{FailureReason, LanguageCode, TranslationResult};
use polyglot_providers::error::{ProviderError, ProviderResult, TransientKind};
use polyglot_providers::traits::{BackendRequest, BackendTranslation, TranslationBackend};

/// At most one retry per tier, with a short fixed backoff.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            backoff: Duration::from_millis(250),
        }
    }
}

/// Tiered dispatch across the provider chain.
///
/// Tiers are walked strictly in the order the chain was built (premium,
/// free, broad); past success rates never reorder them. The cache is
/// consulted exactly once, before any provider call, and every provider call
/// is bounded by `attempt_timeout`. `translate` never fails: the result's
/// `meta.reason` explains any absence of text.
pub struct Orchestrator {
    backends: Vec<Arc<dyn TranslationBackend>>,
    cache: Arc<TranslationCache>,
    attempt_timeout: Duration,
    retry: RetryPolicy,
}

impl Orchestrator {
    pub fn new(
        backends: Vec<Arc<dyn TranslationBackend>>,
        cache: Arc<TranslationCache>,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            backends,
            cache,
            attempt_timeout,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn backends(&self) -> &[Arc<dyn TranslationBackend>] {
        &self.backends
    }

    pub async fn translate(
        &self,
        text: &str,
        src_hint: Option<&LanguageCode>,
        tgt: &LanguageCode,
    ) -> TranslationResult {
        let started = Instant::now();

        if text.trim().is_empty() {
            let result = TranslationResult::unchanged("", src_hint.cloned(), tgt.clone());
            log_outcome(&result, started);
            return result;
        }

        if src_hint.is_some_and(|src| src == tgt) {
            let result = TranslationResult::unchanged(text, src_hint.cloned(), tgt.clone());
            log_outcome(&result, started);
            return result;
        }

        let key = CacheKey::new(text, src_hint, tgt);
        if let Some(mut hit) = self.cache.get(&key) {
            hit.meta.cache_hit = true;
            log_outcome(&hit, started);
            return hit;
        }

        let mut attempted = Vec::new();
        for backend in &self.backends {
            if !backend.supports(tgt) {
                debug!("⊘ {} tier skipped: {} unsupported", backend.id(), tgt);
                continue;
            }

            // Backends without detection get a script-heuristic source when
            // the caller supplied none.
            let src = match src_hint {
                Some(code) => Some(code.clone()),
                None if backend.detects_source() => None,
                None => match detect::guess_source(text) {
                    Some(code) => Some(code),
                    None => {
                        debug!(
                            "⊘ {} tier skipped: needs a source and none could be guessed",
                            backend.id()
                        );
                        continue;
                    }
                },
            };

            attempted.push(backend.id());
            let request = BackendRequest {
                text: text.to_string(),
                src,
                tgt: tgt.clone(),
            };

            match self.attempt(backend.as_ref(), &request).await {
                Ok(translation) => {
                    let BackendTranslation {
                        text: translated,
                        detected_src,
                        confidence,
                    } = translation;
                    let result = TranslationResult::translated(
                        translated,
                        detected_src.or_else(|| src_hint.cloned()),
                        tgt.clone(),
                        backend.id(),
                        confidence,
                    )
                    .with_attempted(attempted);
                    self.cache.put(key, &result);
                    log_outcome(&result, started);
                    return result;
                }
                Err(ProviderError::Cancelled) => {
                    let result = TranslationResult::failed_for(FailureReason::Cancelled, tgt.clone())
                        .with_attempted(attempted);
                    log_outcome(&result, started);
                    return result;
                }
                Err(err) => {
                    warn!("✗ {} tier failed for {}: {}", backend.id(), tgt, err);
                }
            }
        }

        let reason = if attempted.is_empty() {
            FailureReason::UnsupportedTarget
        } else {
            FailureReason::AllProvidersFailed
        };
        let result =
            TranslationResult::failed_for(reason, tgt.clone()).with_attempted(attempted);
        log_outcome(&result, started);
        result
    }

    /// One provider call plus at most one retry on a transient failure.
    /// A timeout counts as transient; the elapsed future is dropped, which
    /// cancels the in-flight HTTP call.
    async fn attempt(
        &self,
        backend: &dyn TranslationBackend,
        request: &BackendRequest,
    ) -> ProviderResult<BackendTranslation> {
        let mut attempt = 0;
        loop {
            let outcome =
                match tokio::time::timeout(self.attempt_timeout, backend.translate(request)).await
                {
                    Ok(result) => result,
                    Err(_) => Err(ProviderError::Transient(TransientKind::Timeout)),
                };

            match outcome {
                Err(err) if err.is_transient() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    debug!(
                        "{} tier transient failure ({}), retry {} in {:?}",
                        backend.id(),
                        err,
                        attempt,
                        self.retry.backoff
                    );
                    tokio::time::sleep(self.retry.backoff).await;
                }
                other => return other,
            }
        }
    }
}

/// One structured event per orchestrated request.
fn log_outcome(result: &TranslationResult, started: Instant) {
    info!(
        tgt = result.tgt.as_ref().map(|t| t.as_str()).unwrap_or("-"),
        src = result.src.as_ref().map(|s| s.as_str()).unwrap_or("-"),
        provider = ?result.provider_id,
        attempted = ?result.meta.attempted,
        cache_hit = result.meta.cache_hit,
        outcome = ?result.meta.reason,
        latency_ms = started.elapsed().as_millis() as u64,
        "translation request complete"
    );
}
