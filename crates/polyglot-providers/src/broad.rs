use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use serde_json::Value;

use crate::error::{PermanentKind, ProviderError, ProviderResult, TransientKind};
use crate::traits::{BackendRequest, BackendTranslation, TranslationBackend};
use polyglot_core::models::{LanguageCode, ProviderId};

/// Broad tier: widest coverage over an unofficial, best-effort backend.
///
/// Last resort in the dispatch order. The response is a loosely-typed JSON
/// array rather than a documented schema, so parsing goes through
/// `serde_json::Value` and anything surprising maps to
/// `Permanent(MalformedResponse)`. The endpoint is unofficial, so requests
/// are kept under a conservative token bucket.
pub struct BroadBackend {
    client: reqwest::Client,
    base_url: String,
    targets: HashSet<LanguageCode>,
    rate_limiter: DefaultDirectRateLimiter,
}

impl BroadBackend {
    pub const MAX_TEXT_CHARS: usize = 5000;

    const DEFAULT_BASE_URL: &'static str = "https://broad-translate.example.com";

    /// `timeout` may be longer than the other tiers (the backend is slow)
    /// but must still be bounded by the caller.
    pub fn new(targets: HashSet<LanguageCode>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("polyglot/0.1")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            targets,
            rate_limiter: RateLimiter::direct(Quota::per_second(nonzero!(5u32))),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Response shape: `[[["translated", "original", ...], ...], _, "src"]`.
    /// Segment texts are concatenated; index 2 carries the detected source.
    fn parse_body(body: &Value) -> ProviderResult<(String, Option<LanguageCode>)> {
        let segments = body
            .get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| malformed("missing segments array"))?;

        let mut text = String::new();
        for segment in segments {
            if let Some(piece) = segment.get(0).and_then(Value::as_str) {
                text.push_str(piece);
            }
        }
        if text.is_empty() {
            return Err(malformed("no translated segments"));
        }

        let detected = body
            .get(2)
            .and_then(Value::as_str)
            .map(LanguageCode::new);

        Ok((text, detected))
    }
}

fn malformed(detail: &str) -> ProviderError {
    ProviderError::Permanent(PermanentKind::MalformedResponse(detail.to_string()))
}

#[async_trait]
impl TranslationBackend for BroadBackend {
    fn id(&self) -> ProviderId {
        ProviderId::Broad
    }

    fn supported_targets(&self) -> &HashSet<LanguageCode> {
        &self.targets
    }

    fn detects_source(&self) -> bool {
        true
    }

    async fn translate(&self, request: &BackendRequest) -> ProviderResult<BackendTranslation> {
        if !self.supports(&request.tgt) {
            return Err(ProviderError::Unsupported(request.tgt.clone()));
        }
        if request.text.chars().count() > Self::MAX_TEXT_CHARS {
            return Err(ProviderError::Permanent(PermanentKind::TextTooLong(
                Self::MAX_TEXT_CHARS,
            )));
        }

        self.rate_limiter.until_ready().await;

        let src = request
            .src
            .as_ref()
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| "auto".to_string());

        let response = self
            .client
            .get(format!("{}/translate_a/single", self.base_url))
            .query(&[
                ("client", "gtx"),
                ("dt", "t"),
                ("sl", src.as_str()),
                ("tl", request.tgt.as_str()),
                ("q", request.text.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                429 => ProviderError::Transient(TransientKind::RateLimited),
                code if code >= 500 => ProviderError::Transient(TransientKind::Server(code)),
                code => ProviderError::Permanent(PermanentKind::Rejected(code)),
            });
        }

        let body: Value = response.json().await.map_err(|e| {
            ProviderError::Permanent(PermanentKind::MalformedResponse(e.to_string()))
        })?;

        let (text, detected_src) = Self::parse_body(&body)?;
        Ok(BackendTranslation {
            text,
            detected_src: detected_src.or_else(|| request.src.clone()),
            confidence: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_segmented_body() {
        let body = json!([[["Hola ", "Hello ", null], ["mundo", "world", null]], null, "en"]);
        let (text, detected) = BroadBackend::parse_body(&body).unwrap();
        assert_eq!(text, "Hola mundo");
        assert_eq!(detected, Some(LanguageCode::new("en")));
    }

    #[test]
    fn rejects_malformed_body() {
        let body = json!({"unexpected": "object"});
        assert!(BroadBackend::parse_body(&body).is_err());
    }
}
