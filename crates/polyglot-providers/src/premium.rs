use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use serde::{Deserialize, Serialize};

use crate::error::{PermanentKind, ProviderError, ProviderResult, TransientKind};
use crate::traits::{BackendRequest, BackendTranslation, TranslationBackend};
use polyglot_core::models::{LanguageCode, ProviderId};

/// Premium tier: highest quality, narrowest coverage, paid API key.
///
/// The backend enforces a hard request length cap; over-cap text is rejected
/// with `Permanent(TextTooLong)` rather than silently truncated.
pub struct PremiumBackend {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    targets: HashSet<LanguageCode>,
    rate_limiter: DefaultDirectRateLimiter,
}

impl PremiumBackend {
    /// Provider-side request size limit, enforced locally to avoid wasted
    /// calls.
    pub const MAX_TEXT_CHARS: usize = 3000;

    const DEFAULT_BASE_URL: &'static str = "https://api.premium-translate.example.com";

    pub fn new(api_key: String, targets: HashSet<LanguageCode>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("polyglot/0.1")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            targets,
            rate_limiter: RateLimiter::direct(Quota::per_second(nonzero!(10u32))),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// The wire format wants uppercase codes with pinned regional variants
    /// for the two languages the provider splits by region.
    fn wire_target(code: &LanguageCode) -> String {
        match code.as_str() {
            "en" => "EN-US".to_string(),
            "pt" => "PT-BR".to_string(),
            other => other.to_uppercase(),
        }
    }
}

#[derive(Serialize)]
struct PremiumRequest {
    text: Vec<String>,
    target_lang: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_lang: Option<String>,
}

#[derive(Deserialize)]
struct PremiumResponse {
    translations: Vec<PremiumTranslation>,
}

#[derive(Deserialize)]
struct PremiumTranslation {
    text: String,
    #[serde(default)]
    detected_source_language: Option<String>,
}

#[async_trait]
impl TranslationBackend for PremiumBackend {
    fn id(&self) -> ProviderId {
        ProviderId::Premium
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

        let payload = PremiumRequest {
            text: vec![request.text.clone()],
            target_lang: Self::wire_target(&request.tgt),
            source_lang: request.src.as_ref().map(|s| s.as_str().to_uppercase()),
        };

        let response = self
            .client
            .post(format!("{}/v2/translate", self.base_url))
            .header("Authorization", format!("Premium-Auth-Key {}", self.api_key))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body: PremiumResponse = response.json().await.map_err(|e| {
                ProviderError::Permanent(PermanentKind::MalformedResponse(e.to_string()))
            })?;
            let translation = body.translations.into_iter().next().ok_or_else(|| {
                ProviderError::Permanent(PermanentKind::MalformedResponse(
                    "empty translations array".to_string(),
                ))
            })?;
            return Ok(BackendTranslation {
                text: translation.text,
                detected_src: translation
                    .detected_source_language
                    .map(|s| LanguageCode::new(s)),
                confidence: None,
            });
        }

        Err(match status.as_u16() {
            401 | 403 => ProviderError::Permanent(PermanentKind::AuthFailed),
            429 => ProviderError::Transient(TransientKind::RateLimited),
            // Quota-exhausted status used by the provider.
            456 => ProviderError::Permanent(PermanentKind::BudgetExhausted),
            code if code == 408 || code >= 500 => {
                ProviderError::Transient(TransientKind::Server(code))
            }
            code => ProviderError::Permanent(PermanentKind::Rejected(code)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_target_pins_regional_variants() {
        assert_eq!(PremiumBackend::wire_target(&LanguageCode::new("en")), "EN-US");
        assert_eq!(PremiumBackend::wire_target(&LanguageCode::new("pt")), "PT-BR");
        assert_eq!(PremiumBackend::wire_target(&LanguageCode::new("es")), "ES");
    }
}
