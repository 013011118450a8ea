use serde::{Deserialize, Serialize};

use super::{LanguageCode, ProviderId};

/// Why a request produced no fresh translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Source equals target (or the text was empty); the original text is
    /// returned untouched.
    NoTranslationNeeded,
    /// No target could be resolved from context; the caller must supply one.
    NeedsTarget,
    /// Explicit input failed directory lookup.
    UnknownLanguage,
    /// The target is valid but no enabled provider covers it.
    UnsupportedTarget,
    /// No tier produced a result; permanent for this request. `attempted`
    /// lists the tiers that were tried.
    AllProvidersFailed,
    /// Deadline expired or the request was cancelled externally.
    Cancelled,
}

/// Closed metadata record attached to every [`TranslationResult`].
///
/// The full key vocabulary lives here; there is deliberately no open map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultMeta {
    pub reason: Option<FailureReason>,
    pub cache_hit: bool,
    /// Tiers that were actually called, in dispatch order.
    pub attempted: Vec<ProviderId>,
    pub confidence_estimate: Option<f32>,
}

/// Outcome of one translation request.
///
/// `text` present means the caller has something to deliver. Absent text is
/// always accompanied by a populated `meta.reason`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub text: Option<String>,
    pub src: Option<LanguageCode>,
    pub tgt: Option<LanguageCode>,
    pub provider_id: Option<ProviderId>,
    pub meta: ResultMeta,
}

impl TranslationResult {
    pub fn translated(
        text: impl Into<String>,
        src: Option<LanguageCode>,
        tgt: LanguageCode,
        provider: ProviderId,
        confidence: Option<f32>,
    ) -> Self {
        Self {
            text: Some(text.into()),
            src,
            tgt: Some(tgt),
            provider_id: Some(provider),
            meta: ResultMeta {
                confidence_estimate: confidence,
                ..ResultMeta::default()
            },
        }
    }

    /// Original text passed through because no translation was needed.
    pub fn unchanged(
        text: impl Into<String>,
        src: Option<LanguageCode>,
        tgt: LanguageCode,
    ) -> Self {
        Self {
            text: Some(text.into()),
            src,
            tgt: Some(tgt),
            provider_id: None,
            meta: ResultMeta {
                reason: Some(FailureReason::NoTranslationNeeded),
                ..ResultMeta::default()
            },
        }
    }

    pub fn failed(reason: FailureReason) -> Self {
        Self {
            text: None,
            src: None,
            tgt: None,
            provider_id: None,
            meta: ResultMeta {
                reason: Some(reason),
                ..ResultMeta::default()
            },
        }
    }

    pub fn failed_for(reason: FailureReason, tgt: LanguageCode) -> Self {
        Self {
            tgt: Some(tgt),
            ..Self::failed(reason)
        }
    }

    pub fn with_attempted(mut self, attempted: Vec<ProviderId>) -> Self {
        self.meta.attempted = attempted;
        self
    }

    pub fn succeeded(&self) -> bool {
        self.text.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translated_result_carries_provider_and_text() {
        let result = TranslationResult::translated(
            "Hola",
            Some(LanguageCode::new("en")),
            LanguageCode::new("es"),
            ProviderId::Premium,
            Some(0.98),
        );
        assert!(result.succeeded());
        assert_eq!(result.provider_id, Some(ProviderId::Premium));
        assert_eq!(result.meta.reason, None);
    }

    #[test]
    fn failed_result_has_no_text_and_a_reason() {
        let result = TranslationResult::failed(FailureReason::NeedsTarget);
        assert!(!result.succeeded());
        assert_eq!(result.meta.reason, Some(FailureReason::NeedsTarget));
    }

    #[test]
    fn unchanged_result_keeps_text_with_reason() {
        let result = TranslationResult::unchanged("Hola", None, LanguageCode::new("es"));
        assert!(result.succeeded());
        assert_eq!(result.meta.reason, Some(FailureReason::NoTranslationNeeded));
        assert_eq!(result.provider_id, None);
    }
}
