use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::ProviderResult;
use polyglot_core::models::{LanguageCode, ProviderId};

/// One translation attempt handed to a backend.
///
/// `tgt` is always a concrete canonical code; the orchestrator resolves any
/// sentinel before dispatch. `src` of `None` asks the backend to detect the
/// source, which is only valid when [`TranslationBackend::detects_source`]
/// holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendRequest {
    pub text: String,
    pub src: Option<LanguageCode>,
    pub tgt: LanguageCode,
}

/// Successful backend output.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendTranslation {
    pub text: String,
    pub detected_src: Option<LanguageCode>,
    pub confidence: Option<f32>,
}

/// Uniform interface over the translation tiers (premium, free, broad).
///
/// Implementations share no inheritance; the orchestrator depends only on
/// this trait. Each adapter owns its HTTP client, limiter, and local state.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Codes this backend can translate *to*.
    fn supported_targets(&self) -> &HashSet<LanguageCode>;

    fn supports(&self, code: &LanguageCode) -> bool {
        self.supported_targets().contains(code)
    }

    /// Whether the backend accepts `src = None` and detects the source
    /// itself. When false, the caller must supply a source code.
    fn detects_source(&self) -> bool;

    async fn translate(&self, request: &BackendRequest) -> ProviderResult<BackendTranslation>;
}
