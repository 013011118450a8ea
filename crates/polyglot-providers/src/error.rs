use polyglot_core::models::LanguageCode;
use thiserror::Error;

/// Recoverable backend failures; the orchestrator may retry the tier once
/// before falling through.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransientKind {
    #[error("request timed out")]
    Timeout,

    #[error("rate limited")]
    RateLimited,

    #[error("connection failed")]
    Connect,

    #[error("server error (status {0})")]
    Server(u16),

    #[error("network error: {0}")]
    Network(String),
}

/// Failures that will not succeed again this request; the orchestrator
/// skips the tier without retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PermanentKind {
    #[error("daily request budget exhausted")]
    BudgetExhausted,

    #[error("text exceeds the {0}-character limit")]
    TextTooLong(usize),

    #[error("backend cannot detect the source language")]
    SourceRequired,

    #[error("malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("backend rejected the request (status {0})")]
    Rejected(u16),

    #[error("authentication failed")]
    AuthFailed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("target language {0} is not supported by this backend")]
    Unsupported(LanguageCode),

    #[error("transient backend failure: {0}")]
    Transient(TransientKind),

    #[error("permanent backend failure: {0}")]
    Permanent(PermanentKind),

    #[error("request cancelled")]
    Cancelled,
}

impl ProviderError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Transient(_))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Transient(TransientKind::Timeout)
        } else if err.is_connect() {
            ProviderError::Transient(TransientKind::Connect)
        } else if err.is_decode() {
            ProviderError::Permanent(PermanentKind::MalformedResponse(err.to_string()))
        } else {
            ProviderError::Transient(TransientKind::Network(err.to_string()))
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Permanent(PermanentKind::MalformedResponse(err.to_string()))
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
