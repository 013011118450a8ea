use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical lowercase language identifier (`en`, `es`, `zh`, `tl`, `nb`).
///
/// Construction trims whitespace and folds case, so comparison is
/// case-insensitive with respect to the original input. The sentinels
/// "auto" and "unknown" are not codes; they live on [`TargetLanguage`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LanguageCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Outcome of deciding which language a message should be translated to.
///
/// `Unspecified` is the "needs target" signal: no preference could be
/// determined from context. `Unrecognized` marks explicit input that failed
/// directory lookup. Neither sentinel ever reaches a provider; only
/// `Resolved` carries a dispatchable code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetLanguage {
    Resolved(LanguageCode),
    Unspecified,
    Unrecognized,
}

impl TargetLanguage {
    pub fn code(&self) -> Option<&LanguageCode> {
        match self {
            TargetLanguage::Resolved(code) => Some(code),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, TargetLanguage::Resolved(_))
    }
}

/// Translation backend that produced (or was asked to produce) a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Premium,
    Free,
    Broad,
}

impl ProviderId {
    /// Fixed quality-first dispatch order. Never reordered at runtime.
    pub const TIER_ORDER: [ProviderId; 3] =
        [ProviderId::Premium, ProviderId::Free, ProviderId::Broad];
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderId::Premium => write!(f, "premium"),
            ProviderId::Free => write!(f, "free"),
            ProviderId::Broad => write!(f, "broad"),
        }
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "premium" => Ok(ProviderId::Premium),
            "free" => Ok(ProviderId::Free),
            "broad" => Ok(ProviderId::Broad),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}
