use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::error::{PermanentKind, ProviderError, ProviderResult, TransientKind};
use crate::traits::{BackendRequest, BackendTranslation, TranslationBackend};
use polyglot_core::models::{LanguageCode, ProviderId};

/// Free tier: broad-ish coverage with a per-day request budget.
///
/// The budget is tracked locally so an exhausted day short-circuits to
/// `Permanent(BudgetExhausted)` without an HTTP call; it resets on UTC day
/// rollover. Supplying an identity email raises the provider-side quota.
///
/// The backend cannot detect the source language; callers must supply one
/// (the orchestrator emulates detection with a script heuristic).
pub struct FreeBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    identity: Option<String>,
    daily_limit: u32,
    budget: Mutex<DailyBudget>,
    targets: HashSet<LanguageCode>,
}

#[derive(Debug, Clone, Copy)]
struct DailyBudget {
    day: NaiveDate,
    remaining: u32,
}

impl FreeBackend {
    pub const MAX_TEXT_CHARS: usize = 2000;

    const DEFAULT_BASE_URL: &'static str = "https://api.free-translate.example.com";

    pub fn new(
        api_key: Option<String>,
        identity: Option<String>,
        daily_limit: u32,
        targets: HashSet<LanguageCode>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("polyglot/0.1")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            api_key,
            identity,
            daily_limit,
            budget: Mutex::new(DailyBudget {
                day: Utc::now().date_naive(),
                remaining: daily_limit,
            }),
            targets,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Requests left in today's budget, after applying any day rollover.
    pub fn remaining_today(&self) -> u32 {
        let mut budget = self.budget.lock().expect("budget lock poisoned");
        budget.roll_over(self.daily_limit);
        budget.remaining
    }

    /// Takes one request from the budget. Failed HTTP calls still count:
    /// they consumed provider quota.
    fn consume_budget(&self) -> ProviderResult<()> {
        let mut budget = self.budget.lock().expect("budget lock poisoned");
        budget.roll_over(self.daily_limit);
        if budget.remaining == 0 {
            return Err(ProviderError::Permanent(PermanentKind::BudgetExhausted));
        }
        budget.remaining -= 1;
        Ok(())
    }
}

impl DailyBudget {
    fn roll_over(&mut self, daily_limit: u32) {
        let today = Utc::now().date_naive();
        if self.day != today {
            self.day = today;
            self.remaining = daily_limit;
        }
    }
}

#[derive(Deserialize)]
struct FreeResponse {
    #[serde(rename = "responseData")]
    data: FreeResponseData,
    #[serde(rename = "responseStatus")]
    status: i64,
}

#[derive(Deserialize)]
struct FreeResponseData {
    #[serde(rename = "translatedText")]
    translated_text: String,
    #[serde(rename = "match", default)]
    match_confidence: Option<f32>,
}

#[async_trait]
impl TranslationBackend for FreeBackend {
    fn id(&self) -> ProviderId {
        ProviderId::Free
    }

    fn supported_targets(&self) -> &HashSet<LanguageCode> {
        &self.targets
    }

    fn detects_source(&self) -> bool {
        false
    }

    async fn translate(&self, request: &BackendRequest) -> ProviderResult<BackendTranslation> {
        if !self.supports(&request.tgt) {
            return Err(ProviderError::Unsupported(request.tgt.clone()));
        }
        let src = request
            .src
            .as_ref()
            .ok_or(ProviderError::Permanent(PermanentKind::SourceRequired))?;
        if request.text.chars().count() > Self::MAX_TEXT_CHARS {
            return Err(ProviderError::Permanent(PermanentKind::TextTooLong(
                Self::MAX_TEXT_CHARS,
            )));
        }

        self.consume_budget()?;

        let langpair = format!("{}|{}", src, request.tgt);
        let mut query: Vec<(&str, String)> = vec![
            ("q", request.text.clone()),
            ("langpair", langpair),
        ];
        if let Some(identity) = &self.identity {
            query.push(("de", identity.clone()));
        }
        if let Some(key) = &self.api_key {
            query.push(("key", key.clone()));
        }

        let response = self
            .client
            .get(format!("{}/get", self.base_url))
            .query(&query)
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

        let body: FreeResponse = response.json().await.map_err(|e| {
            ProviderError::Permanent(PermanentKind::MalformedResponse(e.to_string()))
        })?;

        // The provider tunnels errors through an in-body status field.
        match body.status {
            200 => {
                debug!(
                    confidence = ?body.data.match_confidence,
                    "free tier translation succeeded"
                );
                Ok(BackendTranslation {
                    text: body.data.translated_text,
                    detected_src: Some(src.clone()),
                    confidence: body.data.match_confidence,
                })
            }
            429 => Err(ProviderError::Transient(TransientKind::RateLimited)),
            403 => Err(ProviderError::Permanent(PermanentKind::BudgetExhausted)),
            other => Err(ProviderError::Permanent(PermanentKind::Rejected(
                other.clamp(0, u16::MAX as i64) as u16,
            ))),
        }
    }
}
