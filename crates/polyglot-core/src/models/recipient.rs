use serde::{Deserialize, Serialize};

use super::{LanguageCode, UserId};

/// Guild member considered for a broadcast delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub id: UserId,
    pub display_name: String,
    pub is_bot: bool,
    pub can_receive_dm: bool,
    /// Language codes in precedence order; the first entry is the primary
    /// target for this recipient.
    pub languages: Vec<LanguageCode>,
}

impl Recipient {
    pub fn primary_language(&self) -> Option<&LanguageCode> {
        self.languages.first()
    }
}

/// Per-recipient failure kept in the bounded report sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryFailure {
    pub recipient: UserId,
    pub display_name: String,
    pub reason: String,
}

/// Aggregate outcome of one broadcast fan-out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BroadcastReport {
    pub sent: usize,
    pub dm_failed: usize,
    pub translation_fallback: usize,
    /// Recipients dropped because no target language could be resolved.
    pub skipped_no_target: usize,
    pub alert_failed: bool,
    /// Bounded sample of per-recipient failures; counts above are complete.
    pub failures: Vec<DeliveryFailure>,
}

impl BroadcastReport {
    pub const FAILURE_SAMPLE_LIMIT: usize = 10;

    pub fn record_failure(&mut self, recipient: UserId, display_name: &str, reason: &str) {
        if self.failures.len() < Self::FAILURE_SAMPLE_LIMIT {
            self.failures.push(DeliveryFailure {
                recipient,
                display_name: display_name.to_string(),
                reason: reason.to_string(),
            });
        }
    }

    pub fn merge(&mut self, other: BroadcastReport) {
        self.sent += other.sent;
        self.dm_failed += other.dm_failed;
        self.translation_fallback += other.translation_fallback;
        self.skipped_no_target += other.skipped_no_target;
        self.alert_failed |= other.alert_failed;
        for failure in other.failures {
            if self.failures.len() >= Self::FAILURE_SAMPLE_LIMIT {
                break;
            }
            self.failures.push(failure);
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "sent: {} | dm failed: {} | translation fallback: {} | no language set: {}",
            self.sent, self.dm_failed, self.translation_fallback, self.skipped_no_target
        )
    }
}
