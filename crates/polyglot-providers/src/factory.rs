use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::{BroadBackend, FreeBackend, PremiumBackend, TranslationBackend};
use polyglot_core::directory::LanguageDirectory;
use polyglot_core::models::ProviderId;

/// Everything the factory needs to assemble the tier chain.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    /// Enables the premium tier when present.
    pub premium_api_key: Option<String>,
    /// Raises the free tier's provider-side quota when present.
    pub free_api_key: Option<String>,
    pub free_identity: Option<String>,
    pub free_daily_budget: u32,
    pub broad_enabled: bool,
    /// Per-attempt HTTP timeout. The broad tier is allowed twice this.
    pub timeout: Duration,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            premium_api_key: None,
            free_api_key: None,
            free_identity: None,
            free_daily_budget: 500,
            broad_enabled: true,
            timeout: Duration::from_millis(8000),
        }
    }
}

/// Builds the backend chain in fixed tier order: premium, free, broad.
///
/// Unconfigured or disabled tiers are skipped with a log line; capability
/// sets come from the language directory so the chain and the directory
/// never disagree about coverage.
pub struct ProviderFactory {
    settings: BackendSettings,
}

impl ProviderFactory {
    pub fn new(settings: BackendSettings) -> Self {
        Self { settings }
    }

    pub fn build(&self, directory: &LanguageDirectory) -> Vec<Arc<dyn TranslationBackend>> {
        let mut backends: Vec<Arc<dyn TranslationBackend>> = Vec::new();

        match &self.settings.premium_api_key {
            Some(api_key) => {
                let targets = directory.capability_codes(ProviderId::Premium);
                info!("✓ premium tier initialized ({} targets)", targets.len());
                backends.push(Arc::new(PremiumBackend::new(
                    api_key.clone(),
                    targets,
                    self.settings.timeout,
                )));
            }
            None => info!("⊘ premium tier skipped (no API key configured)"),
        }

        // The free tier needs no key; one only raises its quota.
        let free_targets = directory.capability_codes(ProviderId::Free);
        info!(
            "✓ free tier initialized ({} targets, {} requests/day)",
            free_targets.len(),
            self.settings.free_daily_budget
        );
        backends.push(Arc::new(FreeBackend::new(
            self.settings.free_api_key.clone(),
            self.settings.free_identity.clone(),
            self.settings.free_daily_budget,
            free_targets,
            self.settings.timeout,
        )));

        if self.settings.broad_enabled {
            let targets = directory.capability_codes(ProviderId::Broad);
            info!("✓ broad tier initialized ({} targets)", targets.len());
            backends.push(Arc::new(BroadBackend::new(
                targets,
                self.settings.timeout * 2,
            )));
        } else {
            info!("⊘ broad tier skipped (disabled)");
        }

        backends
    }
}
