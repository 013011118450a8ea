//! Composition root for the polyglot translation subsystem.
//!
//! [`TranslationHub`] wires the language directory, cache, provider tiers,
//! target resolver, and broadcaster together, and exposes the operations the
//! host's command layer calls. Everything is constructed here and passed by
//! reference; nothing reaches into module-level state.

pub mod cli;
pub mod config;

pub use config::ServiceConfig;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use polyglot_core::directory::LanguageDirectory;
use polyglot_core::errors::{CoreError, CoreResult};
use polyglot_core::models::{
    BroadcastReport, FailureReason, GuildId, LanguageCode, TargetLanguage, TranslationResult,
    UserId,
};
use polyglot_core::normalize;
use polyglot_engine::broadcast::{BroadcastRequest, BroadcastSettings, Broadcaster};
use polyglot_engine::cache::TranslationCache;
use polyglot_engine::host::{HostPlatform, RoleLookup};
use polyglot_engine::orchestrator::Orchestrator;
use polyglot_engine::resolver::TargetResolver;
use polyglot_providers::factory::{BackendSettings, ProviderFactory};
use polyglot_providers::traits::TranslationBackend;

/// Role lookup used when no host platform is attached; resolves nothing, so
/// only explicit input, preferences, and guild defaults apply.
struct NoRoles;

#[async_trait]
impl RoleLookup for NoRoles {
    async fn language_codes(&self, _user: UserId, _guild: GuildId) -> Vec<LanguageCode> {
        Vec::new()
    }
}

/// Delegates role lookups to the attached host platform.
struct HostRoles(Arc<dyn HostPlatform>);

#[async_trait]
impl RoleLookup for HostRoles {
    async fn language_codes(&self, user: UserId, guild: GuildId) -> Vec<LanguageCode> {
        self.0.language_codes(user, guild).await
    }
}

pub struct TranslationHub {
    directory: Arc<LanguageDirectory>,
    cache: Arc<TranslationCache>,
    orchestrator: Arc<Orchestrator>,
    resolver: Arc<TargetResolver>,
    broadcaster: Option<Broadcaster>,
}

pub struct TranslationHubBuilder {
    config: ServiceConfig,
    host: Option<Arc<dyn HostPlatform>>,
    backends: Option<Vec<Arc<dyn TranslationBackend>>>,
}

impl TranslationHubBuilder {
    /// Attach the chat platform; enables role-based resolution and the
    /// broadcast operation.
    pub fn host(mut self, host: Arc<dyn HostPlatform>) -> Self {
        self.host = Some(host);
        self
    }

    /// Replace the factory-built tier chain. Used by tests and embedders
    /// that bring their own backends.
    pub fn backends(mut self, backends: Vec<Arc<dyn TranslationBackend>>) -> Self {
        self.backends = Some(backends);
        self
    }

    pub fn build(self) -> CoreResult<TranslationHub> {
        let config = self.config;

        let directory = Arc::new(match &config.language_directory_path {
            Some(path) => LanguageDirectory::from_path(path)?,
            None => LanguageDirectory::embedded()?,
        });

        let cache = Arc::new(TranslationCache::new(config.cache_capacity, config.cache_ttl));

        let backends = match self.backends {
            Some(backends) => backends,
            None => ProviderFactory::new(BackendSettings {
                premium_api_key: config.premium_api_key.clone(),
                free_api_key: config.free_api_key.clone(),
                free_identity: config.free_user_identity.clone(),
                free_daily_budget: config.free_daily_budget,
                broad_enabled: config.broad_enabled,
                timeout: config.provider_timeout,
            })
            .build(&directory),
        };

        // The outer per-attempt bound must cover the broad tier, whose own
        // client timeout is twice the base value.
        let orchestrator = Arc::new(Orchestrator::new(
            backends,
            Arc::clone(&cache),
            config.provider_timeout * 2,
        ));

        let roles: Arc<dyn RoleLookup> = match &self.host {
            Some(host) => Arc::new(HostRoles(Arc::clone(host))),
            None => Arc::new(NoRoles),
        };
        let resolver = Arc::new(TargetResolver::new(Arc::clone(&directory), roles));

        let broadcaster = self.host.map(|host| {
            Broadcaster::new(
                Arc::clone(&orchestrator),
                Arc::clone(&resolver),
                host,
                BroadcastSettings {
                    group_concurrency: config.group_concurrency,
                    dm_concurrency: config.dm_concurrency,
                    deadline: config.broadcast_deadline,
                },
            )
        });

        info!(
            tiers = orchestrator.backends().len(),
            languages = directory.len(),
            broadcast = broadcaster.is_some(),
            "translation hub ready"
        );

        Ok(TranslationHub {
            directory,
            cache,
            orchestrator,
            resolver,
            broadcaster,
        })
    }
}

impl TranslationHub {
    pub fn builder(config: ServiceConfig) -> TranslationHubBuilder {
        TranslationHubBuilder {
            config,
            host: None,
            backends: None,
        }
    }

    pub fn new(config: ServiceConfig) -> CoreResult<Self> {
        Self::builder(config).build()
    }

    /// On-demand translation used by commands. The target must resolve from
    /// the given input; an invalid source hint is ignored rather than fatal.
    pub async fn translate(
        &self,
        text: &str,
        target_input: Option<&str>,
        source_hint: Option<&str>,
    ) -> TranslationResult {
        let tgt = match target_input {
            Some(raw) if !raw.trim().is_empty() => match normalize(&self.directory, raw) {
                TargetLanguage::Resolved(code) => code,
                TargetLanguage::Unrecognized => {
                    return TranslationResult::failed(FailureReason::UnknownLanguage);
                }
                TargetLanguage::Unspecified => {
                    return TranslationResult::failed(FailureReason::NeedsTarget);
                }
            },
            _ => return TranslationResult::failed(FailureReason::NeedsTarget),
        };

        let src = source_hint.and_then(|raw| match normalize(&self.directory, raw) {
            TargetLanguage::Resolved(code) => Some(code),
            _ => {
                debug!("ignoring unrecognized source hint {:?}", raw);
                None
            }
        });

        self.orchestrator.translate(text, src.as_ref(), &tgt).await
    }

    /// Convenience wrapper that resolves the target from the author's
    /// context (preference, language roles, guild default) first.
    pub async fn translate_for_author(
        &self,
        text: &str,
        author: UserId,
        guild: GuildId,
    ) -> TranslationResult {
        match self.resolver.resolve(author, guild, None).await {
            TargetLanguage::Resolved(code) => {
                self.orchestrator.translate(text, None, &code).await
            }
            _ => TranslationResult::failed(FailureReason::NeedsTarget),
        }
    }

    /// SOS pathway: translate one alert into per-recipient DMs. Requires an
    /// attached host platform.
    pub async fn broadcast(&self, request: BroadcastRequest) -> CoreResult<BroadcastReport> {
        match &self.broadcaster {
            Some(broadcaster) => Ok(broadcaster.broadcast(request).await),
            None => Err(CoreError::HostNotAttached(
                "broadcast requires a host platform".to_string(),
            )),
        }
    }

    /// Record an explicit user preference. The input goes through the
    /// normalizer, so names, aliases, and flags all work.
    pub fn set_preference(
        &self,
        user: UserId,
        guild: GuildId,
        input: &str,
    ) -> CoreResult<LanguageCode> {
        match normalize(&self.directory, input) {
            TargetLanguage::Resolved(code) => {
                self.resolver.preferences().set(user, guild, code.clone());
                Ok(code)
            }
            _ => Err(CoreError::UnknownLanguage(input.to_string())),
        }
    }

    pub fn clear_preference(&self, user: UserId, guild: GuildId) -> Option<LanguageCode> {
        self.resolver.preferences().clear(user, guild)
    }

    pub fn preference(&self, user: UserId, guild: GuildId) -> Option<LanguageCode> {
        self.resolver.preferences().get(user, guild)
    }

    pub fn set_guild_default(&self, guild: GuildId, input: &str) -> CoreResult<LanguageCode> {
        match normalize(&self.directory, input) {
            TargetLanguage::Resolved(code) => {
                self.resolver.set_guild_default(guild, code.clone());
                Ok(code)
            }
            _ => Err(CoreError::UnknownLanguage(input.to_string())),
        }
    }

    pub fn directory(&self) -> &LanguageDirectory {
        &self.directory
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn backends(&self) -> &[Arc<dyn TranslationBackend>] {
        self.orchestrator.backends()
    }

    /// User-facing rendering of a result, following the bot's messaging
    /// contract for each failure kind.
    pub fn describe(result: &TranslationResult) -> String {
        if let Some(text) = &result.text {
            return text.clone();
        }
        match result.meta.reason {
            Some(FailureReason::NeedsTarget) => {
                "No target language could be determined. Pass a language, set a preference, \
                 or pick up a language role."
                    .to_string()
            }
            Some(FailureReason::UnknownLanguage) => {
                "That language was not recognized. Try `languages` for the full list.".to_string()
            }
            Some(FailureReason::UnsupportedTarget) => {
                "That language is temporarily unsupported.".to_string()
            }
            Some(FailureReason::AllProvidersFailed) => {
                "Translation is unavailable right now. Please try again in a moment.".to_string()
            }
            Some(FailureReason::Cancelled) => {
                "The request was cancelled before it finished.".to_string()
            }
            _ => "Translation failed for an unknown reason.".to_string(),
        }
    }
}
