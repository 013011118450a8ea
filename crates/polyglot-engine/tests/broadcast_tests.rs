use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use polyglot_core::directory::LanguageDirectory;
use polyglot_core::errors::DeliveryError;
use polyglot_core::models::{
    ChannelId, GuildId, LanguageCode, ProviderId, Recipient, UserId,
};
use polyglot_engine::broadcast::{BroadcastRequest, BroadcastSettings, Broadcaster};
use polyglot_engine::cache::TranslationCache;
use polyglot_engine::host::{ChannelAlerter, DirectMessenger, RecipientSource, RoleLookup};
use polyglot_engine::orchestrator::Orchestrator;
use polyglot_engine::resolver::TargetResolver;
use polyglot_providers::error::{ProviderError, TransientKind};
use polyglot_providers::mock::MockBackend;
use polyglot_providers::traits::TranslationBackend;

fn code(s: &str) -> LanguageCode {
    LanguageCode::new(s)
}

fn recipient(id: u64, name: &str, lang: Option<&str>) -> Recipient {
    Recipient {
        id: UserId(id),
        display_name: name.to_string(),
        is_bot: false,
        can_receive_dm: true,
        languages: lang.map(code).into_iter().collect(),
    }
}

/// Host double that records every platform interaction in order.
struct ScriptedHost {
    recipients: Vec<Recipient>,
    failing_dms: HashSet<UserId>,
    dm_delay: Option<Duration>,
    events: Mutex<Vec<String>>,
    dms: Mutex<Vec<(UserId, String)>>,
}

impl ScriptedHost {
    fn new(recipients: Vec<Recipient>) -> Self {
        Self {
            recipients,
            failing_dms: HashSet::new(),
            dm_delay: None,
            events: Mutex::new(Vec::new()),
            dms: Mutex::new(Vec::new()),
        }
    }

    fn with_failing_dm(mut self, user: UserId) -> Self {
        self.failing_dms.insert(user);
        self
    }

    fn with_dm_delay(mut self, delay: Duration) -> Self {
        self.dm_delay = Some(delay);
        self
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn dms(&self) -> Vec<(UserId, String)> {
        self.dms.lock().unwrap().clone()
    }
}

#[async_trait]
impl RoleLookup for ScriptedHost {
    async fn language_codes(&self, _user: UserId, _guild: GuildId) -> Vec<LanguageCode> {
        Vec::new()
    }
}

#[async_trait]
impl RecipientSource for ScriptedHost {
    async fn list_guild_recipients(&self, _guild: GuildId) -> Vec<Recipient> {
        self.recipients.clone()
    }
}

#[async_trait]
impl DirectMessenger for ScriptedHost {
    async fn send_direct_message(
        &self,
        recipient: UserId,
        text: &str,
    ) -> Result<(), DeliveryError> {
        if let Some(delay) = self.dm_delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_dms.contains(&recipient) {
            return Err(DeliveryError::Blocked);
        }
        self.events.lock().unwrap().push(format!("dm:{}", recipient));
        self.dms.lock().unwrap().push((recipient, text.to_string()));
        Ok(())
    }
}

#[async_trait]
impl ChannelAlerter for ScriptedHost {
    async fn emit_channel_alert(
        &self,
        channel: ChannelId,
        _text: &str,
    ) -> Result<(), DeliveryError> {
        self.events.lock().unwrap().push(format!("alert:{}", channel));
        Ok(())
    }
}

fn broadcaster(
    backend: &MockBackend,
    host: Arc<ScriptedHost>,
    settings: BroadcastSettings,
) -> Broadcaster {
    let directory = Arc::new(LanguageDirectory::embedded().unwrap());
    let backends: Vec<Arc<dyn TranslationBackend>> = vec![Arc::new(backend.clone())];
    let cache = Arc::new(TranslationCache::new(100, Duration::from_secs(60)));
    let orchestrator = Arc::new(Orchestrator::new(
        backends,
        cache,
        Duration::from_millis(200),
    ));
    let resolver = Arc::new(TargetResolver::new(directory, host.clone()));
    Broadcaster::new(orchestrator, resolver, host, settings)
}

fn request(guild: u64, sender: u64) -> BroadcastRequest {
    BroadcastRequest {
        source_text: "Fire! Evacuate now.".to_string(),
        source_lang: Some(code("en")),
        guild: GuildId(guild),
        sender: UserId(sender),
        origin_label: "sos".to_string(),
        alert_channel: Some(ChannelId(77)),
    }
}

#[tokio::test]
async fn mixed_language_fan_out_translates_once_per_group() {
    let mut r4 = recipient(4, "bot", Some("es"));
    r4.is_bot = true;
    let mut r5 = recipient(5, "closed-dms", Some("es"));
    r5.can_receive_dm = false;

    let host = Arc::new(ScriptedHost::new(vec![
        recipient(1, "r1", Some("en")),
        recipient(2, "r2", Some("es")),
        recipient(3, "r3", Some("fr")),
        r4,
        r5,
        recipient(9, "sender", Some("en")),
    ]));
    let backend = MockBackend::new(ProviderId::Premium).with_targets(&["es", "fr", "en"]);
    let broadcaster = broadcaster(&backend, host.clone(), BroadcastSettings::default());

    let report = broadcaster.broadcast(request(10, 9)).await;

    assert_eq!(report.sent, 3);
    assert_eq!(report.dm_failed, 1);
    assert_eq!(report.translation_fallback, 0);
    assert_eq!(report.skipped_no_target, 0);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].recipient, UserId(5));

    // Exactly one provider call per non-source language group.
    assert_eq!(backend.call_count(), 2);

    let dms: HashMap<UserId, String> = host.dms().into_iter().collect();
    // The English group gets the source text untouched.
    assert_eq!(dms[&UserId(1)], "Fire! Evacuate now.");
    assert_eq!(
        dms[&UserId(2)],
        MockBackend::echo("Fire! Evacuate now.", &code("es"))
    );
    assert_eq!(
        dms[&UserId(3)],
        MockBackend::echo("Fire! Evacuate now.", &code("fr"))
    );
}

#[tokio::test]
async fn channel_alert_is_emitted_before_any_dm() {
    let host = Arc::new(ScriptedHost::new(vec![
        recipient(1, "r1", Some("es")),
        recipient(2, "r2", Some("fr")),
    ]));
    let backend = MockBackend::new(ProviderId::Premium).with_targets(&["es", "fr"]);
    let broadcaster = broadcaster(&backend, host.clone(), BroadcastSettings::default());

    broadcaster.broadcast(request(10, 9)).await;

    let events = host.events();
    assert!(events[0].starts_with("alert:"), "events: {:?}", events);
    assert_eq!(events.iter().filter(|e| e.starts_with("dm:")).count(), 2);
}

#[tokio::test]
async fn one_failing_dm_never_aborts_the_others() {
    let host = Arc::new(
        ScriptedHost::new(vec![
            recipient(1, "r1", Some("es")),
            recipient(2, "r2", Some("es")),
            recipient(3, "r3", Some("es")),
        ])
        .with_failing_dm(UserId(2)),
    );
    let backend = MockBackend::new(ProviderId::Premium).with_targets(&["es"]);
    let broadcaster = broadcaster(&backend, host.clone(), BroadcastSettings::default());

    let report = broadcaster.broadcast(request(10, 9)).await;

    assert_eq!(report.sent, 2);
    assert_eq!(report.dm_failed, 1);
    assert_eq!(report.failures[0].recipient, UserId(2));
    // One group, one translation.
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn translation_failure_falls_back_to_source_text_for_that_group_only() {
    let host = Arc::new(ScriptedHost::new(vec![
        recipient(1, "r1", Some("es")),
        recipient(2, "r2", Some("en")),
    ]));
    let backend = MockBackend::new(ProviderId::Premium)
        .with_targets(&["es", "en"])
        .failing_with(ProviderError::Transient(TransientKind::Server(500)));
    let broadcaster = broadcaster(&backend, host.clone(), BroadcastSettings::default());

    let report = broadcaster.broadcast(request(10, 9)).await;

    // Both recipients still get a message; the es group is marked fallback.
    assert_eq!(report.sent, 2);
    assert_eq!(report.translation_fallback, 1);

    let dms: HashMap<UserId, String> = host.dms().into_iter().collect();
    assert_eq!(dms[&UserId(1)], "Fire! Evacuate now.");
    assert_eq!(dms[&UserId(2)], "Fire! Evacuate now.");
}

#[tokio::test]
async fn recipients_without_a_target_language_are_skipped() {
    let host = Arc::new(ScriptedHost::new(vec![
        recipient(1, "r1", Some("es")),
        recipient(2, "no-langs", None),
    ]));
    let backend = MockBackend::new(ProviderId::Premium).with_targets(&["es"]);
    let broadcaster = broadcaster(&backend, host.clone(), BroadcastSettings::default());

    let report = broadcaster.broadcast(request(10, 9)).await;

    assert_eq!(report.sent, 1);
    assert_eq!(report.skipped_no_target, 1);
}

#[tokio::test]
async fn deadline_expiry_cancels_in_flight_groups_without_hanging() {
    let host = Arc::new(
        ScriptedHost::new(vec![
            recipient(1, "r1", Some("es")),
            recipient(2, "r2", Some("fr")),
        ])
        .with_dm_delay(Duration::from_secs(30)),
    );
    let backend = MockBackend::new(ProviderId::Premium).with_targets(&["es", "fr"]);
    let settings = BroadcastSettings {
        deadline: Duration::from_millis(100),
        ..BroadcastSettings::default()
    };
    let broadcaster = broadcaster(&backend, host.clone(), settings);

    let report = tokio::time::timeout(Duration::from_secs(5), broadcaster.broadcast(request(10, 9)))
        .await
        .expect("broadcast must respect its deadline");

    assert_eq!(report.sent, 0);
}

#[tokio::test]
async fn user_preference_overrides_the_recipient_role_language() {
    let host = Arc::new(ScriptedHost::new(vec![recipient(1, "r1", Some("es"))]));
    let backend = MockBackend::new(ProviderId::Premium).with_targets(&["es", "de"]);

    let directory = Arc::new(LanguageDirectory::embedded().unwrap());
    let backends: Vec<Arc<dyn TranslationBackend>> = vec![Arc::new(backend.clone())];
    let cache = Arc::new(TranslationCache::new(100, Duration::from_secs(60)));
    let orchestrator = Arc::new(Orchestrator::new(
        backends,
        cache,
        Duration::from_millis(200),
    ));
    let resolver = Arc::new(TargetResolver::new(directory, host.clone()));
    resolver
        .preferences()
        .set(UserId(1), GuildId(10), code("de"));
    let broadcaster = Broadcaster::new(
        orchestrator,
        resolver,
        host.clone(),
        BroadcastSettings::default(),
    );

    broadcaster.broadcast(request(10, 9)).await;

    let dms = host.dms();
    assert_eq!(dms.len(), 1);
    assert_eq!(dms[0].1, MockBackend::echo("Fire! Evacuate now.", &code("de")));
}
