use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::detect;
use crate::host::HostPlatform;
use crate::orchestrator::Orchestrator;
use crate::resolver::TargetResolver;
use polyglot_core::errors::DeliveryError;
use polyglot_core::models::{
    BroadcastReport, ChannelId, GuildId, LanguageCode, Recipient, TargetLanguage, UserId,
};

/// Concurrency bounds and the overall deadline for one fan-out.
#[derive(Debug, Clone, Copy)]
pub struct BroadcastSettings {
    /// Language groups translated concurrently.
    pub group_concurrency: usize,
    /// DM sends in flight at once, shared across groups to respect the
    /// platform's global rate limit.
    pub dm_concurrency: usize,
    pub deadline: Duration,
}

impl Default for BroadcastSettings {
    fn default() -> Self {
        Self {
            group_concurrency: 10,
            dm_concurrency: 5,
            deadline: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BroadcastRequest {
    pub source_text: String,
    pub source_lang: Option<LanguageCode>,
    pub guild: GuildId,
    /// Excluded from delivery.
    pub sender: UserId,
    /// Shown in the channel alert and audit logs (e.g. "sos").
    pub origin_label: String,
    /// Where the non-translated public alert goes, emitted before the
    /// fan-out begins.
    pub alert_channel: Option<ChannelId>,
}

/// One source message, N recipients, each receiving a personalized
/// translation over DM.
///
/// Recipients are grouped by resolved target so each language is translated
/// once. Groups run concurrently under a semaphore; a slow provider for one
/// group never blocks delivery for a group that is already translated. A DM
/// failure for one recipient never aborts the others, and a translation
/// failure falls back to the source text for that group only. Delivery
/// order is undefined.
pub struct Broadcaster {
    orchestrator: Arc<Orchestrator>,
    resolver: Arc<TargetResolver>,
    host: Arc<dyn HostPlatform>,
    settings: BroadcastSettings,
}

impl Broadcaster {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        resolver: Arc<TargetResolver>,
        host: Arc<dyn HostPlatform>,
        settings: BroadcastSettings,
    ) -> Self {
        Self {
            orchestrator,
            resolver,
            host,
            settings,
        }
    }

    pub async fn broadcast(&self, request: BroadcastRequest) -> BroadcastReport {
        let mut report = BroadcastReport::default();

        // Observers see the trigger promptly, before any per-recipient work.
        if let Some(channel) = request.alert_channel {
            let alert = format!("🚨 [{}] {}", request.origin_label, request.source_text);
            if let Err(err) = self.host.emit_channel_alert(channel, &alert).await {
                warn!("channel alert failed: {}", err);
                report.alert_failed = true;
            }
        }

        let recipients = self.host.list_guild_recipients(request.guild).await;
        let groups = self.partition(&request, recipients, &mut report);

        let source_lang = request
            .source_lang
            .clone()
            .or_else(|| detect::guess_source(&request.source_text));

        let group_permits = Arc::new(Semaphore::new(self.settings.group_concurrency.max(1)));
        let dm_permits = Arc::new(Semaphore::new(self.settings.dm_concurrency.max(1)));
        let mut tasks: JoinSet<BroadcastReport> = JoinSet::new();

        for (target, members) in groups {
            let orchestrator = Arc::clone(&self.orchestrator);
            let host = Arc::clone(&self.host);
            let group_permits = Arc::clone(&group_permits);
            let dm_permits = Arc::clone(&dm_permits);
            let source_text = request.source_text.clone();
            let source_lang = source_lang.clone();
            tasks.spawn(async move {
                deliver_group(
                    orchestrator,
                    host,
                    group_permits,
                    dm_permits,
                    source_text,
                    source_lang,
                    target,
                    members,
                )
                .await
            });
        }

        // One deadline governs the whole fan-out; on expiry in-flight groups
        // are cancelled but DMs already delivered stand.
        let deadline = tokio::time::sleep(self.settings.deadline);
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                () = &mut deadline => {
                    warn!(
                        "broadcast deadline expired with {} group(s) in flight",
                        tasks.len()
                    );
                    tasks.abort_all();
                    while let Some(joined) = tasks.join_next().await {
                        if let Ok(partial) = joined {
                            report.merge(partial);
                        }
                    }
                    break;
                }
                joined = tasks.join_next() => match joined {
                    None => break,
                    Some(Ok(partial)) => report.merge(partial),
                    Some(Err(err)) if err.is_cancelled() => {}
                    Some(Err(err)) => error!("broadcast group task failed: {}", err),
                },
            }
        }

        info!(
            origin = %request.origin_label,
            "broadcast complete: {}",
            report.summary()
        );
        report
    }

    /// Drop bots, the sender, and closed DMs up front; group everyone else
    /// by their resolved target. Recipients with no resolvable target cannot
    /// be personalized and are skipped with a count.
    fn partition(
        &self,
        request: &BroadcastRequest,
        recipients: Vec<Recipient>,
        report: &mut BroadcastReport,
    ) -> HashMap<LanguageCode, Vec<Recipient>> {
        let mut groups: HashMap<LanguageCode, Vec<Recipient>> = HashMap::new();
        for recipient in recipients {
            if recipient.is_bot || recipient.id == request.sender {
                continue;
            }
            if !recipient.can_receive_dm {
                report.dm_failed += 1;
                report.record_failure(
                    recipient.id,
                    &recipient.display_name,
                    "direct messages disabled",
                );
                continue;
            }
            match self.resolver.resolve_recipient(&recipient, request.guild) {
                TargetLanguage::Resolved(code) => {
                    groups.entry(code).or_default().push(recipient);
                }
                _ => {
                    debug!("{} skipped: no target language", recipient.id);
                    report.skipped_no_target += 1;
                }
            }
        }
        groups
    }
}

#[allow(clippy::too_many_arguments)]
async fn deliver_group(
    orchestrator: Arc<Orchestrator>,
    host: Arc<dyn HostPlatform>,
    group_permits: Arc<Semaphore>,
    dm_permits: Arc<Semaphore>,
    source_text: String,
    source_lang: Option<LanguageCode>,
    target: LanguageCode,
    members: Vec<Recipient>,
) -> BroadcastReport {
    let mut report = BroadcastReport::default();
    let _permit = match group_permits.acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => return report,
    };

    let (text, fell_back) = if source_lang.as_ref() == Some(&target) {
        (source_text, false)
    } else {
        let result = orchestrator
            .translate(&source_text, source_lang.as_ref(), &target)
            .await;
        match result.text {
            Some(translated) => (translated, false),
            None => {
                warn!(
                    "translation to {} failed ({:?}); falling back to source text",
                    target, result.meta.reason
                );
                (source_text, true)
            }
        }
    };
    if fell_back {
        report.translation_fallback = members.len();
    }

    let text = Arc::new(text);
    let mut sends: JoinSet<(Recipient, Result<(), DeliveryError>)> = JoinSet::new();
    for member in members {
        let host = Arc::clone(&host);
        let dm_permits = Arc::clone(&dm_permits);
        let text = Arc::clone(&text);
        sends.spawn(async move {
            let outcome = match dm_permits.acquire_owned().await {
                Ok(_permit) => host.send_direct_message(member.id, &text).await,
                Err(_) => Err(DeliveryError::Platform("broadcast cancelled".to_string())),
            };
            (member, outcome)
        });
    }

    while let Some(joined) = sends.join_next().await {
        match joined {
            Ok((_member, Ok(()))) => report.sent += 1,
            Ok((member, Err(err))) => {
                report.dm_failed += 1;
                report.record_failure(member.id, &member.display_name, &err.to_string());
            }
            Err(err) => error!("dm task failed: {}", err),
        }
    }
    report
}
