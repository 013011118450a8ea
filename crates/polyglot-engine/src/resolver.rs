use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::host::RoleLookup;
use polyglot_core::directory::LanguageDirectory;
use polyglot_core::models::{GuildId, LanguageCode, Recipient, TargetLanguage, UserId};
use polyglot_core::normalize;

/// Explicitly-set user language preferences, keyed by (user, guild).
///
/// Process-lifetime; entries expire only on explicit removal. The host may
/// snapshot the map if it wants durability.
#[derive(Default)]
pub struct PreferenceStore {
    prefs: RwLock<HashMap<(UserId, GuildId), LanguageCode>>,
}

impl PreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, user: UserId, guild: GuildId, code: LanguageCode) {
        self.prefs
            .write()
            .expect("preference lock poisoned")
            .insert((user, guild), code);
    }

    pub fn get(&self, user: UserId, guild: GuildId) -> Option<LanguageCode> {
        self.prefs
            .read()
            .expect("preference lock poisoned")
            .get(&(user, guild))
            .cloned()
    }

    pub fn clear(&self, user: UserId, guild: GuildId) -> Option<LanguageCode> {
        self.prefs
            .write()
            .expect("preference lock poisoned")
            .remove(&(user, guild))
    }

    pub fn snapshot(&self) -> Vec<((UserId, GuildId), LanguageCode)> {
        self.prefs
            .read()
            .expect("preference lock poisoned")
            .iter()
            .map(|(key, code)| (*key, code.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.prefs.read().expect("preference lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Single point that turns "did the user say what they want?" into a clean
/// code or a clear signal.
///
/// Priority order, first match wins: explicit argument, user-set
/// preference, language role, guild default. Never calls a provider and
/// never fails: unrecognized explicit input comes back as
/// [`TargetLanguage::Unrecognized`], a fully-unresolved context as
/// [`TargetLanguage::Unspecified`].
pub struct TargetResolver {
    directory: Arc<LanguageDirectory>,
    preferences: PreferenceStore,
    guild_defaults: RwLock<HashMap<GuildId, LanguageCode>>,
    roles: Arc<dyn RoleLookup>,
}

impl TargetResolver {
    pub fn new(directory: Arc<LanguageDirectory>, roles: Arc<dyn RoleLookup>) -> Self {
        Self {
            directory,
            preferences: PreferenceStore::new(),
            guild_defaults: RwLock::new(HashMap::new()),
            roles,
        }
    }

    pub async fn resolve(
        &self,
        user: UserId,
        guild: GuildId,
        explicit: Option<&str>,
    ) -> TargetLanguage {
        // An explicit argument always wins; invalid input surfaces as
        // Unrecognized rather than falling through to weaker signals.
        if let Some(raw) = explicit {
            if !raw.trim().is_empty() {
                return match normalize(&self.directory, raw) {
                    TargetLanguage::Resolved(code) => TargetLanguage::Resolved(code),
                    _ => TargetLanguage::Unrecognized,
                };
            }
        }

        if let Some(code) = self.preferences.get(user, guild) {
            return TargetLanguage::Resolved(code);
        }

        let role_codes = self.roles.language_codes(user, guild).await;
        if let Some(first) = role_codes.into_iter().next() {
            return TargetLanguage::Resolved(first);
        }

        match self.guild_default(guild) {
            Some(code) => TargetLanguage::Resolved(code),
            None => TargetLanguage::Unspecified,
        }
    }

    /// Broadcast-path variant: the recipient record already carries its
    /// role-derived languages, so no role lookup round-trip is needed.
    pub fn resolve_recipient(&self, recipient: &Recipient, guild: GuildId) -> TargetLanguage {
        if let Some(code) = self.preferences.get(recipient.id, guild) {
            return TargetLanguage::Resolved(code);
        }
        if let Some(primary) = recipient.primary_language() {
            return TargetLanguage::Resolved(primary.clone());
        }
        match self.guild_default(guild) {
            Some(code) => TargetLanguage::Resolved(code),
            None => {
                debug!("{} has no resolvable target language", recipient.id);
                TargetLanguage::Unspecified
            }
        }
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    pub fn set_guild_default(&self, guild: GuildId, code: LanguageCode) {
        self.guild_defaults
            .write()
            .expect("guild default lock poisoned")
            .insert(guild, code);
    }

    pub fn guild_default(&self, guild: GuildId) -> Option<LanguageCode> {
        self.guild_defaults
            .read()
            .expect("guild default lock poisoned")
            .get(&guild)
            .cloned()
    }

    pub fn directory(&self) -> &LanguageDirectory {
        &self.directory
    }
}
