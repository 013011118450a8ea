//! Seam between the translation engine and the chat platform.
//!
//! The platform client is an external collaborator; the engine only ever
//! sees these four capabilities, injected at construction. No module-level
//! instances.

use async_trait::async_trait;

use polyglot_core::errors::DeliveryError;
use polyglot_core::models::{ChannelId, GuildId, LanguageCode, Recipient, UserId};

/// Language codes derived from a member's language roles, in role order.
#[async_trait]
pub trait RoleLookup: Send + Sync {
    async fn language_codes(&self, user: UserId, guild: GuildId) -> Vec<LanguageCode>;
}

#[async_trait]
pub trait RecipientSource: Send + Sync {
    async fn list_guild_recipients(&self, guild: GuildId) -> Vec<Recipient>;
}

#[async_trait]
pub trait DirectMessenger: Send + Sync {
    async fn send_direct_message(&self, recipient: UserId, text: &str)
        -> Result<(), DeliveryError>;
}

#[async_trait]
pub trait ChannelAlerter: Send + Sync {
    async fn emit_channel_alert(&self, channel: ChannelId, text: &str)
        -> Result<(), DeliveryError>;
}

/// Everything the broadcaster needs from the platform, in one object.
pub trait HostPlatform: RoleLookup + RecipientSource + DirectMessenger + ChannelAlerter {}

impl<T: RoleLookup + RecipientSource + DirectMessenger + ChannelAlerter> HostPlatform for T {}
