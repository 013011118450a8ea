//! Orchestration engine for the polyglot translation subsystem.
//!
//! Ties the provider tiers together: the LRU+TTL translation cache, the
//! tiered orchestrator, the target resolver with its preference store, and
//! the broadcast fan-out. Host-platform integration (role lookup, member
//! enumeration, DM delivery, channel alerts) is injected through the traits
//! in [`host`].

pub mod broadcast;
pub mod cache;
pub mod detect;
pub mod host;
pub mod orchestrator;
pub mod resolver;

pub use broadcast::{BroadcastRequest, BroadcastSettings, Broadcaster};
pub use cache::{CacheKey, TranslationCache};
pub use host::{ChannelAlerter, DirectMessenger, HostPlatform, RecipientSource, RoleLookup};
pub use orchestrator::{Orchestrator, RetryPolicy};
pub use resolver::{PreferenceStore, TargetResolver};
