//! Core data model for the polyglot translation subsystem.
//!
//! This crate holds the language directory (canonical codes, aliases, flag
//! emojis, per-provider capability sets), the normalizer that turns free-form
//! user input into canonical codes, and the request/result types shared by
//! the provider adapters and the orchestration engine.

pub mod directory;
pub mod errors;
pub mod models;
pub mod normalize;

pub use directory::{LanguageDirectory, LanguageEntry};
pub use errors::{CoreError, CoreResult, DeliveryError};
pub use normalize::normalize;
