use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("failed to load language directory: {0}")]
    DirectoryLoad(String),

    #[error("invalid language directory: {0}")]
    DirectoryInvalid(String),

    #[error("unrecognized language input: {0}")]
    UnknownLanguage(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("no host platform attached: {0}")]
    HostNotAttached(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Failure delivering a message to one recipient or channel on the host
/// platform. Recorded per recipient; never aborts a broadcast.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("recipient has direct messages disabled")]
    DmsDisabled,

    #[error("recipient has blocked the bot")]
    Blocked,

    #[error("platform error: {0}")]
    Platform(String),
}
