//! Error types for email-viewer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IMAP error: {0}")]
    Imap(String),

    #[error("Unable to resolve {host}: {reason}")]
    Resolve { host: String, reason: String },

    #[error("Authentication rejected: {0}")]
    Auth(String),

    #[error("Mailbox listing error: {0}")]
    Listing(String),

    #[error("Rendering error: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("Gave up after {attempts} attempt(s): {last}")]
    RetriesExhausted { attempts: u32, last: Box<Error> },

    #[error("Input closed")]
    Interrupted,
}

impl Error {
    /// The server address could not be turned into a reachable host.
    #[must_use]
    pub const fn is_resolve(&self) -> bool {
        matches!(self, Self::Resolve { .. })
    }

    /// The server answered LOGIN with a rejection.
    #[must_use]
    pub const fn is_auth_rejected(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// The user closed input (end-of-file) at a prompt.
    #[must_use]
    pub const fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
