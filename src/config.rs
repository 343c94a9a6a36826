//! Viewer configuration
//!
//! Credentials come from the environment (optionally via a `.env`
//! file) and any missing piece is prompted for later by
//! [`crate::credentials`]. Behavioral switches live in
//! [`ViewerOptions`].

use crate::error::{Error, Result};
use std::env;
use std::fmt;
use std::num::NonZeroU32;

/// Standard port for IMAP over implicit TLS.
pub const DEFAULT_PORT: u16 = 993;

/// Column width used when converting HTML bodies to text.
pub const DEFAULT_WRAP_WIDTH: usize = 78;

/// A password held in memory for the session only.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The plaintext, for handing to LOGIN.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Fully resolved connection credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Password,
}

/// Credential values supplied up front. Unset fields get prompted for.
///
/// `port` stays a raw string so that a bad value from the environment
/// goes through the same validation as typed input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvCredentials {
    pub host: Option<String>,
    pub port: Option<String>,
    pub username: Option<String>,
    pub password: Option<Password>,
}

impl EnvCredentials {
    /// Load credentials from environment variables
    ///
    /// Reads from `.env` file if present. Recognized variables, all
    /// optional:
    /// - `URL` (server address)
    /// - `PORT` (default: `993`)
    /// - `USERNAME`
    /// - `PASSWORD`
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            host: get("URL"),
            port: get("PORT"),
            username: get("USERNAME"),
            password: get("PASSWORD").map(Password::new),
        }
    }
}

/// How many times a recoverable step (connect, login) may be tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    /// Keep asking until it works or the user quits.
    #[default]
    Unbounded,
    /// Give up after this many attempts in total.
    Bounded(NonZeroU32),
}

impl RetryPolicy {
    /// A bounded policy. Zero is treated as a single attempt.
    #[must_use]
    pub const fn bounded(max_attempts: u32) -> Self {
        match NonZeroU32::new(max_attempts) {
            Some(max) => Self::Bounded(max),
            None => Self::Bounded(NonZeroU32::MIN),
        }
    }

    /// Whether another attempt is allowed after `attempts_made` failures.
    #[must_use]
    pub const fn allows_another(self, attempts_made: u32) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Bounded(max) => attempts_made < max.get(),
        }
    }
}

/// Server certificate handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsMode {
    /// Verify against the Mozilla root set.
    #[default]
    Verified,
    /// Accept any certificate (self-signed local bridges, test servers).
    AcceptInvalidCerts,
}

/// Switches that distinguish otherwise identical viewer setups.
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    /// Print the welcome banner before prompting.
    pub banner: bool,
    pub connect_retry: RetryPolicy,
    pub login_retry: RetryPolicy,
    pub tls: TlsMode,
    /// Wrap width for HTML-to-text conversion.
    pub wrap_width: usize,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            banner: true,
            connect_retry: RetryPolicy::Unbounded,
            login_retry: RetryPolicy::Unbounded,
            tls: TlsMode::Verified,
            wrap_width: DEFAULT_WRAP_WIDTH,
        }
    }
}

impl ViewerOptions {
    /// Default options, with `TLS_ACCEPT_INVALID_CERTS` applied.
    ///
    /// Call after [`EnvCredentials::from_env`] so `.env` is loaded.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if `TLS_ACCEPT_INVALID_CERTS` is not a boolean.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// [`ViewerOptions::from_env`] over an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if `TLS_ACCEPT_INVALID_CERTS` is not a boolean.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut options = Self::default();
        if let Some(value) = lookup("TLS_ACCEPT_INVALID_CERTS") {
            if parse_flag(&value)
                .map_err(|e| Error::Config(format!("Invalid TLS_ACCEPT_INVALID_CERTS: {e}")))?
            {
                options.tls = TlsMode::AcceptInvalidCerts;
            }
        }
        Ok(options)
    }
}

fn parse_flag(value: &str) -> std::result::Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        other => Err(format!("expected a boolean, got '{other}'")),
    }
}
