//! Credential resolution
//!
//! Fills in whatever [`EnvCredentials`] left unset by prompting on the
//! [`Console`]. The password prompt never echoes.

use crate::config::{Credentials, DEFAULT_PORT, EnvCredentials, Password};
use crate::console::Console;
use crate::error::Result;
use std::num::IntErrorKind;
use thiserror::Error;
use tracing::debug;

pub const URL_PROMPT: &str = "Enter IMAP URL: ";
pub const PORT_PROMPT: &str = "Enter IMAP PORT (default=993): ";
pub const USERNAME_PROMPT: &str = "Enter username: ";
pub const PASSWORD_PROMPT: &str = "Enter password (password will not be shown on screen): ";

/// Why a port string was rejected. `Display` is the user-facing message.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PortError {
    #[error("{0} is not an integer")]
    NotAnInteger(String),

    #[error("{0} is not a valid port")]
    OutOfRange(String),
}

/// Parse a port as typed by the user.
///
/// Empty input means [`DEFAULT_PORT`]. Anything else must be an
/// integer in `0..=65535`.
///
/// # Errors
///
/// [`PortError`] describing why the input is not a usable port.
pub fn parse_port(input: &str) -> std::result::Result<u16, PortError> {
    if input.is_empty() {
        return Ok(DEFAULT_PORT);
    }

    let trimmed = input.trim();
    match trimmed.parse::<i128>() {
        Ok(n) => u16::try_from(n).map_err(|_| PortError::OutOfRange(n.to_string())),
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            Err(PortError::OutOfRange(trimmed.to_string()))
        }
        Err(_) => Err(PortError::NotAnInteger(input.to_string())),
    }
}

/// Resolve every credential, prompting for the ones not supplied.
///
/// # Errors
///
/// Only what the console returns.
pub async fn resolve<C: Console>(supplied: EnvCredentials, console: &mut C) -> Result<Credentials> {
    let host = match supplied.host {
        Some(host) => host,
        None => prompt_address(console).await?,
    };

    let from_env = supplied.port.and_then(|raw| match parse_port(&raw) {
        Ok(port) => Some(port),
        Err(e) => {
            console.say(&e.to_string());
            None
        }
    });
    let port = match from_env {
        Some(port) => port,
        None => prompt_port(console).await?,
    };

    let username = match supplied.username {
        Some(username) => username,
        None => console.read_line(USERNAME_PROMPT).await?,
    };

    let password = match supplied.password {
        Some(password) => password,
        None => Password::new(console.read_secret(PASSWORD_PROMPT).await?),
    };

    debug!("Resolved credentials for {}@{}:{}", username, host, port);
    Ok(Credentials {
        host,
        port,
        username,
        password,
    })
}

/// Ask for the server address.
///
/// # Errors
///
/// Only what the console returns.
pub async fn prompt_address<C: Console>(console: &mut C) -> Result<String> {
    console.read_line(URL_PROMPT).await
}

/// Ask for a port until a valid one is entered.
///
/// # Errors
///
/// Only what the console returns.
pub async fn prompt_port<C: Console>(console: &mut C) -> Result<u16> {
    loop {
        let input = console.read_line(PORT_PROMPT).await?;
        match parse_port(&input) {
            Ok(port) => return Ok(port),
            Err(e) => console.say(&e.to_string()),
        }
    }
}

/// Ask for a fresh username and password pair.
///
/// # Errors
///
/// Only what the console returns.
pub async fn prompt_login<C: Console>(console: &mut C) -> Result<(String, Password)> {
    let username = console.read_line(USERNAME_PROMPT).await?;
    let password = Password::new(console.read_secret(PASSWORD_PROMPT).await?);
    Ok((username, password))
}
