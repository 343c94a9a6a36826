//! Terminal email viewer over IMAP
//!
//! Connects to a mail server over implicit TLS, logs in, lists the
//! mailboxes, and lets the user page through message summaries and
//! read message bodies in the terminal. HTML-only messages are
//! converted to text.
//!
//! Everything the user sees or types goes through a [`Console`], so
//! the whole loop can be driven by [`ScriptedConsole`] in tests.

mod client;
mod config;
mod connection;
mod console;
pub mod credentials;
mod error;
mod mailbox;
mod message;
pub mod render;
pub mod select;
mod terminal;
mod viewer;

pub use client::MailClient;
pub use config::{
    Credentials, DEFAULT_PORT, DEFAULT_WRAP_WIDTH, EnvCredentials, Password, RetryPolicy, TlsMode,
    ViewerOptions,
};
pub use connection::{ImapClient, ImapSession};
pub use console::{CLEAR_SCREEN, Console, ScriptedConsole, StdConsole};
pub use error::{Error, Result};
pub use mailbox::{Mailbox, parse_list_line, parse_list_response};
pub use message::{BODY_PREFERENCE, BodyKind, BodyPart, Message, MessageSummary};
pub use viewer::{BANNER, FAREWELL, Viewer, say_goodbye};
