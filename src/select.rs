//! Interactive mailbox and message selection
//!
//! Lists are shown 1-indexed. A mailbox can be picked by name
//! (case-insensitive) or by number; empty input picks the inbox when
//! there is one. Messages are picked by number only.

use crate::console::Console;
use crate::error::{Error, Result};
use crate::mailbox::Mailbox;
use crate::message::Message;
use std::num::IntErrorKind;
use thiserror::Error;

pub const MESSAGE_PROMPT: &str = "Please choose a message: ";

/// Why a line of input did not select anything. `Display` is the
/// message shown before re-prompting.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Please enter a folder name or number")]
    NoDefault,

    #[error("{0} is not a valid folder name or number")]
    NotAFolder(String),

    #[error("{0} is not a valid folder number")]
    FolderOutOfRange(String),

    #[error("{0} is not a message number")]
    NotAMessage(String),
}

enum Index {
    Valid(usize),
    OutOfRange,
    NotANumber,
}

/// Interpret `input` as a 1-based position in a list of `len` items,
/// returning the 0-based index.
fn parse_index(input: &str, len: usize) -> Index {
    match input.trim().parse::<i128>() {
        Ok(n) => usize::try_from(n)
            .ok()
            .filter(|n| (1..=len).contains(n))
            .map_or(Index::OutOfRange, |n| Index::Valid(n - 1)),
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            Index::OutOfRange
        }
        Err(_) => Index::NotANumber,
    }
}

/// 1-based position of the first mailbox named "inbox", if any.
#[must_use]
pub fn default_mailbox_index(mailboxes: &[Mailbox]) -> Option<usize> {
    mailboxes.iter().position(Mailbox::is_inbox).map(|i| i + 1)
}

/// Prompt text for mailbox selection.
#[must_use]
pub fn mailbox_prompt(default: Option<usize>) -> String {
    default.map_or_else(
        || "Please choose a folder: ".to_string(),
        |i| format!("Please choose a folder [default={i}]: "),
    )
}

/// Resolve one line of input against `mailboxes`.
///
/// Empty input selects `default` (1-based). Otherwise a
/// case-insensitive name match wins over a numeric index.
///
/// # Errors
///
/// The [`SelectionError`] to show before prompting again.
pub fn resolve_mailbox<'a>(
    mailboxes: &'a [Mailbox],
    default: Option<usize>,
    input: &str,
) -> std::result::Result<&'a Mailbox, SelectionError> {
    if input.is_empty() {
        return default
            .and_then(|i| mailboxes.get(i.wrapping_sub(1)))
            .ok_or(SelectionError::NoDefault);
    }

    if let Some(mailbox) = mailboxes.iter().find(|m| m.matches(input)) {
        return Ok(mailbox);
    }

    match parse_index(input, mailboxes.len()) {
        Index::Valid(i) => Ok(&mailboxes[i]),
        Index::OutOfRange => Err(SelectionError::FolderOutOfRange(input.to_string())),
        Index::NotANumber => Err(SelectionError::NotAFolder(input.to_string())),
    }
}

/// Resolve one line of input to a message.
///
/// # Errors
///
/// [`SelectionError::NotAMessage`] unless `input` is a number from 1
/// to the message count.
pub fn resolve_message<'a>(
    messages: &'a [Message],
    input: &str,
) -> std::result::Result<&'a Message, SelectionError> {
    match parse_index(input, messages.len()) {
        Index::Valid(i) => Ok(&messages[i]),
        Index::OutOfRange | Index::NotANumber => {
            Err(SelectionError::NotAMessage(input.to_string()))
        }
    }
}

/// Print `N: name` for every mailbox.
pub fn print_mailboxes<C: Console>(mailboxes: &[Mailbox], console: &mut C) {
    for (i, mailbox) in mailboxes.iter().enumerate() {
        console.say(&format!("{}: {}", i + 1, mailbox));
    }
}

/// Print one summary line per message.
pub fn print_summaries<C: Console>(messages: &[Message], console: &mut C) {
    for (i, message) in messages.iter().enumerate() {
        console.say(&message.summary(i + 1).to_string());
    }
}

/// Prompt until a mailbox is chosen.
///
/// # Errors
///
/// [`Error::Listing`] if `mailboxes` is empty, or whatever the console
/// returns (end-of-input is [`Error::Interrupted`]).
pub async fn choose_mailbox<'a, C: Console>(
    mailboxes: &'a [Mailbox],
    console: &mut C,
) -> Result<&'a Mailbox> {
    if mailboxes.is_empty() {
        return Err(Error::Listing("The server reported no mailboxes".into()));
    }

    let default = default_mailbox_index(mailboxes);
    let prompt = mailbox_prompt(default);
    loop {
        let input = console.read_line(&prompt).await?;
        match resolve_mailbox(mailboxes, default, &input) {
            Ok(mailbox) => return Ok(mailbox),
            Err(e) => console.say(&e.to_string()),
        }
    }
}

/// Prompt until a valid message number is entered.
///
/// # Errors
///
/// Only what the console returns.
pub async fn choose_message<'a, C: Console>(
    messages: &'a [Message],
    console: &mut C,
) -> Result<&'a Message> {
    loop {
        let input = console.read_line(MESSAGE_PROMPT).await?;
        match resolve_message(messages, &input) {
            Ok(message) => return Ok(message),
            Err(e) => console.say(&e.to_string()),
        }
    }
}
