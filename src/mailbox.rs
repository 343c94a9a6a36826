//! Mailbox names and the LIST entry parser
//!
//! [`crate::MailClient::list_mailboxes`] hands the raw LIST response
//! to [`parse_list_response`]. Each entry looks like
//!
//! ```text
//! * LIST (\HasNoChildren) "/" "Sent Items"
//! ```
//!
//! and the mailbox name is the last field: a quoted string, a bare
//! atom (`INBOX` is often sent unquoted), or a counted literal whose
//! bytes follow on the next line.

use crate::error::{Error, Result};
use std::fmt;

/// A mailbox (folder) on the server, e.g. `INBOX` or `Sent`.
///
/// # Examples
///
/// ```
/// use email_viewer::Mailbox;
///
/// let inbox = Mailbox::new("Inbox");
/// assert!(inbox.is_inbox());
/// assert!(inbox.matches("INBOX"));
/// assert_eq!(inbox.to_string(), "Inbox");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mailbox(String);

impl Mailbox {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name as the server reported it.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }

    /// INBOX is case-insensitive (RFC 3501).
    #[must_use]
    pub fn is_inbox(&self) -> bool {
        self.0.eq_ignore_ascii_case("inbox")
    }

    /// Case-insensitive comparison against user input.
    #[must_use]
    pub fn matches(&self, input: &str) -> bool {
        self.0.to_lowercase() == input.to_lowercase()
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Mailbox {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for Mailbox {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

const LIST_PREFIX: &str = "* LIST ";

/// Parse every `* LIST` entry in a raw LIST response.
///
/// Other untagged lines are skipped. Order is preserved.
///
/// # Errors
///
/// Returns [`Error::Listing`] if any entry is malformed or a literal
/// is cut off.
pub fn parse_list_response(raw: &[u8]) -> Result<Vec<Mailbox>> {
    let text = String::from_utf8_lossy(raw);
    let mut lines = text.split("\r\n").flat_map(|l| l.split('\n'));
    let mut mailboxes = Vec::new();

    while let Some(line) = lines.next() {
        if !is_list_line(line) {
            continue;
        }
        match literal_length(line) {
            Some(len) => {
                let next = lines
                    .next()
                    .ok_or_else(|| Error::Listing(format!("Missing literal after: {line}")))?;
                // Literal lengths count bytes.
                let name = next.get(..len).ok_or_else(|| {
                    Error::Listing(format!("Literal of {len} bytes does not fit: {next}"))
                })?;
                mailboxes.push(Mailbox::new(name));
            }
            None => mailboxes.push(parse_list_line(line)?),
        }
    }

    Ok(mailboxes)
}

/// Extract the mailbox name from one LIST entry.
///
/// Accepts the untagged form (`* LIST (...) "/" "Name"`) or the bare
/// entry (`(...) "/" "Name"`). A trailing quoted string yields its
/// unescaped contents; otherwise the trailing atom is the name.
///
/// # Errors
///
/// Returns [`Error::Listing`] when no name can be found.
pub fn parse_list_line(line: &str) -> Result<Mailbox> {
    let malformed = || Error::Listing(format!("Malformed LIST entry: {line}"));

    let entry = line.trim_end_matches(['\r', '\n']);
    let entry = if is_list_line(entry) {
        &entry[LIST_PREFIX.len()..]
    } else {
        entry
    };
    let entry = entry.trim_end();

    let name = if entry.ends_with('"') {
        last_quoted(entry).ok_or_else(malformed)?
    } else {
        let atom = entry.rsplit(char::is_whitespace).next().unwrap_or_default();
        if atom.is_empty() || atom.contains(['(', ')', '"', '{']) || atom.eq_ignore_ascii_case("NIL")
        {
            return Err(malformed());
        }
        atom.to_string()
    };

    if name.is_empty() {
        return Err(malformed());
    }
    Ok(Mailbox::new(name))
}

fn is_list_line(line: &str) -> bool {
    line.get(..LIST_PREFIX.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(LIST_PREFIX))
}

/// `{12}` at the end of a line announces a 12-byte literal.
fn literal_length(line: &str) -> Option<usize> {
    let body = line.trim_end().strip_suffix('}')?;
    let open = body.rfind('{')?;
    body[open + 1..].parse().ok()
}

/// Contents of the quoted string that closes `entry`, unescaped.
///
/// Returns `None` when quoting is unbalanced or the final quote does
/// not close a string.
fn last_quoted(entry: &str) -> Option<String> {
    let mut last: Option<(String, usize)> = None;
    let mut chars = entry.char_indices();

    while let Some((_, c)) = chars.next() {
        if c != '"' {
            continue;
        }
        let mut content = String::new();
        let mut closed_at = None;
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => content.push(chars.next()?.1),
                '"' => {
                    closed_at = Some(i);
                    break;
                }
                other => content.push(other),
            }
        }
        last = Some((content, closed_at?));
    }

    let (content, end) = last?;
    (end + 1 == entry.len()).then_some(content)
}
