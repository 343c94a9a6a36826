//! Parsed messages
//!
//! A [`Message`] is decoded from the raw RFC 5322 bytes of a FETCH and
//! keeps only what the viewer shows: the `From` and `Subject` headers
//! and the readable body parts.

use mail_parser::{Address, Addr, MessageParser, MimeHeaders, PartType};
use std::fmt;
use tracing::warn;

/// Content type of a readable body part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Plain,
    Html,
}

impl BodyKind {
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Plain => "text/plain",
            Self::Html => "text/html",
        }
    }
}

/// Body preference when showing a message: plain text wins over HTML.
pub const BODY_PREFERENCE: [BodyKind; 2] = [BodyKind::Plain, BodyKind::Html];

/// One readable chunk of a message, already transfer-decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyPart {
    pub kind: BodyKind,
    pub content: String,
}

/// An email with its headers of interest and readable parts in MIME order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub uid: u32,
    /// Decoded `From` header, e.g. `Jane Doe <jane@x.com>`.
    pub from: String,
    pub subject: String,
    pub parts: Vec<BodyPart>,
}

impl Message {
    /// Parse a raw message leniently.
    ///
    /// Never fails: bytes that are not a parseable message become a
    /// header-less message whose only part is the raw text.
    #[must_use]
    pub fn parse(uid: u32, raw: &[u8]) -> Self {
        let Some(parsed) = MessageParser::default().parse(raw) else {
            warn!("UID {} is not a parseable message, showing raw text", uid);
            return Self {
                uid,
                from: String::new(),
                subject: String::new(),
                parts: vec![BodyPart {
                    kind: BodyKind::Plain,
                    content: String::from_utf8_lossy(raw).into_owned(),
                }],
            };
        };

        let from = parsed.from().map(format_address).unwrap_or_default();
        let subject = parsed.subject().unwrap_or_default().to_string();

        let parts = parsed
            .parts
            .iter()
            .filter(|part| !part.content_disposition().is_some_and(|d| d.is_attachment()))
            .filter_map(|part| match &part.body {
                PartType::Html(html) => Some(BodyPart {
                    kind: BodyKind::Html,
                    content: html.to_string(),
                }),
                PartType::Text(text) if is_plain(part.content_type()) => Some(BodyPart {
                    kind: BodyKind::Plain,
                    content: text.to_string(),
                }),
                _ => None,
            })
            .collect();

        Self {
            uid,
            from,
            subject,
            parts,
        }
    }

    /// The first part matching the earliest kind in `preference`.
    #[must_use]
    pub fn body(&self, preference: &[BodyKind]) -> Option<&BodyPart> {
        preference
            .iter()
            .find_map(|kind| self.parts.iter().find(|part| part.kind == *kind))
    }

    /// [`Message::body`] with [`BODY_PREFERENCE`].
    #[must_use]
    pub fn preferred_body(&self) -> Option<&BodyPart> {
        self.body(&BODY_PREFERENCE)
    }

    /// The `From` header up to the address in angle brackets.
    #[must_use]
    pub fn sender_name(&self) -> &str {
        self.from.split(" <").next().unwrap_or_default()
    }

    /// Display line for this message at 1-based `index`.
    #[must_use]
    pub fn summary(&self, index: usize) -> MessageSummary<'_> {
        MessageSummary {
            index,
            sender: self.sender_name(),
            subject: &self.subject,
        }
    }
}

/// One line of a message listing: `1: Jane Doe: Hi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageSummary<'a> {
    pub index: usize,
    pub sender: &'a str,
    pub subject: &'a str,
}

impl fmt::Display for MessageSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.index, self.sender, self.subject)
    }
}

fn is_plain(content_type: Option<&mail_parser::ContentType<'_>>) -> bool {
    content_type.is_none_or(|ct| {
        ct.ctype().eq_ignore_ascii_case("text")
            && ct.subtype().is_none_or(|sub| sub.eq_ignore_ascii_case("plain"))
    })
}

fn format_address(address: &Address<'_>) -> String {
    let addrs: Vec<&Addr<'_>> = match address {
        Address::List(list) => list.iter().collect(),
        Address::Group(groups) => groups.iter().flat_map(|g| g.addresses.iter()).collect(),
    };

    addrs
        .iter()
        .map(|addr| match (addr.name.as_deref(), addr.address.as_deref()) {
            (Some(name), Some(email)) => format!("{name} <{email}>"),
            (Some(name), None) => name.to_string(),
            (None, Some(email)) => email.to_string(),
            (None, None) => String::new(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
