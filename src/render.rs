//! Message body rendering
//!
//! Plain text is shown verbatim. HTML-only messages are converted to
//! wrapped text: links stay visible as numbered references and tables
//! are flattened into ordinary blocks.

use crate::console::Console;
use crate::error::{Error, Result};
use crate::message::{BodyKind, Message};
use tracing::debug;

/// Shown for a message with neither a plain nor an HTML part.
pub const NO_CONTENT: &str = "[No displayable content]";

/// Convert an HTML body to readable text at `width` columns.
///
/// # Errors
///
/// [`Error::Render`] if the converter fails.
pub fn html_to_text(html: &str, width: usize) -> Result<String> {
    html2text::config::plain()
        .raw_mode(true)
        .no_table_borders()
        .string_from_read(html.as_bytes(), width)
        .map_err(|e| Error::Render(e.to_string()))
}

/// The text to show for `message`, picking plain over HTML.
///
/// # Errors
///
/// [`Error::Render`] if an HTML body cannot be converted.
pub fn body_text(message: &Message, width: usize) -> Result<String> {
    let Some(part) = message.preferred_body() else {
        return Ok(NO_CONTENT.to_string());
    };

    debug!(
        "Rendering UID {} as {}",
        message.uid,
        part.kind.content_type()
    );
    match part.kind {
        BodyKind::Plain => Ok(part.content.clone()),
        BodyKind::Html => html_to_text(&part.content, width),
    }
}

/// Clear the screen and print the body of `message`.
///
/// # Errors
///
/// Nothing is printed if the body cannot be rendered.
pub fn show<C: Console>(message: &Message, width: usize, console: &mut C) -> Result<()> {
    let text = body_text(message, width)?;
    console.clear_screen();
    console.say(&text);
    Ok(())
}
