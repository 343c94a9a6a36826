//! UID SEARCH command handler.
//!
//! The viewer only ever searches `ALL`, so that is the one key that
//! matches. `NOT`, `AND` and `OR` combine as usual; any other key is
//! answered with `BAD` so an unexpected query shows up in tests.
//!
//! The response format (RFC 3501 Section 7.2.5):
//!
//! ```text
//! * SEARCH 1 2 3
//! A0003 OK SEARCH completed
//! ```

use crate::fake_imap::io::write_line;
use crate::fake_imap::mailbox::Mailbox;
use imap_codec::imap_types::search::SearchKey;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

/// Handle the UID SEARCH command. Returns matching UIDs from the
/// selected folder.
pub async fn handle_uid_search<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    criteria: &[SearchKey<'_>],
    mailbox: &Mailbox,
    selected_folder: Option<&str>,
    stream: &mut BufReader<S>,
) {
    let Some(folder_name) = selected_folder else {
        let resp = format!("{tag} BAD No folder selected\r\n");
        let _ = write_line(stream, &resp).await;
        return;
    };

    let Some(folder) = mailbox.get_folder(folder_name) else {
        let resp = format!("{tag} BAD Folder not found\r\n");
        let _ = write_line(stream, &resp).await;
        return;
    };

    let Some(matched) = criteria
        .iter()
        .map(evaluate)
        .try_fold(true, |acc, m| m.map(|m| acc && m))
    else {
        let resp = format!("{tag} BAD Unsupported search key\r\n");
        let _ = write_line(stream, &resp).await;
        return;
    };

    let uids: Vec<String> = if matched {
        folder.emails.iter().map(|e| e.uid.to_string()).collect()
    } else {
        Vec::new()
    };

    // An empty result is still a SEARCH line.
    let search_line = format!("* SEARCH {}\r\n", uids.join(" "));
    let _ = write_line(stream, &search_line).await;
    let resp = format!("{tag} OK SEARCH completed\r\n");
    let _ = write_line(stream, &resp).await;
}

/// Whether `key` matches the messages. `None` for unsupported keys.
fn evaluate(key: &SearchKey<'_>) -> Option<bool> {
    match key {
        SearchKey::All => Some(true),
        SearchKey::Not(k) => evaluate(k).map(|m| !m),
        SearchKey::And(keys) => keys
            .as_ref()
            .iter()
            .map(evaluate)
            .try_fold(true, |acc, m| m.map(|m| acc && m)),
        SearchKey::Or(a, b) => Some(evaluate(a)? || evaluate(b)?),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_imap::mailbox::MailboxBuilder;
    use tokio::io::BufReader;

    fn make_raw_email() -> Vec<u8> {
        b"From: a@b.com\r\nSubject: Test\r\n\r\nBody".to_vec()
    }

    async fn run(
        tag: &str,
        criteria: &[SearchKey<'_>],
        mailbox: &Mailbox,
        selected: Option<&str>,
    ) -> String {
        let (client, server) = tokio::io::duplex(4096);
        let mut stream = BufReader::new(server);

        handle_uid_search(tag, criteria, mailbox, selected, &mut stream).await;
        drop(stream);

        let mut buf = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut BufReader::new(client), &mut buf)
            .await
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn all_returns_every_uid_in_folder_order() {
        let raw = make_raw_email();
        let mailbox = MailboxBuilder::new()
            .folder("INBOX")
            .email(7, &raw)
            .email(3, &raw)
            .folder("Sent")
            .email(9, &raw)
            .build();

        let output = run("A1", &[SearchKey::All], &mailbox, Some("INBOX")).await;

        assert!(output.starts_with("* SEARCH 7 3\r\n"));
        assert!(output.ends_with("A1 OK SEARCH completed\r\n"));
    }

    #[tokio::test]
    async fn empty_folder_sends_empty_search_line() {
        let mailbox = MailboxBuilder::new().folder("INBOX").build();
        let output = run("A1", &[SearchKey::All], &mailbox, Some("INBOX")).await;
        assert!(output.starts_with("* SEARCH \r\n"));
    }

    #[tokio::test]
    async fn not_all_matches_nothing() {
        let raw = make_raw_email();
        let mailbox = MailboxBuilder::new().folder("INBOX").email(1, &raw).build();
        let key = SearchKey::Not(Box::new(SearchKey::All));

        let output = run("A1", &[key], &mailbox, Some("INBOX")).await;

        assert!(output.starts_with("* SEARCH \r\n"));
    }

    #[tokio::test]
    async fn unsupported_key_is_bad() {
        let mailbox = MailboxBuilder::new().folder("INBOX").build();
        let output = run("A1", &[SearchKey::Seen], &mailbox, Some("INBOX")).await;
        assert_eq!(output, "A1 BAD Unsupported search key\r\n");
    }

    #[tokio::test]
    async fn no_folder_selected_returns_bad() {
        let mailbox = MailboxBuilder::new().folder("INBOX").build();
        let output = run("A1", &[SearchKey::All], &mailbox, None).await;
        assert!(output.contains("A1 BAD No folder selected"));
    }
}
