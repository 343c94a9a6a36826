//! IMAP mail client
//!
//! Owns the one authenticated session of a viewer run and exposes the
//! two reads the viewer needs: the mailbox list and the full contents
//! of one mailbox.

use crate::config::{Credentials, ViewerOptions};
use crate::connection::{self, ImapSession};
use crate::console::Console;
use crate::error::{Error, Result};
use crate::mailbox::{Mailbox, parse_list_response};
use crate::message::Message;
use futures::StreamExt;
use tracing::{debug, info};

/// Read-only IMAP client over a single session.
pub struct MailClient {
    session: ImapSession,
}

impl MailClient {
    #[must_use]
    pub const fn new(session: ImapSession) -> Self {
        Self { session }
    }

    /// Connect and log in, re-prompting on `console` for a new address
    /// or new credentials as `options` allows.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or login fails for a reason
    /// that is not retried, or retries run out.
    pub async fn open<C: Console>(
        credentials: Credentials,
        options: &ViewerOptions,
        console: &mut C,
    ) -> Result<Self> {
        let Credentials {
            host,
            port,
            username,
            password,
        } = credentials;

        let (client, host) =
            connection::connect(host, port, options.tls, options.connect_retry, console).await?;
        debug!("Session established with {}", host);

        let session =
            connection::login(client, username, password, options.login_retry, console).await?;
        Ok(Self::new(session))
    }

    /// List all mailboxes, in server order.
    ///
    /// The raw LIST response goes through [`parse_list_response`], so
    /// names arrive exactly as the server quoted them.
    ///
    /// # Errors
    ///
    /// Returns an error if the LIST command fails or any of its entries
    /// is malformed.
    pub async fn list_mailboxes(&mut self) -> Result<Vec<Mailbox>> {
        let raw = self
            .session
            .run_command_and_read_response(r#"LIST "" "*""#)
            .await
            .map_err(|e| Error::Imap(format!("List mailboxes failed: {e}")))?;

        let mailboxes = parse_list_response(&raw)?;
        info!("Found {} mailboxes", mailboxes.len());
        Ok(mailboxes)
    }

    /// Fetch and parse every message in `mailbox`.
    ///
    /// Messages come back in ascending UID order. Nothing is cached:
    /// each call re-reads the whole mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if SELECT, SEARCH, or any FETCH fails.
    pub async fn fetch_messages(&mut self, mailbox: &Mailbox) -> Result<Vec<Message>> {
        connection::select(&mut self.session, mailbox.name()).await?;

        let uids = self
            .session
            .uid_search("ALL")
            .await
            .map_err(|e| Error::Imap(format!("Search failed: {e}")))?;

        let mut uid_list: Vec<u32> = uids.into_iter().collect();
        uid_list.sort_unstable();

        if uid_list.is_empty() {
            return Ok(vec![]);
        }

        info!("Fetching {} messages from {}", uid_list.len(), mailbox);

        let mut messages = Vec::with_capacity(uid_list.len());
        for uid in uid_list {
            messages.push(self.fetch_single(uid).await?);
        }
        Ok(messages)
    }

    /// Send LOGOUT and close the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the server does not acknowledge LOGOUT.
    pub async fn logout(mut self) -> Result<()> {
        self.session
            .logout()
            .await
            .map_err(|e| Error::Imap(format!("Logout failed: {e}")))?;
        debug!("Logged out");
        Ok(())
    }

    async fn fetch_single(&mut self, uid: u32) -> Result<Message> {
        let uid_set = format!("{uid}");
        let mut fetches = self
            .session
            .uid_fetch(&uid_set, "(BODY.PEEK[])")
            .await
            .map_err(|e| Error::Imap(format!("Fetch failed: {e}")))?;

        let mut raw = None;
        while let Some(fetch) = fetches.next().await {
            let fetch = fetch.map_err(|e| Error::Imap(format!("Fetch error: {e}")))?;
            if raw.is_none() {
                raw = fetch.body().map(<[u8]>::to_vec);
            }
        }
        drop(fetches);

        raw.map(|body| Message::parse(uid, &body))
            .ok_or_else(|| Error::Imap(format!("No body found for UID {uid}")))
    }
}
