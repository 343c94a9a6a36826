//! The interactive session loop
//!
//! One run goes credentials -> connect -> login -> list mailboxes, then
//! cycles mailbox -> message -> body until input ends. End of input at
//! any prompt is a normal exit: the session is logged out and the
//! farewell printed.

use crate::client::MailClient;
use crate::config::{EnvCredentials, ViewerOptions};
use crate::console::Console;
use crate::credentials;
use crate::error::{Error, Result};
use crate::render;
use crate::select;
use tracing::{debug, warn};

pub const BANNER: [&str; 3] = [
    "Welcome to email viewer!",
    "Here, you can view all of your email in a convenient terminal interface.",
    "Press CTRL+D or CTRL+C to exit the program",
];

pub const FAREWELL: &str = "Goodbye!";

/// Print the parting lines shown on every clean exit.
pub fn say_goodbye<C: Console>(console: &mut C) {
    console.say("");
    console.say(FAREWELL);
}

/// Drives one interactive viewer session.
pub struct Viewer {
    options: ViewerOptions,
}

impl Viewer {
    #[must_use]
    pub const fn new(options: ViewerOptions) -> Self {
        Self { options }
    }

    /// Run until the user closes input.
    ///
    /// # Errors
    ///
    /// Only failures that are not recovered by re-prompting: network
    /// or protocol errors, exhausted retries, malformed server data.
    pub async fn run<C: Console>(&self, supplied: EnvCredentials, console: &mut C) -> Result<()> {
        if self.options.banner {
            for line in BANNER {
                console.say(line);
            }
        }

        match self.run_session(supplied, console).await {
            Ok(()) | Err(Error::Interrupted) => {
                say_goodbye(console);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn run_session<C: Console>(
        &self,
        supplied: EnvCredentials,
        console: &mut C,
    ) -> Result<()> {
        let credentials = credentials::resolve(supplied, console).await?;
        let mut client = MailClient::open(credentials, &self.options, console).await?;

        let outcome = self.browse(&mut client, console).await;

        if let Err(e) = client.logout().await {
            warn!("{}", e);
        }
        outcome
    }

    async fn browse<C: Console>(&self, client: &mut MailClient, console: &mut C) -> Result<()> {
        // Listed once per session.
        let mailboxes = client.list_mailboxes().await?;

        loop {
            select::print_mailboxes(&mailboxes, console);
            let mailbox = select::choose_mailbox(&mailboxes, console).await?;
            debug!("Selected mailbox {}", mailbox);

            console.say("Loading messages...");
            let messages = client.fetch_messages(mailbox).await?;
            if messages.is_empty() {
                console.say(&format!("No messages in {mailbox}."));
                continue;
            }

            console.say("");
            console.say(&format!("Emails in {mailbox}:"));
            console.say("");
            select::print_summaries(&messages, console);

            let message = select::choose_message(&messages, console).await?;
            render::show(message, self.options.wrap_width, console)?;
        }
    }
}
