//! Terminal input and output
//!
//! Every prompt and every line the viewer prints goes through
//! [`Console`], so the interactive loop can run against a real
//! terminal ([`StdConsole`]) or a canned script ([`ScriptedConsole`]).

use crate::error::{Error, Result};
use crate::terminal::{self, SavedTty};
use std::collections::VecDeque;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;

/// Cursor home, clear screen, clear scrollback.
pub const CLEAR_SCREEN: &str = "\x1b[H\x1b[2J\x1b[3J";

/// Prompted input plus line output.
///
/// Reads return [`Error::Interrupted`] once input is exhausted
/// (end-of-file), which the session loop treats as "quit".
#[allow(async_fn_in_trait)]
pub trait Console {
    /// Show `prompt` and read one line, without its line terminator.
    async fn read_line(&mut self, prompt: &str) -> Result<String>;

    /// Like [`Console::read_line`] but the typed text is not echoed.
    async fn read_secret(&mut self, prompt: &str) -> Result<String>;

    /// Print one line.
    fn say(&mut self, text: &str);

    fn clear_screen(&mut self);
}

/// The process terminal: stdin, stdout, and a no-echo password read.
///
/// Without a controlling terminal the password is read from stdin
/// like any other line.
pub struct StdConsole {
    lines: Lines<BufReader<Stdin>>,
    // Set while a no-echo read is in flight.
    pending_tty: Option<SavedTty>,
}

impl StdConsole {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            pending_tty: None,
        }
    }

    /// Undo a no-echo read that never finished.
    ///
    /// Call before exiting on CTRL+C: the blocked read is not unwound,
    /// so the terminal would otherwise be left with echo off.
    pub fn restore_terminal(&mut self) {
        terminal::restore(self.pending_tty.take());
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdConsole {
    async fn read_line(&mut self, prompt: &str) -> Result<String> {
        let mut stdout = io::stdout();
        stdout.write_all(prompt.as_bytes())?;
        stdout.flush()?;

        self.lines.next_line().await?.ok_or(Error::Interrupted)
    }

    async fn read_secret(&mut self, prompt: &str) -> Result<String> {
        match SavedTty::capture() {
            Ok(saved) => self.pending_tty = Some(saved),
            Err(e) => {
                warn!("No terminal for a hidden read ({}), input will be echoed", e);
                return self.read_line(prompt).await;
            }
        }

        let prompt = prompt.to_string();
        let joined = tokio::task::spawn_blocking(move || rpassword::prompt_password(prompt)).await;
        self.pending_tty = None;
        let read = joined.map_err(io::Error::other)?;

        match read {
            Ok(secret) => Ok(secret),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(Error::Interrupted),
            Err(e) => Err(e.into()),
        }
    }

    fn say(&mut self, text: &str) {
        println!("{text}");
    }

    fn clear_screen(&mut self) {
        print!("{CLEAR_SCREEN}");
        io::stdout().flush().ok();
    }
}

/// A console fed from a fixed list of input lines.
///
/// Records prompts and output so a whole session can be asserted on.
/// Running out of input behaves like the user pressing CTRL+D.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    input: VecDeque<String>,
    prompts: Vec<String>,
    output: Vec<String>,
}

impl ScriptedConsole {
    #[must_use]
    pub fn new<I, S>(input: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: input.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Every prompt shown, in order.
    #[must_use]
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Every line printed, in order. Screen clears appear as
    /// [`CLEAR_SCREEN`].
    #[must_use]
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Printed output joined with newlines.
    #[must_use]
    pub fn transcript(&self) -> String {
        self.output.join("\n")
    }

    /// Input lines not consumed yet.
    #[must_use]
    pub fn remaining_input(&self) -> usize {
        self.input.len()
    }

    fn next_input(&mut self, prompt: &str) -> Result<String> {
        self.prompts.push(prompt.to_string());
        self.input.pop_front().ok_or(Error::Interrupted)
    }
}

impl Console for ScriptedConsole {
    async fn read_line(&mut self, prompt: &str) -> Result<String> {
        self.next_input(prompt)
    }

    async fn read_secret(&mut self, prompt: &str) -> Result<String> {
        self.next_input(prompt)
    }

    fn say(&mut self, text: &str) {
        self.output.push(text.to_string());
    }

    fn clear_screen(&mut self) {
        self.output.push(CLEAR_SCREEN.to_string());
    }
}
