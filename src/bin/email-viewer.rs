#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Interactive terminal email viewer
//!
//! Reads `URL`, `PORT`, `USERNAME` and `PASSWORD` from the environment
//! or a `.env` file and prompts for whatever is missing. Exit with
//! CTRL+D or CTRL+C.

use email_viewer::{EnvCredentials, StdConsole, Viewer, ViewerOptions, say_goodbye};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let supplied = EnvCredentials::from_env();
    let options = ViewerOptions::from_env()?;
    let viewer = Viewer::new(options);
    let mut console = StdConsole::new();

    let interrupted = tokio::select! {
        result = viewer.run(supplied, &mut console) => {
            result?;
            false
        }
        Ok(()) = tokio::signal::ctrl_c() => true,
    };

    if interrupted {
        console.restore_terminal();
        say_goodbye(&mut console);
        // The abandoned stdin read would otherwise hold the runtime open.
        std::process::exit(0);
    }

    Ok(())
}
