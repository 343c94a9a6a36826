//! Controlling-terminal state around the hidden password read
//!
//! The no-echo read turns ECHO off on the terminal and only turns it
//! back on when it returns. A process that exits while the read is
//! still blocked (CTRL+C) has to put the saved attributes back itself.

#[cfg(unix)]
pub use unix::SavedTty;

#[cfg(not(unix))]
pub use other::SavedTty;

#[cfg(unix)]
mod unix {
    use std::fs::File;
    use std::io;
    use std::mem::MaybeUninit;
    use std::os::fd::AsRawFd;

    /// Terminal attributes captured before a no-echo read.
    pub struct SavedTty {
        tty: File,
        attrs: libc::termios,
    }

    impl SavedTty {
        /// Snapshot the controlling terminal.
        ///
        /// Fails when the process has none (daemon, `setsid`, CI).
        pub fn capture() -> io::Result<Self> {
            Self::capture_from(File::open("/dev/tty")?)
        }

        /// Snapshot the terminal behind `tty`.
        pub fn capture_from(tty: File) -> io::Result<Self> {
            let mut attrs = MaybeUninit::<libc::termios>::uninit();
            // SAFETY: the descriptor stays open while `tty` lives, and
            // tcgetattr fully initializes `attrs` when it returns 0.
            let attrs = unsafe {
                if libc::tcgetattr(tty.as_raw_fd(), attrs.as_mut_ptr()) != 0 {
                    return Err(io::Error::last_os_error());
                }
                attrs.assume_init()
            };
            Ok(Self { tty, attrs })
        }

        /// Put the captured attributes back.
        pub fn restore(&self) -> io::Result<()> {
            // SAFETY: valid descriptor and a termios read by tcgetattr.
            if unsafe { libc::tcsetattr(self.tty.as_raw_fd(), libc::TCSANOW, &self.attrs) } != 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        }
    }
}

#[cfg(not(unix))]
mod other {
    use std::io;

    /// No terminal attributes are tracked off Unix.
    pub struct SavedTty;

    impl SavedTty {
        #[allow(clippy::unnecessary_wraps)]
        pub const fn capture() -> io::Result<Self> {
            Ok(Self)
        }

        #[allow(clippy::unnecessary_wraps)]
        pub const fn restore(&self) -> io::Result<()> {
            Ok(())
        }
    }
}

/// Restore `saved`, if any, logging rather than failing.
pub fn restore(saved: Option<SavedTty>) {
    if let Some(saved) = saved
        && let Err(e) = saved.restore()
    {
        tracing::warn!("Could not restore terminal: {}", e);
    }
}
