//! Pseudo-terminal wrapper
//!
//! This module provides a thin wrapper around `portable-pty` for starting a
//! shell attached to a pseudo-terminal and releasing it again.
//!
//! Release is a strict three-step sequence:
//!
//! ```text
//! close()
//! ├── 1. drop the master descriptor and send SIGHUP to the child
//! ├── 2. wait for the child to exit (bounded grace period)
//! └── 3. kill + reap the child if it is still running
//! ```

use std::io::{self, Read};
use std::thread;
use std::time::{Duration, Instant};

use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use thiserror::Error;
use tracing::{debug, warn};

/// How long step 2 of [`Pty::close`] waits before force-killing.
const EXIT_GRACE: Duration = Duration::from_millis(250);

/// Poll interval while waiting for the child in step 2.
const EXIT_POLL: Duration = Duration::from_millis(10);

#[derive(Error, Debug)]
pub enum PtyError {
    #[error("failed to open pseudo-terminal: {0}")]
    Open(String),

    #[error("failed to spawn `{command}`: {reason}")]
    Spawn { command: String, reason: String },

    #[error("failed to clone pty reader: {0}")]
    Reader(String),

    #[error("failed to read from pty: {0}")]
    Read(#[source] io::Error),

    #[error("failed to start reader thread: {0}")]
    Thread(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, PtyError>;

/// How [`Pty::close`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Nothing left to release
    AlreadyClosed,
    /// The child exited within the grace period
    Exited,
    /// The child had to be killed
    Killed,
}

/// A shell process attached to a pseudo-terminal.
pub struct Pty {
    master: Option<Box<dyn MasterPty + Send>>,
    child: Option<Box<dyn Child + Send + Sync>>,
}

impl Pty {
    /// Open a pty of `rows x cols` and start `command` on its slave side.
    ///
    /// `command` is split on whitespace; the first word is the program.
    pub fn spawn(command: &str, rows: u16, cols: u16) -> Result<Self> {
        let mut words = command.split_whitespace();
        let program = words.next().ok_or_else(|| PtyError::Spawn {
            command: command.to_string(),
            reason: "empty command".to_string(),
        })?;

        let pair = native_pty_system()
            .openpty(PtySize {
                rows: rows.max(1),
                cols: cols.max(1),
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| PtyError::Open(e.to_string()))?;

        let mut cmd = CommandBuilder::new(program);
        cmd.args(words);
        if let Ok(cwd) = std::env::current_dir() {
            cmd.cwd(cwd);
        }
        cmd.env("TTYWM", "1");

        let child = pair.slave.spawn_command(cmd).map_err(|e| PtyError::Spawn {
            command: command.to_string(),
            reason: e.to_string(),
        })?;
        // The slave end belongs to the child now; holding it would keep the
        // reader from ever seeing EOF.
        drop(pair.slave);

        debug!(command, pid = ?child.process_id(), "pty spawned");

        Ok(Self {
            master: Some(pair.master),
            child: Some(child),
        })
    }

    /// Clone a blocking reader for the output side of the pty.
    pub fn reader(&self) -> Result<Box<dyn Read + Send>> {
        match &self.master {
            Some(master) => master
                .try_clone_reader()
                .map_err(|e| PtyError::Reader(e.to_string())),
            None => Err(PtyError::Reader("pty already closed".to_string())),
        }
    }

    pub fn process_id(&self) -> Option<u32> {
        self.child.as_ref().and_then(|c| c.process_id())
    }

    pub fn is_closed(&self) -> bool {
        self.master.is_none() && self.child.is_none()
    }

    /// Release the pty and its child. Calling this again is a no-op.
    pub fn close(&mut self) -> Release {
        // 1. close the descriptor and hang up the child. The reader thread
        // holds a dup of the master, so dropping ours alone is no hangup.
        if let Some(master) = self.master.take() {
            drop(master);
        }

        let Some(mut child) = self.child.take() else {
            return Release::AlreadyClosed;
        };
        hang_up(child.as_ref());

        // 2. wait for the child to exit
        let deadline = Instant::now() + EXIT_GRACE;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    debug!(?status, "child exited after hangup");
                    return Release::Exited;
                }
                Ok(None) if Instant::now() < deadline => thread::sleep(EXIT_POLL),
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "failed to poll child status");
                    break;
                }
            }
        }

        // 3. force-kill, then reap so no zombie is left behind
        if let Err(e) = child.kill() {
            warn!(error = %e, "failed to kill child");
        }
        match child.wait() {
            Ok(status) => debug!(?status, "child killed"),
            Err(e) => warn!(error = %e, "failed to reap child"),
        }
        Release::Killed
    }
}

/// Deliver SIGHUP to a child that has not been reaped yet.
#[cfg(unix)]
fn hang_up(child: &(dyn Child + Send + Sync)) {
    let Some(pid) = child.process_id() else {
        return;
    };
    let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGHUP) };
    if rc != 0 {
        debug!(pid, error = %io::Error::last_os_error(), "hangup signal failed");
    }
}

#[cfg(not(unix))]
fn hang_up(_child: &(dyn Child + Send + Sync)) {}

impl Drop for Pty {
    fn drop(&mut self) {
        self.close();
    }
}
