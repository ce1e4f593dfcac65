//! Session management
//!
//! A session is one shell process on a pty plus the pipeline that drains its
//! output without blocking the UI:
//!
//! ```text
//! reader thread ──(bounded queue)──▶ Session::next_message ──▶ event loop
//!   blocking read                     relay: one message
//!   + UTF-8 decode                    per call
//! ```
//!
//! The reader only owns its cloned descriptor and the sending half of the
//! queue. It never sees window state; every decoded character travels as a
//! `SessionMessage` tagged with the session id.

use std::io::{ErrorKind, Read};
use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError};
use std::thread;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::decode::Utf8Decoder;
use super::pty::{Pty, PtyError};

/// Session identifier. Equal to the id of the owning window and never reused.
pub type SessionId = u64;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("failed to start session: {0}")]
    SpawnFailed(#[source] PtyError),

    #[error("session output ended")]
    ReadEnded,
}

/// A unit of session output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// One decoded character (including `'\n'`)
    Rune(char),
    /// The reader hit EOF or a read error and has exited
    Ended,
}

/// Output tagged with the session it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionMessage {
    pub session: SessionId,
    pub output: Output,
}

/// A shell session owned by exactly one window.
pub struct Session {
    id: SessionId,
    pty: Option<Pty>,
    rx: Option<Receiver<SessionMessage>>,
    ended: bool,
}

impl Session {
    /// Start `shell` on a `rows x cols` pty and spawn its reader thread.
    ///
    /// On failure nothing is left running.
    pub fn start(
        id: SessionId,
        shell: &str,
        rows: u16,
        cols: u16,
        queue_capacity: usize,
    ) -> Result<Self, SessionError> {
        let pty = Pty::spawn(shell, rows, cols).map_err(SessionError::SpawnFailed)?;
        // If this fails `pty` is dropped, which runs the full release sequence
        let reader = pty.reader().map_err(SessionError::SpawnFailed)?;

        let (tx, rx) = mpsc::sync_channel(queue_capacity.max(1));
        thread::Builder::new()
            .name(format!("ttywm-reader-{id}"))
            .spawn(move || read_loop(id, reader, tx))
            .map_err(|e| SessionError::SpawnFailed(PtyError::Thread(e)))?;

        info!(session = id, shell, rows, cols, pid = ?pty.process_id(), "session started");

        Ok(Self {
            id,
            pty: Some(pty),
            rx: Some(rx),
            ended: false,
        })
    }

    /// A session without a process. Output is injected through the returned
    /// sender exactly as a reader thread would.
    #[cfg(test)]
    pub fn detached(id: SessionId, queue_capacity: usize) -> (Self, SyncSender<SessionMessage>) {
        let (tx, rx) = mpsc::sync_channel(queue_capacity.max(1));
        let session = Self {
            id,
            pty: None,
            rx: Some(rx),
            ended: false,
        };
        (session, tx)
    }

    #[cfg(test)]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Relay step: take at most one message off this session's queue.
    pub fn next_message(&mut self) -> Option<SessionMessage> {
        let rx = self.rx.as_ref()?;
        match rx.try_recv() {
            Ok(msg) => Some(msg),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                // Reader is gone without saying goodbye
                self.rx = None;
                if self.ended {
                    None
                } else {
                    Some(SessionMessage {
                        session: self.id,
                        output: Output::Ended,
                    })
                }
            }
        }
    }

    pub fn mark_ended(&mut self) {
        self.ended = true;
    }

    /// Whether the shell's output stream is still open.
    pub fn is_running(&self) -> bool {
        !self.ended && self.rx.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.rx.is_none() && self.pty.as_ref().map_or(true, Pty::is_closed)
    }

    /// Release the pty (three-step sequence), then the queue.
    ///
    /// Dropping the receiver unblocks a reader stuck on a full queue. A second
    /// call is a no-op.
    pub fn close(&mut self) {
        if self.is_closed() {
            return;
        }
        if let Some(pty) = self.pty.as_mut() {
            pty.close();
        }
        self.pty = None;
        self.rx = None;
        self.ended = true;
        info!(session = self.id, "session closed");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

/// Blocking reader: decode bytes and push one message per character.
fn read_loop(id: SessionId, mut reader: Box<dyn Read + Send>, tx: SyncSender<SessionMessage>) {
    let mut buffer = [0u8; 4096];
    let mut decoder = Utf8Decoder::new();
    let mut connected = true;

    let mut send = |output: Output| {
        if connected && tx.send(SessionMessage { session: id, output }).is_err() {
            connected = false;
        }
        connected
    };

    let reason = loop {
        match reader.read(&mut buffer) {
            Ok(0) => break SessionError::ReadEnded.to_string(),
            Ok(n) => {
                let mut alive = true;
                decoder.feed(&buffer[..n], |c| alive = send(Output::Rune(c)));
                if !alive {
                    debug!(session = id, "session queue dropped, reader exiting");
                    return;
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => break PtyError::Read(e).to_string(),
        }
    };

    decoder.finish(|c| {
        send(Output::Rune(c));
    });
    if send(Output::Ended) {
        info!(session = id, %reason, "session reader exited");
    } else {
        warn!(session = id, %reason, "session reader exited after queue closed");
    }
}

/// Starts sessions for new windows.
pub trait Launcher {
    fn launch(&self, id: SessionId, rows: u16, cols: u16) -> Result<Session, SessionError>;
}

/// Launches the configured shell on a real pty.
pub struct ShellLauncher {
    pub shell: String,
    pub queue_capacity: usize,
}

impl Launcher for ShellLauncher {
    fn launch(&self, id: SessionId, rows: u16, cols: u16) -> Result<Session, SessionError> {
        Session::start(id, &self.shell, rows, cols, self.queue_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::{Duration, Instant};

    fn drain(session: &mut Session, timeout: Duration) -> Vec<Output> {
        let deadline = Instant::now() + timeout;
        let mut out = Vec::new();
        while Instant::now() < deadline {
            match session.next_message() {
                Some(msg) => {
                    assert_eq!(msg.session, session.id());
                    let ended = msg.output == Output::Ended;
                    out.push(msg.output);
                    if ended {
                        break;
                    }
                }
                None => thread::sleep(Duration::from_millis(1)),
            }
        }
        out
    }

    #[test]
    fn test_detached_relay_preserves_order() {
        let (mut session, tx) = Session::detached(7, 16);
        for c in "ab\nc".chars() {
            tx.send(SessionMessage { session: 7, output: Output::Rune(c) }).unwrap();
        }

        let got: Vec<_> = (0..4).filter_map(|_| session.next_message()).collect();
        let runes: String = got
            .iter()
            .map(|m| match m.output {
                Output::Rune(c) => c,
                Output::Ended => '!',
            })
            .collect();
        assert_eq!(runes, "ab\nc");
        assert!(session.next_message().is_none());
    }

    #[test]
    fn test_disconnected_queue_reports_ended_once() {
        let (mut session, tx) = Session::detached(3, 4);
        drop(tx);
        assert_eq!(
            session.next_message(),
            Some(SessionMessage { session: 3, output: Output::Ended })
        );
        assert!(session.next_message().is_none());
        assert!(!session.is_running());
    }

    #[test]
    fn test_read_loop_decodes_and_ends() {
        let (tx, rx) = mpsc::sync_channel(64);
        let bytes = "hé\nx".as_bytes().to_vec();
        let handle = thread::spawn(move || read_loop(9, Box::new(Cursor::new(bytes)), tx));

        let mut session = Session { id: 9, pty: None, rx: Some(rx), ended: false };
        let out = drain(&mut session, Duration::from_secs(2));
        handle.join().unwrap();

        assert_eq!(
            out,
            vec![
                Output::Rune('h'),
                Output::Rune('é'),
                Output::Rune('\n'),
                Output::Rune('x'),
                Output::Ended,
            ]
        );
    }

    #[test]
    fn test_bounded_queue_applies_backpressure() {
        let (tx, rx) = mpsc::sync_channel(2);
        let bytes = vec![b'z'; 64];
        let handle = thread::spawn(move || read_loop(1, Box::new(Cursor::new(bytes)), tx));

        // Reader fills the queue and blocks; dropping the receiver releases it
        thread::sleep(Duration::from_millis(20));
        drop(rx);
        handle.join().unwrap();
    }

    #[test]
    fn test_close_twice_is_noop() {
        let (mut session, _tx) = Session::detached(5, 4);
        session.close();
        assert!(session.is_closed());
        session.close();
        assert!(session.is_closed());
        assert!(session.next_message().is_none());
    }

    #[test]
    #[cfg(unix)]
    fn test_start_and_close_real_shell() {
        let mut session = Session::start(11, "/bin/sh", 16, 65, 64).expect("start /bin/sh");
        assert!(session.is_running());
        session.close();
        session.close();
        assert!(session.is_closed());
    }

    #[test]
    #[cfg(unix)]
    fn test_real_shell_closes_without_waiting_out_the_grace_period() {
        let mut session = Session::start(12, "/bin/sh", 16, 65, 64).expect("start /bin/sh");
        thread::sleep(Duration::from_millis(100));

        let started = Instant::now();
        session.close();
        let elapsed = started.elapsed();

        assert!(session.is_closed());
        assert!(elapsed < Duration::from_millis(200), "close took {:?}", elapsed);
    }
}
