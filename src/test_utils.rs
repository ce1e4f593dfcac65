//! Shared test helpers.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::mpsc::SyncSender;

use crate::core::pty::PtyError;
use crate::core::session::{Launcher, Output, Session, SessionError, SessionId, SessionMessage};

/// Launcher that creates processless sessions and lets tests play the part
/// of the reader thread. Clones share state, so a test can hand one clone
/// to an `App` and keep the other to drive output.
#[derive(Clone)]
pub struct DetachedLauncher {
    fail: bool,
    senders: Rc<RefCell<HashMap<SessionId, SyncSender<SessionMessage>>>>,
    launched: Rc<RefCell<Vec<(SessionId, u16, u16)>>>,
}

impl DetachedLauncher {
    pub fn new() -> Self {
        Self {
            fail: false,
            senders: Rc::new(RefCell::new(HashMap::new())),
            launched: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// A launcher whose every spawn fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Queue `text` as session output, one message per char.
    pub fn emit(&self, id: SessionId, text: &str) {
        let senders = self.senders.borrow();
        let tx = senders.get(&id).expect("no such session");
        for ch in text.chars() {
            tx.send(SessionMessage { session: id, output: Output::Rune(ch) })
                .expect("session queue closed");
        }
    }

    /// Simulate the reader thread exiting.
    pub fn hang_up(&self, id: SessionId) {
        self.senders.borrow_mut().remove(&id);
    }

    /// `(id, rows, cols)` of every successful launch
    pub fn launched(&self) -> Vec<(SessionId, u16, u16)> {
        self.launched.borrow().clone()
    }
}

impl Launcher for DetachedLauncher {
    fn launch(&self, id: SessionId, rows: u16, cols: u16) -> Result<Session, SessionError> {
        if self.fail {
            return Err(SessionError::SpawnFailed(PtyError::Spawn {
                command: "test-shell".to_string(),
                reason: "refused by test launcher".to_string(),
            }));
        }
        let (session, tx) = Session::detached(id, 1024);
        self.senders.borrow_mut().insert(id, tx);
        self.launched.borrow_mut().push((id, rows, cols));
        Ok(session)
    }
}
