//! Window store - the z-ordered stack of windows
//!
//! The stack is paint order: index 0 is the bottom, the last window is on
//! top and wins where rectangles overlap.

use tracing::{debug, info};

use crate::core::session::{Launcher, Output, SessionError, SessionMessage};

use super::window::{Rect, Window, WindowId};
use super::workspace::Workspaces;

/// Ordered stack of windows
pub struct WindowStore {
    /// Bottom to top
    windows: Vec<Window>,
    /// Next window ID
    next_id: WindowId,
}

impl Default for WindowStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowStore {
    pub fn new() -> Self {
        Self {
            windows: Vec::new(),
            next_id: 1,
        }
    }

    /// Create a window at `(x, y)` with its session and push it on top.
    ///
    /// The session is started first, sized to the window interior; if that
    /// fails no window is created and the id is not consumed.
    pub fn spawn_window(
        &mut self,
        launcher: &dyn Launcher,
        x: i32,
        y: i32,
        lines: u16,
        cols: u16,
        workspaces: Workspaces,
    ) -> Result<WindowId, SessionError> {
        let id = self.next_id;
        let rect = Rect::new(y, x, lines, cols);
        let (inner_cols, inner_lines) = rect.inner_size();
        let session = launcher.launch(id, inner_lines.max(1), inner_cols.max(1))?;
        self.next_id += 1;

        self.windows.push(Window::new(id, rect, workspaces, session));
        info!(window = id, x, y, lines = rect.lines, cols = rect.cols, "window spawned");
        Ok(id)
    }

    /// Move a window to the top of the stack. No-op if it is already on top
    /// or does not exist.
    pub fn raise(&mut self, id: WindowId) -> bool {
        match self.position(id) {
            Some(pos) if pos + 1 < self.windows.len() => {
                let window = self.windows.remove(pos);
                self.windows.push(window);
                true
            }
            _ => false,
        }
    }

    /// Release a window's session, then drop the window. Absent ids are a
    /// no-op.
    pub fn remove(&mut self, id: WindowId) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        self.windows[pos].session.close();
        self.windows.remove(pos);
        info!(window = id, "window removed");
        true
    }

    /// Close every session and empty the store
    pub fn close_all(&mut self) {
        for window in self.windows.iter_mut() {
            window.session.close();
        }
        self.windows.clear();
    }

    /// Topmost window visible on `view` containing `(x, y)`
    pub fn hit_test(&self, x: i32, y: i32, view: Workspaces) -> Option<WindowId> {
        let mut hit = None;
        for window in &self.windows {
            if window.is_visible_on(view) && window.rect.contains(x, y) {
                hit = Some(window.id);
            }
        }
        hit
    }

    pub fn get(&self, id: WindowId) -> Option<&Window> {
        self.windows.iter().find(|w| w.id == id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.iter_mut().find(|w| w.id == id)
    }

    /// All windows, bottom to top
    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    /// Windows shown on `view`, bottom to top
    pub fn visible(&self, view: Workspaces) -> impl Iterator<Item = &Window> {
        self.windows.iter().filter(move |w| w.is_visible_on(view))
    }

    /// Stack order as ids, bottom to top
    pub fn order(&self) -> Vec<WindowId> {
        self.windows.iter().map(|w| w.id).collect()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Translate a window's origin
    pub fn move_window(&mut self, id: WindowId, dx: i32, dy: i32) -> bool {
        match self.get_mut(id) {
            Some(window) => {
                window.rect.translate(dx, dy);
                true
            }
            None => false,
        }
    }

    /// Grow or shrink a window by one cell per axis, floor-clamped
    pub fn resize_window(&mut self, id: WindowId, d_cols: i32, d_lines: i32) -> bool {
        self.get_mut(id)
            .map_or(false, |window| window.rect.grow(d_cols, d_lines))
    }

    /// Relay pass: take up to `budget` messages, one per session per round,
    /// so a chatty session cannot starve the others.
    pub fn collect_output(&mut self, budget: usize) -> Vec<SessionMessage> {
        let mut messages = Vec::new();
        while messages.len() < budget {
            let before = messages.len();
            for window in self.windows.iter_mut() {
                if messages.len() >= budget {
                    break;
                }
                if let Some(msg) = window.session.next_message() {
                    messages.push(msg);
                }
            }
            if messages.len() == before {
                break;
            }
        }
        messages
    }

    /// Apply one session message to its window's content.
    ///
    /// Returns false for a message whose window is gone.
    pub fn apply_output(&mut self, msg: SessionMessage) -> bool {
        let Some(window) = self.get_mut(msg.session) else {
            debug!(session = msg.session, "discarding output for removed window");
            return false;
        };
        match msg.output {
            Output::Rune(ch) => window.content.push(ch),
            Output::Ended => {
                window.session.mark_ended();
                info!(window = window.id, "session output ended");
            }
        }
        true
    }

    fn position(&self, id: WindowId) -> Option<usize> {
        self.windows.iter().position(|w| w.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::DetachedLauncher;

    fn store_with(launcher: &DetachedLauncher, rects: &[(i32, i32, u16, u16)]) -> WindowStore {
        let mut store = WindowStore::new();
        for &(x, y, lines, cols) in rects {
            store
                .spawn_window(launcher, x, y, lines, cols, Workspaces::WS1)
                .unwrap();
        }
        store
    }

    #[test]
    fn test_spawn_geometry_and_hit() {
        let launcher = DetachedLauncher::new();
        let store = store_with(&launcher, &[(5, 5, 10, 20)]);
        let window = &store.windows()[0];
        assert_eq!(window.rect, Rect { top: 5, left: 5, lines: 10, cols: 20 });
        assert_eq!(store.hit_test(10, 10, Workspaces::WS1), Some(window.id));
        assert_eq!(store.hit_test(10, 10, Workspaces::WS2), None);
        assert_eq!(store.hit_test(0, 0, Workspaces::WS1), None);
    }

    #[test]
    fn test_session_sized_to_interior() {
        let launcher = DetachedLauncher::new();
        let store = store_with(&launcher, &[(0, 0, 10, 20), (0, 0, 2, 2)]);
        let ids = store.order();
        assert_eq!(launcher.launched(), vec![(ids[0], 8, 18), (ids[1], 1, 1)]);
    }

    #[test]
    fn test_ids_increase() {
        let launcher = DetachedLauncher::new();
        let store = store_with(&launcher, &[(0, 0, 4, 4), (1, 1, 4, 4), (2, 2, 4, 4)]);
        let ids = store.order();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_spawn_failure_creates_nothing() {
        let launcher = DetachedLauncher::failing();
        let mut store = WindowStore::new();
        let result = store.spawn_window(&launcher, 0, 0, 4, 4, Workspaces::WS1);
        assert!(matches!(result, Err(SessionError::SpawnFailed(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_hit_test_topmost_wins() {
        let launcher = DetachedLauncher::new();
        let store = store_with(&launcher, &[(0, 0, 10, 10), (5, 5, 10, 10)]);
        let ids = store.order();
        assert_eq!(store.hit_test(6, 6, Workspaces::WS1), Some(ids[1]));
        assert_eq!(store.hit_test(1, 1, Workspaces::WS1), Some(ids[0]));
    }

    #[test]
    fn test_hit_test_skips_hidden_windows() {
        let launcher = DetachedLauncher::new();
        let mut store = store_with(&launcher, &[(0, 0, 10, 10), (0, 0, 10, 10)]);
        let ids = store.order();
        store.get_mut(ids[1]).unwrap().workspaces = Workspaces::WS2;
        assert_eq!(store.hit_test(3, 3, Workspaces::WS1), Some(ids[0]));
    }

    #[test]
    fn test_raise_preserves_relative_order() {
        let launcher = DetachedLauncher::new();
        let mut store = store_with(&launcher, &[(0, 0, 4, 4), (0, 0, 4, 4), (0, 0, 4, 4), (0, 0, 4, 4)]);
        let ids = store.order();

        assert!(!store.raise(ids[3]));
        assert_eq!(store.order(), ids);

        assert!(store.raise(ids[1]));
        assert_eq!(store.order(), vec![ids[0], ids[2], ids[3], ids[1]]);

        assert!(!store.raise(999));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let launcher = DetachedLauncher::new();
        let mut store = store_with(&launcher, &[(0, 0, 4, 4), (0, 0, 4, 4)]);
        let ids = store.order();
        assert!(store.remove(ids[0]));
        assert!(!store.remove(ids[0]));
        assert_eq!(store.order(), vec![ids[1]]);
    }

    #[test]
    fn test_resize_never_below_minimum() {
        let launcher = DetachedLauncher::new();
        let mut store = store_with(&launcher, &[(0, 0, 4, 4)]);
        let id = store.order()[0];
        for _ in 0..10 {
            store.resize_window(id, -1, 0);
            store.resize_window(id, 0, -1);
        }
        let rect = store.get(id).unwrap().rect;
        assert_eq!((rect.lines, rect.cols), (2, 2));
    }

    #[test]
    fn test_output_applied_in_order_and_stale_dropped() {
        let launcher = DetachedLauncher::new();
        let mut store = store_with(&launcher, &[(0, 0, 4, 4)]);
        let id = store.order()[0];
        launcher.emit(id, "hi\nthere");

        for msg in store.collect_output(64) {
            assert!(store.apply_output(msg));
        }
        assert_eq!(store.get(id).unwrap().content.lines(), &["hi", "there"]);

        store.remove(id);
        let stale = SessionMessage { session: id, output: Output::Rune('x') };
        assert!(!store.apply_output(stale));
    }

    #[test]
    fn test_ended_session_only_affects_its_window() {
        let launcher = DetachedLauncher::new();
        let mut store = store_with(&launcher, &[(0, 0, 4, 4), (0, 0, 4, 4)]);
        let ids = store.order();
        launcher.emit(ids[0], "bye");
        launcher.hang_up(ids[0]);

        loop {
            let batch = store.collect_output(64);
            if batch.is_empty() {
                break;
            }
            for msg in batch {
                assert!(store.apply_output(msg));
            }
        }

        let ended = store.get(ids[0]).unwrap();
        assert!(!ended.session.is_running());
        assert_eq!(ended.content.lines(), &["bye"]);
        assert!(store.get(ids[1]).unwrap().session.is_running());
        assert_eq!(store.order(), ids);
    }

    #[test]
    fn test_collect_output_round_robin() {
        let launcher = DetachedLauncher::new();
        let mut store = store_with(&launcher, &[(0, 0, 4, 4), (0, 0, 4, 4)]);
        let ids = store.order();
        launcher.emit(ids[0], "aaa");
        launcher.emit(ids[1], "b");

        let sessions: Vec<_> = store.collect_output(3).iter().map(|m| m.session).collect();
        assert_eq!(sessions, vec![ids[0], ids[1], ids[0]]);
    }
}
