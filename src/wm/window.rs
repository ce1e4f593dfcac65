//! Window - a bordered view onto one shell session

use crate::core::session::{Session, SessionId};

use super::workspace::Workspaces;

/// Unique identifier for a window. Ids increase monotonically and are never
/// reused, so a window id also identifies its session.
pub type WindowId = SessionId;

/// Smallest allowed height or width (just the border).
pub const MIN_SIZE: u16 = 2;

/// Window rectangle in screen cells, border included.
///
/// `top`/`left` are signed: a window dragged partly off screen keeps its
/// true position and is clipped at render time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub top: i32,
    pub left: i32,
    pub lines: u16,
    pub cols: u16,
}

impl Rect {
    pub fn new(top: i32, left: i32, lines: u16, cols: u16) -> Self {
        Self {
            top,
            left,
            lines: lines.max(MIN_SIZE),
            cols: cols.max(MIN_SIZE),
        }
    }

    pub fn bottom(&self) -> i32 {
        self.top + self.lines as i32 - 1
    }

    pub fn right(&self) -> i32 {
        self.left + self.cols as i32 - 1
    }

    /// Check if a screen cell is inside this rectangle
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }

    /// Move the origin by `(dx, dy)`
    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.left += dx;
        self.top += dy;
    }

    /// Grow or shrink by one step per axis. Returns false, leaving the rect
    /// untouched, if that would go below `MIN_SIZE`.
    pub fn grow(&mut self, d_cols: i32, d_lines: i32) -> bool {
        let cols = self.cols as i32 + d_cols;
        let lines = self.lines as i32 + d_lines;
        if cols < MIN_SIZE as i32 || lines < MIN_SIZE as i32 || cols > u16::MAX as i32 || lines > u16::MAX as i32 {
            return false;
        }
        self.cols = cols as u16;
        self.lines = lines as u16;
        true
    }

    /// Interior size `(cols, lines)` excluding the border
    pub fn inner_size(&self) -> (u16, u16) {
        (self.cols - MIN_SIZE, self.lines - MIN_SIZE)
    }
}

/// Text written by a session: append-only except for the last line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Content {
    lines: Vec<String>,
}

impl Default for Content {
    fn default() -> Self {
        Self {
            lines: vec![String::new()],
        }
    }
}

impl Content {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one rune: newline starts a new line, anything else extends the
    /// last one.
    pub fn push(&mut self, ch: char) {
        if ch == '\n' {
            self.lines.push(String::new());
        } else if let Some(last) = self.lines.last_mut() {
            last.push(ch);
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The most recent `n` lines
    pub fn tail(&self, n: usize) -> &[String] {
        let start = self.lines.len().saturating_sub(n);
        &self.lines[start..]
    }
}

/// A window: geometry, workspace membership, content, and its session
pub struct Window {
    /// Unique identifier
    pub id: WindowId,
    /// Display name, empty until renamed
    pub name: String,
    pub content: Content,
    /// Workspaces this window is shown on
    pub workspaces: Workspaces,
    pub rect: Rect,
    /// Shell session, released before the window is dropped
    pub session: Session,
}

impl Window {
    pub fn new(id: WindowId, rect: Rect, workspaces: Workspaces, session: Session) -> Self {
        Self {
            id,
            name: String::new(),
            content: Content::new(),
            workspaces,
            rect,
            session,
        }
    }

    pub fn is_visible_on(&self, view: Workspaces) -> bool {
        self.workspaces.overlaps(view)
    }
}
