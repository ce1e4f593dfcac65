//! Interaction controller - cursor and select/move/resize modes
//!
//! ```text
//!            toggle_move (hit)          toggle_resize (hit)
//!   Select ─────────────────▶ Move(id)   Select ─────────────▶ Resize(id)
//!     ▲                          │         ▲                      │
//!     └──── toggle_move ─────────┘         └─── toggle_resize ────┘
//! ```
//!
//! A Move or Resize target must stay visible and under the cursor. When a
//! command leaves it otherwise (window closed, workspace hidden), the mode
//! drops back to Select before the next directional step.

use tracing::debug;

use super::store::WindowStore;
use super::window::WindowId;
use super::workspace::Workspaces;

/// Cursor step direction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// `(dx, dy)` of one step
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Interaction mode, with the addressed window in Move and Resize
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Select,
    Move(WindowId),
    Resize(WindowId),
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Select => "select",
            Mode::Move(_) => "move",
            Mode::Resize(_) => "resize",
        }
    }

    pub fn target(&self) -> Option<WindowId> {
        match *self {
            Mode::Select => None,
            Mode::Move(id) | Mode::Resize(id) => Some(id),
        }
    }
}

/// Cursor, mode and visible workspaces
#[derive(Debug)]
pub struct Controller {
    x: u16,
    y: u16,
    mode: Mode,
    view: Workspaces,
    width: u16,
    height: u16,
    sized: bool,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    pub fn new() -> Self {
        Self {
            x: 0,
            y: 0,
            mode: Mode::Select,
            view: Workspaces::WS1,
            width: 1,
            height: 1,
            sized: false,
        }
    }

    /// Record the screen size. The first call centers the cursor; later
    /// calls only pull it back inside the new bounds.
    pub fn resize_screen(&mut self, width: u16, height: u16) {
        self.width = width.max(1);
        self.height = height.max(1);
        if self.sized {
            self.x = self.x.min(self.width - 1);
            self.y = self.y.min(self.height - 1);
        } else {
            self.x = self.width / 2;
            self.y = self.height / 2;
            self.sized = true;
        }
    }

    /// True once a screen size has been received
    pub fn is_sized(&self) -> bool {
        self.sized
    }

    pub fn cursor(&self) -> (u16, u16) {
        (self.x, self.y)
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn view(&self) -> Workspaces {
        self.view
    }

    /// Window under the cursor on the visible workspaces
    pub fn hovered(&self, store: &WindowStore) -> Option<WindowId> {
        store.hit_test(self.x as i32, self.y as i32, self.view)
    }

    /// Drop back to Select if the addressed window is gone, hidden, or no
    /// longer under the cursor.
    pub fn revalidate(&mut self, store: &WindowStore) {
        let Some(id) = self.mode.target() else {
            return;
        };
        let valid = store.get(id).map_or(false, |w| {
            w.is_visible_on(self.view) && w.rect.contains(self.x as i32, self.y as i32)
        });
        if !valid {
            debug!(window = id, mode = self.mode.label(), "target lost, back to select");
            self.mode = Mode::Select;
        }
    }

    /// Apply one directional command in the current mode
    pub fn step(&mut self, store: &mut WindowStore, dir: Direction) {
        self.revalidate(store);
        match self.mode {
            Mode::Select => {
                self.move_cursor(dir);
            }
            Mode::Move(id) => {
                let (dx, dy) = self.move_cursor(dir);
                if dx != 0 || dy != 0 {
                    store.move_window(id, dx, dy);
                }
            }
            Mode::Resize(id) => {
                let (dx, dy) = dir.delta();
                if store.resize_window(id, dx, dy) {
                    self.move_cursor(dir);
                }
            }
        }
    }

    /// Enter Move on the hovered window, or leave it
    pub fn toggle_move(&mut self, store: &WindowStore) {
        self.mode = match (self.mode, self.hovered(store)) {
            (Mode::Move(_), _) | (_, None) => Mode::Select,
            (_, Some(id)) => Mode::Move(id),
        };
    }

    /// Enter Resize on the hovered window, or leave it
    pub fn toggle_resize(&mut self, store: &WindowStore) {
        self.mode = match (self.mode, self.hovered(store)) {
            (Mode::Resize(_), _) | (_, None) => Mode::Select,
            (_, Some(id)) => Mode::Resize(id),
        };
    }

    /// Flip workspace `index` on the hovered window, or on the view if the
    /// cursor is over the background.
    pub fn toggle_workspace(&mut self, store: &mut WindowStore, index: usize) {
        match self.hovered(store) {
            Some(id) => {
                if let Some(window) = store.get_mut(id) {
                    window.workspaces.toggle_nth(index);
                }
            }
            None => self.view.toggle_nth(index),
        }
        self.revalidate(store);
    }

    /// Move the cursor one cell, clamped. Returns the delta actually applied.
    fn move_cursor(&mut self, dir: Direction) -> (i32, i32) {
        let (dx, dy) = dir.delta();
        let nx = (self.x as i32 + dx).clamp(0, self.width as i32 - 1);
        let ny = (self.y as i32 + dy).clamp(0, self.height as i32 - 1);
        let applied = (nx - self.x as i32, ny - self.y as i32);
        self.x = nx as u16;
        self.y = ny as u16;
        applied
    }
}
