//! Terminal renderer.
//!
//! Owns the terminal while ttywm runs: raw mode, alternate screen, hidden
//! hardware cursor. Frames are written whole, inside a synchronized update
//! so the terminal never shows half a frame:
//!
//! ```text
//! begin_frame()  → start sync, disable autowrap
//!     ↓
//! write rows     → MoveTo(0, y) + row text, for every row
//!     ↓
//! end_frame()    → enable autowrap, end sync, flush
//! ```

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::Print,
    terminal::{self, Clear, ClearType},
};

use super::compositor::Frame;

/// Begin a render frame (synchronized update, disable autowrap)
fn begin_frame<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "\x1b[?2026h")?;
    write!(out, "\x1b[?7l")?;
    Ok(())
}

/// End a render frame (enable autowrap, end synchronized update, flush)
fn end_frame<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "\x1b[?7h")?;
    write!(out, "\x1b[?2026l")?;
    out.flush()?;
    Ok(())
}

/// Execute a render operation with frame guards, ensuring cleanup on error
fn with_frame<W: Write, F, R>(out: &mut W, f: F) -> io::Result<R>
where
    F: FnOnce(&mut W) -> io::Result<R>,
{
    begin_frame(out)?;
    let result = f(out);
    let _ = end_frame(out);
    result
}

/// Write every row of `frame` at its screen position
pub fn write_frame<W: Write>(out: &mut W, frame: &Frame) -> io::Result<()> {
    with_frame(out, |out| {
        for (y, line) in frame.lines().iter().enumerate() {
            queue!(out, MoveTo(0, y as u16), Print(line))?;
        }
        Ok(())
    })
}

/// Full-screen renderer
pub struct Renderer {
    initialized: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self { initialized: false }
    }

    /// Initialize the terminal
    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            Hide,
            Clear(ClearType::All)
        )?;
        stdout.flush()?;

        self.initialized = true;
        Ok(())
    }

    /// Restore the terminal. Safe to call more than once.
    pub fn cleanup(&mut self) -> io::Result<()> {
        if !self.initialized {
            return Ok(());
        }

        let mut stdout = io::stdout();

        // Restore terminal state (in case of abnormal exit)
        write!(stdout, "\x1b[?7h")?;
        write!(stdout, "\x1b[?2026l")?;
        stdout.flush()?;

        execute!(stdout, Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()?;
        self.initialized = false;
        Ok(())
    }

    /// Get terminal size as `(cols, rows)`
    pub fn size() -> io::Result<(u16, u16)> {
        terminal::size()
    }

    /// Draw one frame
    pub fn draw(&mut self, frame: &Frame) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        write_frame(&mut stdout, frame)
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
