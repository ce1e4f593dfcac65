//! Layered compositor
//!
//! Builds one frame from the current state. Layers are applied in a fixed
//! order and each may overwrite cells written by the ones before it:
//!
//! ```text
//! 1. background   tile the active pattern across the screen
//! 2. status       top- and bottom-anchored status fields
//! 3. windows      visible windows, bottom of the stack first
//! 4. cursor       one glyph, always above every window
//! 5. field        rename field, flush right on the last line
//! ```
//!
//! Every write goes through `Line::overlay`, which clips to the screen, so a
//! window hanging off any edge or a field longer than the line never aborts
//! a frame.

use std::fmt;

use crate::wm::Window;

use super::line::{cells_of, Cell, Line};
use super::status::{StatusContext, StatusFields};

/// Placeholder shown until the first size notification
pub const LOADING: &str = "still loading";

/// Rounded border characters
struct BorderChars {
    top_left: char,
    top_right: char,
    bottom_left: char,
    bottom_right: char,
    horizontal: char,
    vertical: char,
}

impl BorderChars {
    fn rounded() -> Self {
        Self {
            top_left: '╭',
            top_right: '╮',
            bottom_left: '╰',
            bottom_right: '╯',
            horizontal: '─',
            vertical: '│',
        }
    }
}

/// A composed screen
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    lines: Vec<Line>,
}

impl Frame {
    pub fn loading() -> Self {
        Self {
            lines: vec![Line::from_text(LOADING)],
        }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Rendered text of row `y`
    #[cfg(test)]
    pub fn row(&self, y: usize) -> Option<String> {
        self.lines.get(y).map(|l| l.to_string())
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// State the compositor reads for one frame
pub struct Scene<'a> {
    pub width: u16,
    pub height: u16,
    /// Rows of the active background pattern
    pub pattern: &'a [String],
    pub status: StatusContext<'a>,
    /// Visible windows, bottom to top
    pub windows: Vec<&'a Window>,
    pub cursor: (u16, u16),
    /// Rendered rename field, when it is focused
    pub field: Option<String>,
}

/// Turns a `Scene` into a `Frame`
pub struct Compositor {
    fields: StatusFields,
    cursor_glyph: Vec<Cell>,
}

impl Compositor {
    pub fn new(fields: StatusFields, cursor_glyph: char) -> Self {
        let mut glyph = cells_of(&cursor_glyph.to_string());
        if glyph.is_empty() {
            glyph = vec![Cell::Glyph('^')];
        }
        Self {
            fields,
            cursor_glyph: glyph,
        }
    }

    pub fn compose(&self, scene: &Scene<'_>) -> Frame {
        let width = scene.width as usize;
        let height = scene.height as usize;

        let mut lines = fill_background(scene.pattern, width, height);
        self.draw_status(&mut lines, scene);
        for window in &scene.windows {
            draw_window(&mut lines, window);
        }
        self.draw_cursor(&mut lines, scene.cursor);
        if let Some(field) = &scene.field {
            draw_field(&mut lines, field);
        }

        Frame { lines }
    }

    fn draw_status(&self, lines: &mut [Line], scene: &Scene<'_>) {
        let height = lines.len();
        let width = scene.width as usize;

        for (i, field) in self.fields.top.iter().enumerate() {
            if let Some(line) = lines.get_mut(i) {
                *line = field(&scene.status, line).with_width(width);
            }
        }
        for (i, field) in self.fields.bottom.iter().enumerate() {
            if i >= height {
                break;
            }
            let line = &mut lines[height - 1 - i];
            *line = field(&scene.status, line).with_width(width);
        }
    }

    fn draw_cursor(&self, lines: &mut [Line], (x, y): (u16, u16)) {
        if let Some(line) = lines.get_mut(y as usize) {
            *line = line.overlay(x as i32, &self.cursor_glyph);
        }
    }
}

/// Tile `pattern` to exactly `width x height`: each row is repeated across
/// the width, then the rows are repeated down from the pattern's start.
pub fn fill_background(pattern: &[String], width: usize, height: usize) -> Vec<Line> {
    let rows: Vec<Line> = pattern
        .iter()
        .map(|row| Line::tile(&Line::from_text(row), width))
        .collect();
    if rows.is_empty() {
        return vec![Line::blank(width); height];
    }
    (0..height).map(|y| rows[y % rows.len()].clone()).collect()
}

/// Paint one window: border, optional title, then the newest content lines
fn draw_window(lines: &mut [Line], window: &Window) {
    let chars = BorderChars::rounded();
    let rect = window.rect;
    let cols = rect.cols as usize;
    let inner_w = cols.saturating_sub(2);
    let (_, inner_h) = rect.inner_size();

    let mut top = Vec::with_capacity(cols);
    top.push(Cell::Glyph(chars.top_left));
    top.extend(std::iter::repeat(Cell::Glyph(chars.horizontal)).take(inner_w));
    top.push(Cell::Glyph(chars.top_right));
    if !window.name.is_empty() && inner_w > 2 {
        let mut title = cells_of(&format!(" {} ", window.name));
        title.truncate(inner_w);
        let at = 1 + (inner_w - title.len()) / 2;
        top = Line::from_cells(top).overlay(at as i32, &title).cells().to_vec();
    }
    put_row(lines, rect.top, rect.left, &top);

    let body = window.content.tail(inner_h as usize);
    for row in 0..inner_h as usize {
        let text = body.get(row).map(String::as_str).unwrap_or("");
        let mut cells = Vec::with_capacity(cols);
        cells.push(Cell::Glyph(chars.vertical));
        cells.extend_from_slice(Line::fit(text, inner_w).cells());
        cells.push(Cell::Glyph(chars.vertical));
        put_row(lines, rect.top + 1 + row as i32, rect.left, &cells);
    }

    let mut bottom = Vec::with_capacity(cols);
    bottom.push(Cell::Glyph(chars.bottom_left));
    bottom.extend(std::iter::repeat(Cell::Glyph(chars.horizontal)).take(inner_w));
    bottom.push(Cell::Glyph(chars.bottom_right));
    put_row(lines, rect.bottom(), rect.left, &bottom);
}

/// Overlay `cells` on screen row `y` at column `x`, if that row exists
fn put_row(lines: &mut [Line], y: i32, x: i32, cells: &[Cell]) {
    if y < 0 {
        return;
    }
    if let Some(line) = lines.get_mut(y as usize) {
        *line = line.overlay(x, cells);
    }
}

fn draw_field(lines: &mut [Line], field: &str) {
    if let Some(last) = lines.last_mut() {
        *last = last.splice_right(field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::DetachedLauncher;
    use crate::wm::{WindowStore, Workspaces};
    use chrono::NaiveTime;
    use unicode_width::UnicodeWidthStr;

    fn status<'a>(width: u16, height: u16) -> StatusContext<'a> {
        StatusContext {
            width,
            height,
            mode: "select",
            clock: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            view: Workspaces::WS1,
            hovered: None,
            bottom_text: "",
        }
    }

    fn dots() -> Vec<String> {
        vec![".".to_string()]
    }

    fn scene<'a>(pattern: &'a [String], windows: Vec<&'a Window>, w: u16, h: u16) -> Scene<'a> {
        Scene {
            width: w,
            height: h,
            pattern,
            status: status(w, h),
            windows,
            cursor: (0, 0),
            field: None,
        }
    }

    fn bare() -> Compositor {
        Compositor::new(StatusFields::empty(), '^')
    }

    #[test]
    fn test_background_tiles_rows_and_lines() {
        let pattern = vec!["ab".to_string(), "cd".to_string(), "ef".to_string()];
        let lines = fill_background(&pattern, 5, 4);
        let rows: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        assert_eq!(rows, vec!["ababa", "cdcdc", "efefe", "ababa"]);
    }

    #[test]
    fn test_background_dimensions() {
        let pattern = vec![" / __ \\ \\__/".to_string(), "/ /  \\ \\____".to_string()];
        for (w, h) in [(1, 1), (7, 3), (80, 24), (13, 1)] {
            let lines = fill_background(&pattern, w, h);
            assert_eq!(lines.len(), h);
            assert!(lines.iter().all(|l| l.len() == w));
        }
    }

    #[test]
    fn test_window_border_and_content() {
        let launcher = DetachedLauncher::new();
        let mut store = WindowStore::new();
        let id = store.spawn_window(&launcher, 1, 1, 4, 6, Workspaces::WS1).unwrap();
        launcher.emit(id, "hi\nworld!!");
        for msg in store.collect_output(64) {
            store.apply_output(msg);
        }

        let pattern = dots();
        let windows: Vec<&Window> = store.windows().iter().collect();
        let frame = bare().compose(&scene(&pattern, windows, 9, 6));

        assert_eq!(frame.row(1).unwrap(), ".╭────╮..");
        assert_eq!(frame.row(2).unwrap(), ".│hi  │..");
        assert_eq!(frame.row(3).unwrap(), ".│worl│..");
        assert_eq!(frame.row(4).unwrap(), ".╰────╯..");
        assert_eq!(frame.row(5).unwrap(), ".........");
    }

    #[test]
    fn test_window_shows_newest_lines() {
        let launcher = DetachedLauncher::new();
        let mut store = WindowStore::new();
        let id = store.spawn_window(&launcher, 0, 0, 4, 4, Workspaces::WS1).unwrap();
        launcher.emit(id, "a\nb\nc");
        for msg in store.collect_output(64) {
            store.apply_output(msg);
        }

        let pattern = dots();
        let windows: Vec<&Window> = store.windows().iter().collect();
        let frame = bare().compose(&scene(&pattern, windows, 4, 4));
        assert_eq!(frame.row(1).unwrap(), "│b │");
        assert_eq!(frame.row(2).unwrap(), "│c │");
    }

    #[test]
    fn test_upper_window_overwrites_lower() {
        let launcher = DetachedLauncher::new();
        let mut store = WindowStore::new();
        store.spawn_window(&launcher, 0, 0, 3, 4, Workspaces::WS1).unwrap();
        store.spawn_window(&launcher, 2, 0, 3, 4, Workspaces::WS1).unwrap();

        let pattern = dots();
        let windows: Vec<&Window> = store.windows().iter().collect();
        let frame = bare().compose(&scene(&pattern, windows, 7, 3));
        assert_eq!(frame.row(0).unwrap(), "╭─╭──╮.");
        assert_eq!(frame.row(1).unwrap(), "│ │  │.");
    }

    #[test]
    fn test_offscreen_window_is_clipped() {
        let launcher = DetachedLauncher::new();
        let mut store = WindowStore::new();
        store.spawn_window(&launcher, -2, -1, 4, 5, Workspaces::WS1).unwrap();
        store.spawn_window(&launcher, 4, 2, 10, 10, Workspaces::WS1).unwrap();

        let pattern = dots();
        let windows: Vec<&Window> = store.windows().iter().collect();
        let frame = bare().compose(&scene(&pattern, windows, 6, 4));
        assert_eq!(frame.lines().len(), 4);
        for line in frame.lines() {
            assert_eq!(line.len(), 6);
            assert_eq!(line.to_string().width(), 6);
        }
        assert_eq!(frame.row(0).unwrap(), "  │...");
        assert_eq!(frame.row(2).unwrap(), "──╯.╭─");
    }

    #[test]
    fn test_title_in_top_border() {
        let launcher = DetachedLauncher::new();
        let mut store = WindowStore::new();
        let id = store.spawn_window(&launcher, 0, 0, 3, 10, Workspaces::WS1).unwrap();
        store.get_mut(id).unwrap().name = "sh".to_string();

        let pattern = dots();
        let windows: Vec<&Window> = store.windows().iter().collect();
        let frame = bare().compose(&scene(&pattern, windows, 10, 3));
        assert_eq!(frame.row(0).unwrap(), "╭── sh ──╮");
    }

    #[test]
    fn test_cursor_is_topmost() {
        let launcher = DetachedLauncher::new();
        let mut store = WindowStore::new();
        store.spawn_window(&launcher, 0, 0, 3, 3, Workspaces::WS1).unwrap();

        let pattern = dots();
        let windows: Vec<&Window> = store.windows().iter().collect();
        let mut s = scene(&pattern, windows, 4, 3);
        s.cursor = (1, 1);
        let frame = bare().compose(&s);
        assert_eq!(frame.row(1).unwrap(), "│^│.");
    }

    #[test]
    fn test_status_then_field_overlay() {
        let pattern = dots();
        let mut s = scene(&pattern, Vec::new(), 30, 5);
        s.status.bottom_text = "up 3 hours";
        s.field = Some("> name   ".to_string());
        let frame = Compositor::new(StatusFields::default(), '^').compose(&s);

        assert!(frame.row(0).unwrap().starts_with("[30 x 5][select]"));
        assert!(frame.row(0).unwrap().ends_with("12:00:00"));
        assert!(frame.row(1).unwrap().ends_with("no window selected"));
        assert_eq!(frame.row(4).unwrap(), "up 3 hours...........> name   ");
    }

    #[test]
    fn test_field_wider_than_screen_is_clipped() {
        let pattern = dots();
        let mut s = scene(&pattern, Vec::new(), 4, 2);
        s.field = Some("> renaming".to_string());
        let frame = bare().compose(&s);
        assert_eq!(frame.row(1).unwrap(), "> re");
    }

    #[test]
    fn test_loading_frame() {
        assert_eq!(Frame::loading().to_string(), LOADING);
    }
}
