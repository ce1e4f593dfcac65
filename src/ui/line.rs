//! Screen lines as cell sequences
//!
//! A `Line` is a fixed-width row of cells. Every edit builds a new line from
//! three segments (untouched prefix, overwrite, untouched suffix) and clips
//! the overwrite to the line, so no edit can index past the end or change
//! the line's width.
//!
//! Wide characters occupy a `Glyph` followed by a `Continuation` cell. An
//! overwrite that splits such a pair leaves half of it behind; `render`
//! turns any orphaned half into a space so the printed width never drifts.

use std::fmt;

use unicode_width::UnicodeWidthChar;

/// One screen cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Glyph(char),
    /// Right half of a double-width glyph
    Continuation,
}

impl Cell {
    pub const BLANK: Cell = Cell::Glyph(' ');
}

/// Convert text to cells. Control characters and zero-width characters are
/// dropped; double-width characters take two cells.
pub fn cells_of(text: &str) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_control() {
            continue;
        }
        match ch.width() {
            Some(1) => cells.push(Cell::Glyph(ch)),
            Some(2) => {
                cells.push(Cell::Glyph(ch));
                cells.push(Cell::Continuation);
            }
            _ => {}
        }
    }
    cells
}

/// A row of cells of fixed width
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Line {
    cells: Vec<Cell>,
}

impl Line {
    pub fn blank(width: usize) -> Self {
        Self {
            cells: vec![Cell::BLANK; width],
        }
    }

    pub fn from_cells(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Text as cells, at its natural width
    pub fn from_text(text: &str) -> Self {
        Self::from_cells(cells_of(text))
    }

    /// Text truncated or space-padded to exactly `width` cells
    pub fn fit(text: &str, width: usize) -> Self {
        let mut cells = cells_of(text);
        cells.resize(width, Cell::BLANK);
        Self { cells }
    }

    /// Repeat `pattern` to exactly `width` cells: whole copies, then a
    /// partial one. An empty pattern yields blanks.
    pub fn tile(pattern: &Line, width: usize) -> Self {
        if pattern.is_empty() {
            return Self::blank(width);
        }
        let cells = pattern.cells.iter().copied().cycle().take(width).collect();
        Self { cells }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// New line with `text` written starting at column `at`.
    ///
    /// `at` may be negative or past the end; whatever falls outside the line
    /// is clipped. The result always has the same width as `self`.
    pub fn overlay(&self, at: i32, text: &[Cell]) -> Line {
        let width = self.cells.len() as i64;
        let start = at as i64;
        let end = start + text.len() as i64;

        let from = start.clamp(0, width) as usize;
        let to = end.clamp(0, width) as usize;
        if from >= to {
            return self.clone();
        }
        let skip = (from as i64 - start) as usize;

        let mut cells = Vec::with_capacity(self.cells.len());
        cells.extend_from_slice(&self.cells[..from]);
        cells.extend_from_slice(&text[skip..skip + (to - from)]);
        cells.extend_from_slice(&self.cells[to..]);
        Line { cells }
    }

    /// `overlay` for a string
    pub fn splice(&self, at: i32, text: &str) -> Line {
        self.overlay(at, &cells_of(text))
    }

    /// Write `text` so that it ends at the last column. Text wider than the
    /// line keeps its leading part.
    pub fn splice_right(&self, text: &str) -> Line {
        let cells = cells_of(text);
        let at = self.cells.len() as i64 - cells.len() as i64;
        if at >= 0 {
            self.overlay(at as i32, &cells)
        } else {
            self.overlay(0, &cells)
        }
    }

    /// Pad or cut to exactly `width` cells
    pub fn with_width(mut self, width: usize) -> Line {
        self.cells.resize(width, Cell::BLANK);
        self
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::with_capacity(self.cells.len());
        let mut i = 0;
        while i < self.cells.len() {
            match self.cells[i] {
                Cell::Glyph(ch) if ch.width() == Some(2) => {
                    if self.cells.get(i + 1) == Some(&Cell::Continuation) {
                        out.push(ch);
                        i += 2;
                        continue;
                    }
                    out.push(' ');
                }
                Cell::Glyph(ch) => out.push(ch),
                Cell::Continuation => out.push(' '),
            }
            i += 1;
        }
        f.write_str(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unicode_width::UnicodeWidthStr;

    #[test]
    fn test_tile_exact_width() {
        for pattern in ["/|/ \\|\\ ", "_|__", "x", " / __ \\ \\__/"] {
            let row = Line::from_text(pattern);
            for width in 1..40 {
                let line = Line::tile(&row, width);
                assert_eq!(line.len(), width);
                assert_eq!(line.to_string().width(), width);
            }
        }
    }

    #[test]
    fn test_tile_partial_remainder() {
        let line = Line::tile(&Line::from_text("abc"), 7);
        assert_eq!(line.to_string(), "abcabca");
    }

    #[test]
    fn test_tile_empty_pattern() {
        assert_eq!(Line::tile(&Line::default(), 3).to_string(), "   ");
    }

    #[test]
    fn test_splice_keeps_tail() {
        let line = Line::from_text("..........");
        assert_eq!(line.splice(0, "abc").to_string(), "abc.......");
        assert_eq!(line.splice(4, "xy").to_string(), "....xy....");
    }

    #[test]
    fn test_splice_clips_both_ends() {
        let line = Line::from_text("......");
        assert_eq!(line.splice(-2, "abcd").to_string(), "cd....");
        assert_eq!(line.splice(4, "abcd").to_string(), "....ab");
        assert_eq!(line.splice(10, "abcd").to_string(), "......");
        assert_eq!(line.splice(-10, "abcd").to_string(), "......");
    }

    #[test]
    fn test_splice_right() {
        let line = Line::from_text("..........");
        assert_eq!(line.splice_right("12:00").to_string(), ".....12:00");
        assert_eq!(Line::from_text("...").splice_right("abcdef").to_string(), "abc");
    }

    #[test]
    fn test_wide_glyph_split_renders_space() {
        let line = Line::from_text("日本");
        assert_eq!(line.len(), 4);
        let cut = line.splice(1, "x");
        assert_eq!(cut.len(), 4);
        assert_eq!(cut.to_string(), " x本");
        assert_eq!(cut.to_string().width(), 4);
    }

    #[test]
    fn test_control_chars_dropped() {
        assert_eq!(Line::from_text("a\r\tb\x1b").to_string(), "ab");
        assert_eq!(Line::fit("ab", 4).to_string(), "ab  ");
        assert_eq!(Line::fit("abcdef", 4).to_string(), "abcd");
    }
}
