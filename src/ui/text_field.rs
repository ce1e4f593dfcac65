//! Single-line text input used for renaming windows.
//!
//! The rest of the program only talks to it through [`TextInput`], so the
//! widget can be swapped without touching the controller or compositor.

use unicode_width::UnicodeWidthChar;

/// An edit applied to a focused field
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldEdit {
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
}

/// Capabilities of a text field
pub trait TextInput {
    fn focus(&mut self);
    fn blur(&mut self);
    fn is_focused(&self) -> bool;
    fn value(&self) -> String;
    fn set_value(&mut self, value: &str);
    fn reset(&mut self);
    /// Apply an edit. Ignored while blurred.
    fn edit(&mut self, edit: FieldEdit);
    /// Prompt followed by the visible part of the value, padded to exactly
    /// `prompt width + width` columns.
    fn render(&self, width: usize) -> String;
}

/// Default `TextInput` implementation
#[derive(Debug, Clone)]
pub struct TextField {
    prompt: String,
    value: Vec<char>,
    /// Caret position in chars
    caret: usize,
    focused: bool,
    limit: usize,
}

impl TextField {
    pub fn new(prompt: &str, limit: usize) -> Self {
        Self {
            prompt: prompt.to_string(),
            value: Vec::new(),
            caret: 0,
            focused: false,
            limit,
        }
    }
}

fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

impl TextInput for TextField {
    fn focus(&mut self) {
        self.focused = true;
    }

    fn blur(&mut self) {
        self.focused = false;
    }

    fn is_focused(&self) -> bool {
        self.focused
    }

    fn value(&self) -> String {
        self.value.iter().collect()
    }

    fn set_value(&mut self, value: &str) {
        self.value = value.chars().filter(|c| !c.is_control()).take(self.limit).collect();
        self.caret = self.value.len();
    }

    fn reset(&mut self) {
        self.value.clear();
        self.caret = 0;
    }

    fn edit(&mut self, edit: FieldEdit) {
        if !self.focused {
            return;
        }
        match edit {
            FieldEdit::Insert(ch) => {
                if !ch.is_control() && self.value.len() < self.limit {
                    self.value.insert(self.caret, ch);
                    self.caret += 1;
                }
            }
            FieldEdit::Backspace => {
                if self.caret > 0 {
                    self.caret -= 1;
                    self.value.remove(self.caret);
                }
            }
            FieldEdit::Delete => {
                if self.caret < self.value.len() {
                    self.value.remove(self.caret);
                }
            }
            FieldEdit::Left => self.caret = self.caret.saturating_sub(1),
            FieldEdit::Right => self.caret = (self.caret + 1).min(self.value.len()),
            FieldEdit::Home => self.caret = 0,
            FieldEdit::End => self.caret = self.value.len(),
        }
    }

    fn render(&self, width: usize) -> String {
        // Scroll so the caret stays in view, keeping the tail when it fits
        let mut start = 0;
        let mut used: usize = self.value[..self.caret].iter().map(|&c| char_width(c)).sum();
        while used >= width && start < self.caret {
            used -= char_width(self.value[start]);
            start += 1;
        }

        let mut out = self.prompt.clone();
        let mut filled = 0;
        for &ch in &self.value[start..] {
            let w = char_width(ch);
            if filled + w > width {
                break;
            }
            out.push(ch);
            filled += w;
        }
        out.extend(std::iter::repeat(' ').take(width - filled));
        out
    }
}
