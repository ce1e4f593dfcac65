//! Status fields
//!
//! A status field is a pure function of the current state and the line it
//! is drawn on, returning a new line of the same width. Fields are
//! registered as two ordered lists: `top[i]` owns screen line `i`,
//! `bottom[i]` owns line `height - 1 - i`.
//!
//! Several fields can share a line by splicing from the left and then from
//! the right; later splices win where they overlap.

use std::process::Command;

use chrono::{NaiveTime, Timelike};

use crate::wm::{Window, Workspaces};

use super::line::Line;

/// Everything a status field may look at
pub struct StatusContext<'a> {
    pub width: u16,
    pub height: u16,
    pub mode: &'static str,
    pub clock: NaiveTime,
    pub view: Workspaces,
    /// Window under the cursor, if any
    pub hovered: Option<&'a Window>,
    /// Text for the bottom line: a pending notice or the uptime
    pub bottom_text: &'a str,
}

pub type StatusField = fn(&StatusContext<'_>, &Line) -> Line;

/// Ordered top- and bottom-anchored status fields
#[derive(Clone)]
pub struct StatusFields {
    pub top: Vec<StatusField>,
    pub bottom: Vec<StatusField>,
}

impl Default for StatusFields {
    fn default() -> Self {
        Self {
            top: vec![screen_and_clock as StatusField, workspaces_and_hover],
            bottom: vec![bottom_text as StatusField],
        }
    }
}

impl StatusFields {
    pub fn empty() -> Self {
        Self {
            top: Vec::new(),
            bottom: Vec::new(),
        }
    }
}

/// `HH:MM:SS`, zero-padded
pub fn format_clock(hour: u32, min: u32, sec: u32) -> String {
    format!("{:02}:{:02}:{:02}", hour, min, sec)
}

/// `[W x H][mode]` on the left, the clock on the right
pub fn screen_and_clock(ctx: &StatusContext<'_>, line: &Line) -> Line {
    let left = format!("[{} x {}][{}]", ctx.width, ctx.height, ctx.mode);
    let clock = format_clock(ctx.clock.hour(), ctx.clock.minute(), ctx.clock.second());
    line.splice(0, &left).splice_right(&clock)
}

/// Visible workspaces on the left, the hovered window on the right
pub fn workspaces_and_hover(ctx: &StatusContext<'_>, line: &Line) -> Line {
    let left = format!("visWS: {:08b}", ctx.view.bits());
    let right = match ctx.hovered {
        Some(w) => {
            let exited = if w.session.is_running() { "" } else { "|exited" };
            format!("n:{}|id:{}|on:{:08b}{}", w.name, w.id, w.workspaces.bits(), exited)
        }
        None => "no window selected".to_string(),
    };
    line.splice(0, &left).splice_right(&right)
}

/// Notice or uptime, from the left
pub fn bottom_text(ctx: &StatusContext<'_>, line: &Line) -> Line {
    line.splice(0, ctx.bottom_text)
}

/// A source of status text
pub trait StatusProvider {
    fn text(&self) -> String;
}

/// Reports `uptime -p`, or a fixed string if the command fails
pub struct UptimeProvider;

pub const UPTIME_FALLBACK: &str = "uptime unavailable";

impl StatusProvider for UptimeProvider {
    fn text(&self) -> String {
        match Command::new("uptime").arg("-p").output() {
            Ok(out) if out.status.success() => {
                let text = String::from_utf8_lossy(&out.stdout).trim().to_string();
                if text.is_empty() {
                    UPTIME_FALLBACK.to_string()
                } else {
                    text
                }
            }
            _ => UPTIME_FALLBACK.to_string(),
        }
    }
}
