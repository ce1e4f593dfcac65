//! Application state and the update/view cycle.
//!
//! The event loop in `main` feeds one `Event` at a time into `App::update`
//! and draws `App::view` whenever the state changed. All window, cursor and
//! mode state is mutated here, on the loop's thread; session reader threads
//! only ever produce `SessionMessage`s.

use chrono::NaiveTime;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::core::session::{Launcher, SessionMessage};
use crate::ui::compositor::{Compositor, Frame, Scene};
use crate::ui::keymapper::Command;
use crate::ui::status::{StatusContext, StatusFields, StatusProvider};
use crate::ui::text_field::{TextField, TextInput};
use crate::wm::{Controller, WindowStore};

/// Ticks a notice stays on the bottom line
const NOTICE_TICKS: u8 = 5;

/// One input to the state machine
#[derive(Debug)]
pub enum Event {
    /// Periodic one-second timer, carrying the wall clock
    Tick(NaiveTime),
    /// Screen size as `(cols, rows)`
    Resize(u16, u16),
    Command(Command),
    Output(SessionMessage),
}

/// Whether the loop should keep going
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Temporary message replacing the bottom status text
struct Notice {
    text: String,
    ticks_left: u8,
}

/// The window manager
pub struct App {
    launcher: Box<dyn Launcher>,
    store: WindowStore,
    controller: Controller,
    field: Box<dyn TextInput>,
    rename_width: usize,
    window_lines: u16,
    window_cols: u16,
    backgrounds: Vec<Vec<String>>,
    background: usize,
    clock: NaiveTime,
    status_provider: Box<dyn StatusProvider>,
    status_text: String,
    notice: Option<Notice>,
    compositor: Compositor,
    drain_budget: usize,
    dirty: bool,
}

impl App {
    pub fn new(
        config: &Config,
        launcher: Box<dyn Launcher>,
        status_provider: Box<dyn StatusProvider>,
    ) -> Self {
        let status_text = status_provider.text();
        Self {
            launcher,
            store: WindowStore::new(),
            controller: Controller::new(),
            field: Box::new(TextField::new(&config.rename.prompt, 256)),
            rename_width: config.rename.width,
            window_lines: config.window.lines,
            window_cols: config.window.cols,
            backgrounds: config.backgrounds.clone(),
            background: config.background,
            clock: NaiveTime::MIN,
            status_provider,
            status_text,
            notice: None,
            compositor: Compositor::new(StatusFields::default(), config.cursor_glyph),
            drain_budget: config.drain.budget_per_frame,
            dirty: true,
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &WindowStore {
        &self.store
    }

    #[cfg(test)]
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    #[cfg(test)]
    pub fn background(&self) -> usize {
        self.background
    }

    /// True while the rename field has focus
    pub fn is_editing(&self) -> bool {
        self.field.is_focused()
    }

    /// Text currently shown on the bottom status line
    pub fn bottom_text(&self) -> &str {
        match &self.notice {
            Some(notice) => &notice.text,
            None => &self.status_text,
        }
    }

    /// Returns true, once, after any state change
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Apply one event
    pub fn update(&mut self, event: Event) -> Flow {
        match event {
            Event::Tick(now) => {
                self.clock = now;
                self.status_text = self.status_provider.text();
                if let Some(notice) = &mut self.notice {
                    notice.ticks_left = notice.ticks_left.saturating_sub(1);
                    if notice.ticks_left == 0 {
                        self.notice = None;
                    }
                }
                self.dirty = true;
            }
            Event::Resize(cols, rows) => {
                debug!("Screen resized to {}x{}", cols, rows);
                self.controller.resize_screen(cols, rows);
                self.controller.revalidate(&self.store);
                self.dirty = true;
            }
            Event::Command(cmd) => {
                let flow = self.handle_command(cmd);
                self.dirty = true;
                return flow;
            }
            Event::Output(msg) => {
                if self.store.apply_output(msg) {
                    self.dirty = true;
                }
            }
        }
        Flow::Continue
    }

    /// Relay pass over every session queue, applying each message as its
    /// own event. Returns the number of messages taken.
    pub fn drain_output(&mut self) -> usize {
        let messages = self.store.collect_output(self.drain_budget);
        let count = messages.len();
        for msg in messages {
            self.update(Event::Output(msg));
        }
        count
    }

    fn handle_command(&mut self, cmd: Command) -> Flow {
        match cmd {
            Command::Quit => {
                info!("Quit requested, closing {} windows", self.store.len());
                self.store.close_all();
                return Flow::Quit;
            }
            Command::CycleBackground => {
                self.background = (self.background + 1) % self.backgrounds.len().max(1);
            }
            Command::Spawn => self.spawn_at_cursor(),
            Command::Raise => {
                if let Some(id) = self.controller.hovered(&self.store) {
                    self.store.raise(id);
                }
            }
            Command::Close => {
                if let Some(id) = self.controller.hovered(&self.store) {
                    self.store.remove(id);
                    self.controller.revalidate(&self.store);
                }
            }
            Command::Step(dir) => self.controller.step(&mut self.store, dir),
            Command::ToggleMove => self.controller.toggle_move(&self.store),
            Command::ToggleResize => self.controller.toggle_resize(&self.store),
            Command::RenameStart => {
                if self.field.is_focused() {
                    return Flow::Continue;
                }
                if let Some(window) = self
                    .controller
                    .hovered(&self.store)
                    .and_then(|id| self.store.get(id))
                {
                    self.field.set_value(&window.name);
                    self.field.focus();
                }
            }
            Command::RenameCommit => {
                if !self.field.is_focused() {
                    return Flow::Continue;
                }
                let value = self.field.value();
                if let Some(id) = self.controller.hovered(&self.store) {
                    if let Some(window) = self.store.get_mut(id) {
                        info!(window = id, name = %value, "window renamed");
                        window.name = value;
                    }
                }
                self.field.blur();
                self.field.reset();
            }
            Command::RenameCancel => {
                self.field.blur();
                self.field.reset();
            }
            Command::ToggleWorkspace(index) => {
                self.controller.toggle_workspace(&mut self.store, index);
            }
            Command::Edit(edit) => self.field.edit(edit),
        }
        Flow::Continue
    }

    fn spawn_at_cursor(&mut self) {
        let (x, y) = self.controller.cursor();
        let result = self.store.spawn_window(
            self.launcher.as_ref(),
            x as i32,
            y as i32,
            self.window_lines,
            self.window_cols,
            self.controller.view(),
        );
        if let Err(e) = result {
            error!("Failed to spawn window: {}", e);
            self.notice = Some(Notice {
                text: e.to_string(),
                ticks_left: NOTICE_TICKS,
            });
        }
    }

    /// Compose the current frame
    pub fn view(&self) -> Frame {
        if !self.controller.is_sized() {
            return Frame::loading();
        }
        let (width, height) = self.controller.size();
        let view = self.controller.view();
        let hovered = self
            .controller
            .hovered(&self.store)
            .and_then(|id| self.store.get(id));

        let scene = Scene {
            width,
            height,
            pattern: self
                .backgrounds
                .get(self.background)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            status: StatusContext {
                width,
                height,
                mode: self.controller.mode().label(),
                clock: self.clock,
                view,
                hovered,
                bottom_text: self.bottom_text(),
            },
            windows: self.store.visible(view).collect(),
            cursor: self.controller.cursor(),
            field: self
                .field
                .is_focused()
                .then(|| self.field.render(self.rename_width)),
        };
        self.compositor.compose(&scene)
    }
}
