//! User interface rendering and input handling.
//!
//! This module provides all UI-related functionality:
//!
//! - **line**: Fixed-width cell rows with clipped overlay
//! - **status**: Status field functions and status text providers
//! - **text_field**: Rename field behind the `TextInput` capability
//! - **compositor**: Layered frame composition
//! - **renderer**: Terminal setup and frame output
//! - **keymapper**: Key events to window manager commands

pub mod compositor;
pub mod keymapper;
pub mod line;
pub mod renderer;
pub mod status;
pub mod text_field;

pub use keymapper::KeyMapper;
pub use renderer::Renderer;
pub use status::UptimeProvider;
