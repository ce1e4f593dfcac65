//! Window Manager - floating windows, workspaces and interaction modes.
//!
//! This module provides the core window management functionality:
//!
//! - **workspace**: 8-bit workspace membership masks
//! - **window**: Window geometry, content buffer and owned session
//! - **store**: Z-ordered window stack with hit-testing and output relay
//! - **controller**: Cursor and the select/move/resize state machine
//!
//! # Module Hierarchy
//!
//! ```text
//! wm/
//! ├── mod.rs         - Module exports
//! ├── controller.rs  - Controller (cursor + mode)
//! ├── store.rs       - WindowStore (z-stack)
//! ├── window.rs      - Window, Rect, Content
//! └── workspace.rs   - Workspaces bitflags
//! ```

pub mod controller;
pub mod store;
pub mod window;
pub mod workspace;

pub use controller::{Controller, Direction};
pub use store::WindowStore;
pub use window::{Window, MIN_SIZE};
pub use workspace::Workspaces;
