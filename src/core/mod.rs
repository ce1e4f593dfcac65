//! Core session components.
//!
//! This module contains the process side of the window manager:
//!
//! - **pty**: portable-pty wrapper with the three-step release sequence
//! - **decode**: incremental UTF-8 decoder for chunked pty reads
//! - **session**: pty + reader thread + bounded queue, and the `Launcher` seam
//!
//! # Architecture
//!
//! ```text
//! Session
//! ├── Pty (shell process + master descriptor)
//! └── reader thread ── SyncSender<SessionMessage> ──▶ Receiver (relay)
//! ```

pub mod decode;
pub mod pty;
pub mod session;

pub use session::ShellLauncher;
