// SyncBridge - lib.rs
//
// Library entry point: the configuration bridge, consent gate, and platform
// detection used by both the landing surface and the desktop shell.
//
// The command-line shell lives in `main.rs` and is not part of the library
// surface.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
