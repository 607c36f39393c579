// SyncBridge - platform/mod.rs
//
// Platform abstraction layer: directories, config.toml, host signals, and
// atomic file I/O.
// Dependencies: core (host probe traits), util, directories crate.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
pub mod host;
