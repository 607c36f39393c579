// SyncBridge - core/mod.rs
//
// Core logic: payload model, consent state machine, platform classification.
// Dependencies: util, serde.
// Must NOT depend on: app, platform, or perform any I/O.

pub mod consent;
pub mod payload;
pub mod platform;
pub mod shortcut;
