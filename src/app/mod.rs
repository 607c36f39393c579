// SyncBridge - app/mod.rs
//
// Application layer: configuration slot, state container, guarded sync.
// Dependencies: core, platform (atomic file I/O, backend selection), util.

pub mod state;
pub mod store;
pub mod sync;
