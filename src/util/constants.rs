// SyncBridge - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "SyncBridge";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "SyncBridge";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Configuration slot
// =============================================================================

/// Storage key of the single cloud-sync configuration slot.
///
/// Fixed and versionless: a payload shape change is handled by the old value
/// failing to deserialise and degrading to "absent", never by migration.
pub const CONFIG_STORAGE_KEY: &str = "cloud_sync_config";

/// File extension used by the file backend for each storage slot.
pub const SLOT_FILE_EXTENSION: &str = "json";

/// Extension of the sibling temp file written before the atomic rename.
pub const SLOT_TEMP_EXTENSION: &str = "json.tmp";

/// Largest stored value the file backend will read back, in bytes.
///
/// A configuration payload is a handful of short strings; anything larger
/// is treated as corrupt rather than loaded into memory.
pub const MAX_STORED_VALUE_BYTES: u64 = 1024 * 1024; // 1 MB

/// Name of the directory (under the platform data dir) holding storage slots.
pub const STORAGE_DIR_NAME: &str = "storage";

// =============================================================================
// Platform identifiers
// =============================================================================

/// Architecture identifiers reported by hosts for the 64-bit ARM family.
pub const ARM64_ARCH_IDENTIFIERS: &[&str] = &["aarch64", "arm64", "arm64e"];

// =============================================================================
// Shortcut glyphs
// =============================================================================

/// macOS Command key glyph.
pub const GLYPH_COMMAND: &str = "\u{2318}";

/// macOS Option key glyph.
pub const GLYPH_OPTION: &str = "\u{2325}";

/// macOS Shift key glyph.
pub const GLYPH_SHIFT: &str = "\u{21E7}";

/// macOS Control key glyph.
pub const GLYPH_CONTROL: &str = "\u{2303}";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log levels accepted in `[logging] level`.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// =============================================================================
// File names
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application state file name (stored in the platform data directory).
pub const STATE_FILE_NAME: &str = "state.json";
