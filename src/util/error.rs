// SyncBridge - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// All errors preserve the causal chain for diagnostic logging.
//
// Storage errors never cross the public ConfigStore boundary: they are
// produced by the `try_*` operations, logged, and collapsed to "absent".

use crate::core::consent::ConsentState;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for SyncBridge operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum BridgeError {
    /// Configuration slot persistence failed.
    Storage(StorageError),

    /// A consent-guarded action was attempted without consent.
    Consent(ConsentError),

    /// User-supplied input (CLI argument or input file) is unusable.
    InvalidInput { origin: String, reason: String },

    /// A result could not be rendered as JSON for display.
    Output { source: serde_json::Error },

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {e}"),
            Self::Consent(e) => write!(f, "Consent error: {e}"),
            Self::InvalidInput { origin, reason } => write!(f, "Invalid input {origin}: {reason}"),
            Self::Output { source } => write!(f, "Failed to render output: {source}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for BridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Storage(e) => Some(e),
            Self::Consent(e) => Some(e),
            Self::InvalidInput { .. } => None,
            Self::Output { source } => Some(source),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

/// Errors related to the configuration storage slot.
#[derive(Debug)]
pub enum StorageError {
    /// No durable-storage facility exists in this execution context.
    BackendUnavailable,

    /// The stored value does not parse as a configuration payload.
    Deserialization {
        key: String,
        source: serde_json::Error,
    },

    /// The stored value exceeds the maximum readable size.
    ValueTooLarge { key: String, size: u64, max_size: u64 },

    /// The payload could not be serialised.
    Serialization { source: serde_json::Error },

    /// Backend I/O failed.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BackendUnavailable => {
                write!(f, "No durable storage backend is available")
            }
            Self::Deserialization { key, source } => {
                write!(f, "Stored value for '{key}' is malformed: {source}")
            }
            Self::ValueTooLarge {
                key,
                size,
                max_size,
            } => write!(
                f,
                "Stored value for '{key}' is {size} bytes, exceeds maximum of {max_size} bytes"
            ),
            Self::Serialization { source } => {
                write!(f, "Failed to serialise payload: {source}")
            }
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Deserialization { source, .. } => Some(source),
            Self::Serialization { source } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<StorageError> for BridgeError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is not one of the accepted values.
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::InvalidValue {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is not recognised. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Consent errors
// ---------------------------------------------------------------------------

/// Errors raised by the consent guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentError {
    /// Transmission was attempted while consent is not granted.
    NotGranted { state: ConsentState },
}

impl fmt::Display for ConsentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotGranted { state } => write!(
                f,
                "Cloud sync consent is {state}; user data may not leave this device"
            ),
        }
    }
}

impl std::error::Error for ConsentError {}

impl From<ConsentError> for BridgeError {
    fn from(e: ConsentError) -> Self {
        Self::Consent(e)
    }
}

/// Convenience type alias for SyncBridge results.
pub type Result<T> = std::result::Result<T, BridgeError>;
