// SyncBridge - platform/config.rs
//
// Platform-specific directory resolution and config.toml loading with
// startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::fmt;
use std::path::{Path, PathBuf};

/// Resolved platform paths for SyncBridge data and configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/syncbridge/ or %APPDATA%\SyncBridge\config\)
    pub config_dir: PathBuf,

    /// Data directory holding the state file.
    pub data_dir: PathBuf,

    /// Directory holding storage slots (`<data_dir>/storage`).
    pub storage_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let paths = Self::rooted(proj_dirs.config_dir(), proj_dirs.data_dir());
            tracing::debug!(
                config = %paths.config_dir.display(),
                data = %paths.data_dir.display(),
                storage = %paths.storage_dir.display(),
                "Platform paths resolved"
            );
            paths
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            let fallback = PathBuf::from(".");
            Self::rooted(&fallback, &fallback)
        }
    }

    /// Paths with every directory under a single root (`--data-dir`).
    /// `config.toml` is then read from the root itself.
    pub fn under(root: &Path) -> Self {
        Self::rooted(&root.join("config"), root)
    }

    fn rooted(config_dir: &Path, data_dir: &Path) -> Self {
        Self {
            config_dir: config_dir.to_path_buf(),
            data_dir: data_dir.to_path_buf(),
            storage_dir: data_dir.join(constants::STORAGE_DIR_NAME),
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[storage]` section.
    pub storage: StorageSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[storage]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Backend: "file", "memory", or "none".
    pub backend: Option<String>,
    /// Directory override for storage slots.
    pub directory: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Which durable-storage facility the configuration slot uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// JSON file per slot under the storage directory.
    #[default]
    File,
    /// Process memory only (lost on exit).
    Memory,
    /// No backend: saves are dropped, loads are absent.
    Disabled,
}

impl BackendKind {
    /// Parse a `[storage] backend` value (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "file" => Some(Self::File),
            "memory" => Some(Self::Memory),
            "none" => Some(Self::Disabled),
            _ => None,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Memory => f.write_str("memory"),
            Self::Disabled => f.write_str("none"),
        }
    }
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    // -- Storage --
    /// Backend for the configuration slot.
    pub backend: BackendKind,
    /// Storage directory override (None = platform default).
    pub storage_dir: Option<PathBuf>,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Log file path.
    pub log_file: Option<String>,
}

/// Load and validate `config.toml` for the given config directory.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first-run).
/// If the file is unparseable, returns defaults with a warning: the
/// application still starts but the user is informed.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    let config_path = config_path(config_dir);
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(source) => {
            let err = ConfigError::Io {
                path: config_path.clone(),
                source,
            };
            let msg = format!("{err}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    let (config, parse_warnings) = parse_config(&content, &config_path);
    warnings.extend(parse_warnings);

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}

/// Path of `config.toml`: one level above the platform config dir, so the
/// user-visible location is the application folder itself.
pub fn config_path(config_dir: &Path) -> PathBuf {
    config_dir
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(config_dir)
        .join(constants::CONFIG_FILE_NAME)
}

/// Validate config.toml content. `origin` is used in messages only.
pub fn parse_config(content: &str, origin: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    let raw: RawConfig = match toml::from_str(content) {
        Ok(r) => r,
        Err(source) => {
            let err = ConfigError::TomlParse {
                path: origin.to_path_buf(),
                source,
            };
            let msg = format!("{err}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %origin.display(), "Loaded config.toml");

    let mut config = AppConfig::default();

    // -- Storage: backend --
    if let Some(ref backend) = raw.storage.backend {
        match BackendKind::parse(backend) {
            Some(kind) => config.backend = kind,
            None => warnings.push(format!(
                "{}. Using default (file).",
                ConfigError::InvalidValue {
                    field: "storage.backend".to_string(),
                    value: backend.clone(),
                    expected: "\"file\", \"memory\" or \"none\"".to_string(),
                }
            )),
        }
    }

    // -- Storage: directory --
    if let Some(ref dir) = raw.storage.directory {
        if !dir.trim().is_empty() {
            config.storage_dir = Some(PathBuf::from(dir));
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        if constants::VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "{}. Using default (info).",
                ConfigError::InvalidValue {
                    field: "logging.level".to_string(),
                    value: level.clone(),
                    expected: constants::VALID_LOG_LEVELS.join(", "),
                }
            ));
        }
    }

    // -- Logging: file --
    if let Some(ref file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file.clone());
        }
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn origin() -> PathBuf {
        PathBuf::from("config.toml")
    }

    #[test]
    fn test_missing_config_uses_defaults_silently() {
        let dir = TempDir::new().unwrap();
        let (config, warnings) = load_config(&dir.path().join("config"));
        assert!(warnings.is_empty());
        assert_eq!(config.backend, BackendKind::File);
        assert!(config.storage_dir.is_none());
    }

    #[test]
    fn test_valid_config_is_applied() {
        let (config, warnings) = parse_config(
            r#"
            [storage]
            backend = "Memory"
            directory = "/srv/syncbridge"

            [logging]
            level = "debug"
            "#,
            &origin(),
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.storage_dir, Some(PathBuf::from("/srv/syncbridge")));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_invalid_values_warn_and_fall_back() {
        let (config, warnings) = parse_config(
            "[storage]\nbackend = \"cloud\"\n[logging]\nlevel = \"loud\"\n",
            &origin(),
        );
        assert_eq!(warnings.len(), 2, "{warnings:?}");
        assert_eq!(config.backend, BackendKind::File);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_unparseable_config_warns() {
        let (config, warnings) = parse_config("[storage\nbackend=", &origin());
        assert_eq!(warnings.len(), 1);
        assert_eq!(config.backend, BackendKind::File);
    }

    #[test]
    fn test_unknown_sections_are_ignored() {
        let (_, warnings) = parse_config("[future]\nflag = true\n", &origin());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_load_config_reads_file_above_config_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(constants::CONFIG_FILE_NAME),
            "[storage]\nbackend = \"none\"\n",
        )
        .unwrap();
        let (config, warnings) = load_config(&dir.path().join("config"));
        assert!(warnings.is_empty());
        assert_eq!(config.backend, BackendKind::Disabled);
    }
}
