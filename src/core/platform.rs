// SyncBridge - core/platform.rs
//
// Platform detection behind an injected host probe.
//
// The detector holds no derived state: every query re-reads the probe, so
// the answers follow the host (or a test that swaps the simulated host)
// without any invalidation logic. Classification is total; unrecognised
// identifiers fall back to Linux and are only logged.

use super::shortcut;
use crate::util::constants::ARM64_ARCH_IDENTIFIERS;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    #[serde(rename = "macos")]
    MacOs,
    Windows,
    Linux,
}

impl OsFamily {
    /// Classify a host OS identifier (`"macos"`, `"Darwin"`, `"Win32"`,
    /// `"Windows_NT"`, `"linux"`, ...).
    ///
    /// Returns the family and whether the identifier was recognised. The
    /// macOS check runs first because `darwin` contains `win`.
    pub fn classify(identifier: &str) -> (Self, bool) {
        let lower = identifier.to_ascii_lowercase();
        if lower.contains("mac") || lower.contains("darwin") {
            (Self::MacOs, true)
        } else if lower.contains("win") {
            (Self::Windows, true)
        } else {
            (Self::Linux, lower.contains("linux"))
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MacOs => "macos",
            Self::Windows => "windows",
            Self::Linux => "linux",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary shortcut modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModifierKey {
    Cmd,
    Ctrl,
}

impl fmt::Display for ModifierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cmd => f.write_str("Cmd"),
            Self::Ctrl => f.write_str("Ctrl"),
        }
    }
}

/// Snapshot of the platform facts. Derived on demand; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlatformDescriptor {
    pub os_family: OsFamily,
    pub modifier_key: ModifierKey,
    pub is_apple_silicon: bool,
}

/// Native shell capability for resolving the app-data directory.
///
/// Owned by the shell; the detector only delegates to it.
pub trait NativeBridge {
    fn app_data_path(&self) -> Result<PathBuf, String>;
}

/// Read-only host signals.
pub trait HostProbe {
    /// OS family identifier as the host reports it.
    fn os_identifier(&self) -> String;

    /// CPU architecture identifier as the host reports it.
    fn arch_identifier(&self) -> String;

    /// Native bridge, when running inside the desktop shell.
    fn native_bridge(&self) -> Option<&dyn NativeBridge> {
        None
    }
}

/// Plain environment descriptor with no native bridge.
///
/// Used to simulate any host in tests and for contexts (such as the web
/// landing surface) where only identifiers are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEnvironment {
    pub os: String,
    pub arch: String,
}

impl HostEnvironment {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }
}

impl HostProbe for HostEnvironment {
    fn os_identifier(&self) -> String {
        self.os.clone()
    }

    fn arch_identifier(&self) -> String {
        self.arch.clone()
    }
}

/// Platform classification over an injected host probe.
#[derive(Debug)]
pub struct PlatformDetector<H> {
    host: H,
}

impl<H: HostProbe> PlatformDetector<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    /// Mutable access to the probe, e.g. to simulate a host change.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Current OS family. Total: defaults to Linux.
    pub fn os(&self) -> OsFamily {
        let identifier = self.host.os_identifier();
        let (family, known) = OsFamily::classify(&identifier);
        if !known {
            tracing::debug!(
                identifier = %identifier,
                "Unknown platform identifier, defaulting to linux"
            );
        }
        family
    }

    /// `Cmd` on macOS, `Ctrl` everywhere else.
    pub fn modifier_key(&self) -> ModifierKey {
        match self.os() {
            OsFamily::MacOs => ModifierKey::Cmd,
            OsFamily::Windows | OsFamily::Linux => ModifierKey::Ctrl,
        }
    }

    /// Rewrite a neutral shortcut for the current host. Call once per raw
    /// combo string.
    pub fn format_shortcut(&self, combo: &str) -> String {
        shortcut::format_for(self.os(), combo)
    }

    /// macOS on an ARM64-family CPU.
    pub fn is_apple_silicon(&self) -> bool {
        if self.os() != OsFamily::MacOs {
            return false;
        }
        let arch = self.host.arch_identifier().to_ascii_lowercase();
        ARM64_ARCH_IDENTIFIERS.contains(&arch.as_str())
    }

    /// App-data directory reported by the native bridge.
    ///
    /// Empty when no bridge is present or the bridge fails; never an error.
    pub fn app_data_path(&self) -> String {
        let Some(bridge) = self.host.native_bridge() else {
            return String::new();
        };
        match bridge.app_data_path() {
            Ok(path) => path.to_string_lossy().into_owned(),
            Err(e) => {
                tracing::warn!(error = %e, "Native bridge failed to report app data path");
                String::new()
            }
        }
    }

    /// Fresh descriptor built from the current host signals.
    pub fn descriptor(&self) -> PlatformDescriptor {
        PlatformDescriptor {
            os_family: self.os(),
            modifier_key: self.modifier_key(),
            is_apple_silicon: self.is_apple_silicon(),
        }
    }
}

// =============================================================================
// Unit tests
// =============================================================================
