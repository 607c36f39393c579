// SyncBridge - platform/host.rs
//
// Real host signals for the platform detector, and the native-shell bridge
// that answers the app-data-path query using the `directories` crate.

use crate::core::platform::{HostProbe, NativeBridge, PlatformDetector};
use crate::util::constants;
use directories::ProjectDirs;
use std::path::PathBuf;

/// Native bridge backed by the platform data directory
/// (XDG on Linux, AppData on Windows, Library on macOS).
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectoriesBridge;

impl NativeBridge for DirectoriesBridge {
    fn app_data_path(&self) -> Result<PathBuf, String> {
        ProjectDirs::from("", "", constants::APP_ID)
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| "no home directory for the current user".to_string())
    }
}

/// The process's own host.
///
/// Identifiers are read from `std::env::consts` on every call. `bridge` is
/// `None` for contexts without a native shell.
#[derive(Debug, Default)]
pub struct SystemHost {
    bridge: Option<DirectoriesBridge>,
}

impl SystemHost {
    /// Host running inside the desktop shell.
    pub fn with_native_bridge() -> Self {
        Self {
            bridge: Some(DirectoriesBridge),
        }
    }

    /// Host with no native bridge; app-data queries yield an empty path.
    pub fn without_native_bridge() -> Self {
        Self { bridge: None }
    }
}

impl HostProbe for SystemHost {
    fn os_identifier(&self) -> String {
        std::env::consts::OS.to_string()
    }

    fn arch_identifier(&self) -> String {
        std::env::consts::ARCH.to_string()
    }

    fn native_bridge(&self) -> Option<&dyn NativeBridge> {
        self.bridge.as_ref().map(|b| b as &dyn NativeBridge)
    }
}

/// Detector for the current process inside the desktop shell.
pub fn system_detector() -> PlatformDetector<SystemHost> {
    PlatformDetector::new(SystemHost::with_native_bridge())
}
