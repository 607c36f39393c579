// SyncBridge - app/state.rs
//
// Application state container: the cloud-sync consent value and the active
// view, plus persistence of the consent decision between restarts.
//
// Consent lives in a `SharedConsent` cell. Every transmission guard holds a
// read-only clone and re-reads it before each send, so a revocation made
// through the container is seen immediately by work already in flight. The
// only writer is `AppState::set_cloud_sync_consent`, which also persists.
//
// The state file is saved atomically (write temp -> rename). Load errors are
// silently discarded: a corrupt or incompatible file starts the app fresh
// with consent unset, which re-prompts the user.

use crate::core::consent::{
    self, ConsentContainer, ConsentSource, ConsentState, ConsentTransition,
};
use crate::platform::fs;
use crate::util::constants::{SLOT_TEMP_EXTENSION, STATE_FILE_NAME};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Version stamp for forward-compatibility checks.
///
/// Version mismatches silently discard the saved state.
pub const STATE_VERSION: u32 = 1;

/// Single-threaded, read-only handle to the consent value.
///
/// Clones observe every later decision made through the owning `AppState`.
#[derive(Debug, Clone, Default)]
pub struct SharedConsent(Rc<Cell<ConsentState>>);

impl SharedConsent {
    fn new(initial: ConsentState) -> Self {
        Self(Rc::new(Cell::new(initial)))
    }
}

impl ConsentSource for SharedConsent {
    fn consent(&self) -> ConsentState {
        self.0.get()
    }
}

/// Write access to the consent cell, lent to `decide` for one call.
struct ConsentWriter<'a>(&'a SharedConsent);

impl ConsentSource for ConsentWriter<'_> {
    fn consent(&self) -> ConsentState {
        self.0.consent()
    }
}

impl ConsentContainer for ConsentWriter<'_> {
    fn store_consent(&mut self, state: ConsentState) {
        (self.0).0.set(state);
    }
}

/// Top-level view the shell is showing. Read by the UI layer to place the
/// consent modal; not produced by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Landing,
    Browser,
    Settings,
}

/// Top-level application state.
#[derive(Debug, Default)]
pub struct AppState {
    consent: SharedConsent,

    /// When the consent value last changed (None until first decision).
    pub consent_decided_at: Option<DateTime<Utc>>,

    /// Current view.
    pub active_view: ActiveView,

    /// Where consent is persisted (None = in-memory only).
    state_path: Option<PathBuf>,
}

impl AppState {
    /// In-memory state with consent unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// State backed by `state.json` in `data_dir`, restoring any saved
    /// decision.
    pub fn restore(data_dir: &Path) -> Self {
        let path = state_path(data_dir);
        let mut state = Self {
            state_path: Some(path.clone()),
            ..Self::default()
        };
        if let Some(saved) = load(&path) {
            state.consent = SharedConsent::new(saved.consent);
            state.consent_decided_at = saved.decided_at;
        }
        state
    }

    /// Current consent value.
    pub fn consent(&self) -> ConsentState {
        self.consent.consent()
    }

    /// Handle for transmission guards. Always reflects the latest decision.
    pub fn consent_handle(&self) -> SharedConsent {
        self.consent.clone()
    }

    /// The user's answer to the cloud-sync prompt (or a later change of mind).
    ///
    /// Runs the consent gate transition, stamps the decision time when the
    /// state moved, and persists the result.
    pub fn set_cloud_sync_consent(&mut self, granted: bool) -> ConsentTransition {
        let transition = consent::decide(&mut ConsentWriter(&self.consent), granted);
        if transition.changed() {
            self.consent_decided_at = Some(Utc::now());
        }
        self.persist();
        transition
    }

    /// Whether the modal consent prompt must cover the current view.
    pub fn consent_prompt_visible(&self) -> bool {
        consent::prompt_required(self)
    }

    pub fn set_active_view(&mut self, view: ActiveView) {
        tracing::debug!(view = ?view, "Active view changed");
        self.active_view = view;
    }

    fn persist(&self) {
        let Some(ref path) = self.state_path else {
            return;
        };
        let data = PersistedState {
            version: STATE_VERSION,
            consent: self.consent(),
            decided_at: self.consent_decided_at,
        };
        if let Err(e) = save(&data, path) {
            tracing::warn!(error = %e, "Failed to persist application state");
        }
    }
}

impl ConsentSource for AppState {
    fn consent(&self) -> ConsentState {
        self.consent.consent()
    }
}

// =============================================================================
// On-disk state
// =============================================================================

/// Persistent subset of `AppState`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PersistedState {
    /// Schema version; must equal `STATE_VERSION` to be accepted.
    pub version: u32,

    /// Last consent decision.
    #[serde(default)]
    pub consent: ConsentState,

    /// When that decision was made.
    #[serde(default)]
    pub decided_at: Option<DateTime<Utc>>,
}

/// Resolve the state file path from the platform data directory.
pub fn state_path(data_dir: &Path) -> PathBuf {
    data_dir.join(STATE_FILE_NAME)
}

/// Save `data` to `path` atomically.
///
/// Returns a descriptive error string suitable for a tracing warn! call.
pub fn save(data: &PersistedState, path: &Path) -> Result<(), String> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| format!("failed to serialise state: {e}"))?;

    fs::write_atomic(path, SLOT_TEMP_EXTENSION, json.as_bytes())
        .map_err(|e| format!("failed to write state file '{}': {e}", path.display()))?;

    tracing::debug!(path = %path.display(), "Application state saved");
    Ok(())
}

/// Load and validate a `PersistedState` from `path`.
///
/// Returns `None` on any error (file not found, JSON parse failure,
/// version mismatch). The caller treats `None` as "start fresh".
pub fn load(path: &Path) -> Option<PersistedState> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| {
            // "not found" is the normal first run.
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!(path = %path.display(), error = %e, "Cannot read state file");
            }
        })
        .ok()?;

    let data: PersistedState = serde_json::from_str(&content)
        .map_err(|e| {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "State file is malformed, starting fresh"
            );
        })
        .ok()?;

    if data.version != STATE_VERSION {
        tracing::warn!(
            found = data.version,
            expected = STATE_VERSION,
            "State file version mismatch, starting fresh"
        );
        return None;
    }

    tracing::info!(path = %path.display(), consent = %data.consent, "State file loaded");
    Some(data)
}

// =============================================================================
// Unit tests
// =============================================================================
