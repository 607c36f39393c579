// SyncBridge - core/consent.rs
//
// Cloud-sync consent gate: the legal consent states, the single transition
// function, and the guard every transmission path calls before sending.
//
// The gate does not own the consent value. It is held by whatever
// `ConsentContainer` the application injects (normally `app::state`), so
// tests drive the gate against a plain in-memory container. Guards only
// need a `ConsentSource`, which cannot write.
//
// Transition table:
//
//   unset   --decide(true)-->  granted
//   unset   --decide(false)--> denied
//   granted --decide(false)--> denied    (revocation)
//   denied  --decide(true)-->  granted   (re-consent)
//   any     --decide(same)-->  unchanged (state re-written, nothing else)
//
// Nothing but `decide` moves the state, and nothing ever moves it back to
// `unset`.

use crate::util::error::ConsentError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// User decision about sending history, bookmarks, and credentials to the
/// configured cloud-sync service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentState {
    /// No decision yet. The only initial state.
    #[default]
    Unset,
    /// The user allowed data to leave the device.
    Granted,
    /// The user refused (or revoked) consent.
    Denied,
}

impl ConsentState {
    /// The state a decision lands in.
    pub fn from_decision(granted: bool) -> Self {
        if granted {
            Self::Granted
        } else {
            Self::Denied
        }
    }

    /// True only for `Granted`.
    pub fn permits_transmission(self) -> bool {
        self == Self::Granted
    }

    /// True once the user has made any choice.
    pub fn is_decided(self) -> bool {
        self != Self::Unset
    }

    /// Lowercase label used in logs, CLI output, and the state file.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Granted => "granted",
            Self::Denied => "denied",
        }
    }
}

impl fmt::Display for ConsentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view of the consent value, handed to transmission guards.
pub trait ConsentSource {
    /// Current consent value. Callers must re-read this rather than caching
    /// it across suspended work, since the user can revoke at any time.
    fn consent(&self) -> ConsentState;
}

/// Writable consent storage. Only `decide` should call `store_consent`.
pub trait ConsentContainer: ConsentSource {
    fn store_consent(&mut self, state: ConsentState);
}

/// Outcome of a single `decide` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsentTransition {
    pub from: ConsentState,
    pub to: ConsentState,
}

impl ConsentTransition {
    /// Whether the call moved the state.
    pub fn changed(&self) -> bool {
        self.from != self.to
    }

    /// Whether previously granted consent was withdrawn.
    pub fn revoked(&self) -> bool {
        self.from == ConsentState::Granted && self.to == ConsentState::Denied
    }
}

/// Record the user's consent decision.
///
/// The single side-effecting entry point of the gate. Synchronous and
/// idempotent: repeating the same decision re-writes the same state and
/// reports `changed() == false`.
pub fn decide<C: ConsentContainer + ?Sized>(container: &mut C, granted: bool) -> ConsentTransition {
    let from = container.consent();
    let to = ConsentState::from_decision(granted);
    container.store_consent(to);

    let transition = ConsentTransition { from, to };
    if transition.revoked() {
        tracing::info!("Cloud sync consent revoked");
    } else if transition.changed() {
        tracing::info!(from = %from, to = %to, "Cloud sync consent decided");
    } else {
        tracing::debug!(state = %to, "Cloud sync consent re-confirmed (unchanged)");
    }
    transition
}

/// Guard for every transmission attempt.
///
/// Must be called immediately before each send, not once per session:
/// consent can be revoked between two transmissions.
pub fn check_granted<C: ConsentSource + ?Sized>(source: &C) -> Result<(), ConsentError> {
    let state = source.consent();
    if state.permits_transmission() {
        return Ok(());
    }
    tracing::debug!(state = %state, "Transmission blocked by consent gate");
    Err(ConsentError::NotGranted { state })
}

/// Whether the modal consent prompt must be shown.
///
/// While consent is unset the prompt blocks the rest of the application, so
/// no transmission-triggering action is reachable.
pub fn prompt_required<C: ConsentSource + ?Sized>(source: &C) -> bool {
    !source.consent().is_decided()
}

// =============================================================================
// Unit tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal container counting writes so side effects are observable.
    #[derive(Default)]
    struct Recorder {
        state: ConsentState,
        writes: usize,
    }

    impl ConsentSource for Recorder {
        fn consent(&self) -> ConsentState {
            self.state
        }
    }

    impl ConsentContainer for Recorder {
        fn store_consent(&mut self, state: ConsentState) {
            self.state = state;
            self.writes += 1;
        }
    }

    #[test]
    fn test_initial_state_is_unset_and_blocks() {
        let c = Recorder::default();
        assert_eq!(c.consent(), ConsentState::Unset);
        assert!(prompt_required(&c));
        assert_eq!(
            check_granted(&c),
            Err(ConsentError::NotGranted {
                state: ConsentState::Unset
            })
        );
    }

    #[test]
    fn test_grant_then_deny_ends_denied() {
        let mut c = Recorder::default();
        decide(&mut c, true);
        let t = decide(&mut c, false);

        assert_eq!(c.consent(), ConsentState::Denied);
        assert!(t.revoked());
        assert!(check_granted(&c).is_err());
        assert!(!prompt_required(&c));
    }

    #[test]
    fn test_denied_can_be_regranted() {
        let mut c = Recorder::default();
        decide(&mut c, false);
        let t = decide(&mut c, true);

        assert_eq!(t.from, ConsentState::Denied);
        assert_eq!(t.to, ConsentState::Granted);
        assert!(check_granted(&c).is_ok());
    }

    /// Repeating a decision writes the state but reports no change.
    #[test]
    fn test_repeated_decision_is_idempotent() {
        let mut c = Recorder::default();
        let first = decide(&mut c, true);
        let second = decide(&mut c, true);

        assert!(first.changed());
        assert!(!second.changed());
        assert!(!second.revoked());
        assert_eq!(c.consent(), ConsentState::Granted);
        assert_eq!(c.writes, 2, "each decide is exactly one state write");
    }

    /// Reading and guarding never grant consent implicitly.
    #[test]
    fn test_reads_never_change_state() {
        let c = Recorder::default();
        for _ in 0..3 {
            let _ = check_granted(&c);
            let _ = prompt_required(&c);
        }
        assert_eq!(c.consent(), ConsentState::Unset);
        assert_eq!(c.writes, 0);
    }

    #[test]
    fn test_state_serialises_lowercase() {
        let json = serde_json::to_string(&ConsentState::Granted).unwrap();
        assert_eq!(json, "\"granted\"");
        let back: ConsentState = serde_json::from_str("\"denied\"").unwrap();
        assert_eq!(back, ConsentState::Denied);
    }
}
