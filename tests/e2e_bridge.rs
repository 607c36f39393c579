// SyncBridge - tests/e2e_bridge.rs
//
// End-to-end tests for the configuration hand-off and the consent gate.
//
// These tests exercise the real file backend, real atomic writes and the
// real state file. The landing surface and the desktop shell are modelled
// as two independent `ConfigStore` values over the same storage directory,
// exactly as two processes sharing one persistence backend would be.

use syncbridge::app::state::AppState;
use syncbridge::app::store::{ConfigStore, FileBackend, LoadOutcome};
use syncbridge::app::sync::{
    transmit_batches, DryRunSink, RemoteSink, SkipReason, SyncBatch, SyncKind,
};
use syncbridge::core::consent::{ConsentSource, ConsentState};
use syncbridge::core::payload::{ConfigPayload, ConfigValue};
use syncbridge::core::platform::{HostEnvironment, ModifierKey, OsFamily, PlatformDetector};
use syncbridge::platform::config::{load_config, BackendKind, PlatformPaths};
use syncbridge::util::constants::CONFIG_STORAGE_KEY;
use syncbridge::util::error::StorageError;
use tempfile::TempDir;

// =============================================================================
// Helpers
// =============================================================================

fn provider_config() -> ConfigPayload {
    [
        ("endpoint", ConfigValue::from("https://sync.example.com/v1")),
        ("apiKey", ConfigValue::from("sk-e2e-0001")),
        ("projectId", ConfigValue::from("proj-42")),
        ("region", ConfigValue::from(3i64)),
        ("encrypt", ConfigValue::from(true)),
    ]
    .into_iter()
    .collect()
}

fn file_store(dir: &TempDir) -> ConfigStore {
    ConfigStore::new(FileBackend::new(dir.path().join("storage")))
}

// =============================================================================
// Configuration hand-off
// =============================================================================

/// The shell sees exactly what the landing surface saved.
#[test]
fn e2e_landing_save_is_loaded_by_shell() {
    let dir = TempDir::new().unwrap();
    let landing = file_store(&dir);
    let shell = file_store(&dir);

    assert!(shell.load().is_none(), "nothing saved yet");

    landing.save(&provider_config());
    assert_eq!(shell.load(), Some(provider_config()));
}

/// Contexts with different backends never see each other's slot.
#[test]
fn e2e_separate_backends_are_isolated() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();

    file_store(&a).save(&provider_config());
    assert!(file_store(&b).load().is_none());
}

#[test]
fn e2e_second_save_replaces_first() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);

    store.save(&provider_config());
    let replacement: ConfigPayload = [("endpoint", "https://other.example.com")]
        .into_iter()
        .collect();
    store.save(&replacement);

    assert_eq!(file_store(&dir).load(), Some(replacement));
}

#[test]
fn e2e_clear_removes_for_every_reader() {
    let dir = TempDir::new().unwrap();
    let landing = file_store(&dir);
    let shell = file_store(&dir);

    landing.save(&provider_config());
    shell.clear();
    assert!(landing.load().is_none());
    shell.clear();
}

/// Hand-edited or truncated slot files degrade to absent.
#[test]
fn e2e_corrupted_slot_file_is_absent() {
    let dir = TempDir::new().unwrap();
    let backend = FileBackend::new(dir.path().join("storage"));
    let slot = backend.slot_path(CONFIG_STORAGE_KEY);
    let store = ConfigStore::new(backend);

    store.save(&provider_config());
    let full = std::fs::read_to_string(&slot).unwrap();
    std::fs::write(&slot, &full[..full.len() / 2]).unwrap();

    assert!(store.load().is_none());
    assert!(matches!(
        store.try_load(),
        LoadOutcome::Failed(StorageError::Deserialization { .. })
    ));

    // Re-entering the configuration recovers.
    store.save(&provider_config());
    assert_eq!(store.load(), Some(provider_config()));
}

/// `[storage] backend = "none"` makes every operation a silent no-op.
#[test]
fn e2e_config_toml_can_disable_storage() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.toml"), "[storage]\nbackend = \"none\"\n").unwrap();

    let paths = PlatformPaths::under(dir.path());
    let (config, warnings) = load_config(&paths.config_dir);
    assert!(warnings.is_empty(), "{warnings:?}");
    assert_eq!(config.backend, BackendKind::Disabled);

    let store = ConfigStore::from_kind(config.backend, &paths.storage_dir);
    store.save(&provider_config());
    assert!(store.load().is_none());
    assert!(!paths.storage_dir.exists(), "no backend means no files");
}

// =============================================================================
// Consent gate
// =============================================================================

/// Grant, restart, revoke, restart: the last decision always wins.
#[test]
fn e2e_consent_decisions_persist_across_restarts() {
    let dir = TempDir::new().unwrap();

    let mut state = AppState::restore(dir.path());
    assert!(state.consent_prompt_visible());
    state.set_cloud_sync_consent(true);
    drop(state);

    let mut state = AppState::restore(dir.path());
    assert_eq!(state.consent(), ConsentState::Granted);
    state.set_cloud_sync_consent(false);
    drop(state);

    let state = AppState::restore(dir.path());
    assert_eq!(state.consent(), ConsentState::Denied);
    assert!(!state.consent_prompt_visible());
}

/// Full path: configuration handed over, consent granted, then revoked.
#[test]
fn e2e_sync_follows_current_consent() {
    let dir = TempDir::new().unwrap();
    file_store(&dir).save(&provider_config());
    let shell = file_store(&dir);

    let mut state = AppState::restore(dir.path());
    let batch = [SyncBatch {
        kind: SyncKind::Bookmarks,
        items: vec![serde_json::json!({"title": "Docs", "url": "https://docs.example"})],
    }];

    let mut sink = DryRunSink::default();
    let report = transmit_batches(&state, &shell, &mut sink, &batch);
    assert_eq!(report.skipped, vec![(SyncKind::Bookmarks, SkipReason::ConsentNotGranted)]);

    state.set_cloud_sync_consent(true);
    let report = transmit_batches(&state, &shell, &mut sink, &batch);
    assert_eq!(report.sent, vec![SyncKind::Bookmarks]);

    state.set_cloud_sync_consent(false);
    let report = transmit_batches(&state, &shell, &mut sink, &batch);
    assert!(report.sent.is_empty());
    assert_eq!(sink.batches_seen, 1);
}

/// The user revokes while the first batch is in flight. Later batches stay
/// on-device, and the revocation is still in force after a restart.
#[test]
fn e2e_revocation_during_sync_persists() {
    struct RevokingSink {
        state: AppState,
        sent: usize,
    }

    impl RemoteSink for RevokingSink {
        fn transmit(&mut self, _: &ConfigPayload, _: &SyncBatch) -> Result<(), String> {
            self.sent += 1;
            self.state.set_cloud_sync_consent(false);
            Ok(())
        }
    }

    let dir = TempDir::new().unwrap();
    file_store(&dir).save(&provider_config());

    let mut state = AppState::restore(dir.path());
    state.set_cloud_sync_consent(true);
    let handle = state.consent_handle();
    let mut sink = RevokingSink { state, sent: 0 };

    let batches = [SyncKind::History, SyncKind::Credentials].map(|kind| SyncBatch {
        kind,
        items: vec![serde_json::json!({"id": 1})],
    });
    let report = transmit_batches(&handle, &file_store(&dir), &mut sink, &batches);
    assert_eq!(report.sent, vec![SyncKind::History]);
    assert_eq!(sink.sent, 1);
    assert_eq!(handle.consent(), ConsentState::Denied);
    drop(sink);

    let restarted = AppState::restore(dir.path());
    assert_eq!(restarted.consent(), ConsentState::Denied);
}

// =============================================================================
// Platform detection
// =============================================================================

#[test]
fn e2e_shortcuts_per_simulated_host() {
    let cases = [
        ("macos", "aarch64", OsFamily::MacOs, "\u{2318}+\u{21E7}+P"),
        ("windows", "x86_64", OsFamily::Windows, "Ctrl+Shift+P"),
        ("linux", "x86_64", OsFamily::Linux, "Ctrl+Shift+P"),
    ];
    for (os, arch, family, expected) in cases {
        let detector = PlatformDetector::new(HostEnvironment::new(os, arch));
        assert_eq!(detector.os(), family);
        assert_eq!(
            detector.modifier_key() == ModifierKey::Cmd,
            family == OsFamily::MacOs
        );
        assert_eq!(
            detector.format_shortcut("CommandOrControl+Shift+P"),
            expected,
            "host {os}"
        );
        assert_eq!(detector.app_data_path(), "");
    }
}
