// SyncBridge - app/sync.rs
//
// Consent-guarded transmission of user data to the configured cloud-sync
// service. The service itself is an external collaborator behind
// `RemoteSink`; this module only decides whether, and with which
// configuration, each batch may be handed to it.
//
// The consent guard runs immediately before every batch. A revocation made
// while an earlier batch was being sent stops all later ones.

use crate::app::store::ConfigStore;
use crate::core::consent::{self, ConsentSource};
use crate::core::payload::ConfigPayload;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of user data in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncKind {
    History,
    Bookmarks,
    Credentials,
}

impl SyncKind {
    /// Parse a CLI/config value (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "history" => Some(Self::History),
            "bookmarks" => Some(Self::Bookmarks),
            "credentials" => Some(Self::Credentials),
            _ => None,
        }
    }
}

impl fmt::Display for SyncKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::History => f.write_str("history"),
            Self::Bookmarks => f.write_str("bookmarks"),
            Self::Credentials => f.write_str("credentials"),
        }
    }
}

/// One unit of transmission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncBatch {
    pub kind: SyncKind,
    pub items: Vec<serde_json::Value>,
}

/// The remote cloud-sync service.
pub trait RemoteSink {
    /// Send one batch using the stored configuration.
    fn transmit(&mut self, config: &ConfigPayload, batch: &SyncBatch) -> Result<(), String>;
}

/// Why a batch was not sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Consent was not granted when the batch came up.
    ConsentNotGranted,
    /// No usable configuration is stored.
    NoConfiguration,
}

/// What happened to each batch, in input order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SyncReport {
    pub sent: Vec<SyncKind>,
    pub skipped: Vec<(SyncKind, SkipReason)>,
    pub failed: Vec<(SyncKind, String)>,
}

impl SyncReport {
    pub fn all_sent(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty()
    }
}

/// Transmit `batches` through `sink`, checking consent before each one.
///
/// Configuration is re-loaded per batch as well, so a `clear` between
/// batches also stops transmission. Nothing here returns an error: every
/// batch ends up in exactly one list of the report.
pub fn transmit_batches<C, S>(
    consent: &C,
    store: &ConfigStore,
    sink: &mut S,
    batches: &[SyncBatch],
) -> SyncReport
where
    C: ConsentSource + ?Sized,
    S: RemoteSink + ?Sized,
{
    let mut report = SyncReport::default();

    for batch in batches {
        if let Err(e) = consent::check_granted(consent) {
            tracing::info!(kind = %batch.kind, reason = %e, "Sync batch not sent");
            report.skipped.push((batch.kind, SkipReason::ConsentNotGranted));
            continue;
        }

        let Some(config) = store.load() else {
            tracing::info!(kind = %batch.kind, "No sync configuration stored; batch not sent");
            report.skipped.push((batch.kind, SkipReason::NoConfiguration));
            continue;
        };

        match sink.transmit(&config, batch) {
            Ok(()) => {
                tracing::info!(kind = %batch.kind, items = batch.items.len(), "Sync batch sent");
                report.sent.push(batch.kind);
            }
            Err(e) => {
                tracing::warn!(kind = %batch.kind, error = %e, "Sync batch failed");
                report.failed.push((batch.kind, e));
            }
        }
    }

    report
}

/// Sink that only logs what would be sent. Used by the CLI `sync` command.
#[derive(Debug, Default)]
pub struct DryRunSink {
    pub batches_seen: usize,
}

impl RemoteSink for DryRunSink {
    fn transmit(&mut self, config: &ConfigPayload, batch: &SyncBatch) -> Result<(), String> {
        self.batches_seen += 1;
        let keys: Vec<&str> = config.keys().collect();
        tracing::info!(
            kind = %batch.kind,
            items = batch.items.len(),
            config_keys = ?keys,
            "Dry run: batch would be transmitted"
        );
        Ok(())
    }
}

// =============================================================================
// Unit tests
// =============================================================================
