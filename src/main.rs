// SyncBridge - main.rs
//
// Command-line shell over the bridge. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and logging initialisation (debug mode support)
// 3. Storage backend and application state setup
// 4. Dispatch to the platform / shortcut / config / consent / sync commands

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use syncbridge::app::state::AppState;
use syncbridge::app::store::ConfigStore;
use syncbridge::app::sync::{self, DryRunSink, SkipReason, SyncBatch, SyncKind};
use syncbridge::core::consent::ConsentState;
use syncbridge::core::payload::{self, ConfigPayload};
use syncbridge::util::error::{BridgeError, ConsentError, StorageError};
use syncbridge::{platform, util};

/// SyncBridge - configuration bridge and cloud-sync consent gate.
///
/// Hands cloud-sync configuration from the landing surface to the desktop
/// shell and keeps user data on-device until the user consents.
#[derive(Parser, Debug)]
#[command(name = "syncbridge", version, about)]
struct Cli {
    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    /// Keep all state under this directory instead of the platform default.
    #[arg(long = "data-dir", global = true, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the detected platform and app data path.
    Platform,

    /// Format shortcuts such as "CommandOrControl+Shift+P" for this platform.
    Shortcut {
        #[arg(required = true, value_name = "COMBO")]
        combos: Vec<String>,
    },

    /// Manage the stored cloud-sync configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show or change the cloud-sync consent decision.
    Consent {
        #[command(subcommand)]
        action: ConsentAction,
    },

    /// Dry-run a consent-guarded sync of a JSON array of items.
    Sync {
        /// Data category: history, bookmarks, or credentials.
        #[arg(long, value_parser = parse_kind)]
        kind: SyncKind,

        /// JSON file containing an array of items.
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Replace the stored configuration.
    Save {
        /// Entry to store; repeatable. Later entries override the file.
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// JSON object to start from.
        #[arg(long = "from-file", value_name = "FILE")]
        from_file: Option<PathBuf>,
    },

    /// Print the stored configuration.
    Show {
        /// Print credentials instead of masking them.
        #[arg(long)]
        reveal: bool,
    },

    /// Remove the stored configuration.
    Clear,
}

#[derive(Subcommand, Debug)]
enum ConsentAction {
    /// Print the current decision.
    Status,
    /// Allow user data to be sent to the sync service.
    Grant,
    /// Refuse (or revoke) consent.
    Deny,
}

fn parse_kind(value: &str) -> Result<SyncKind, String> {
    SyncKind::parse(value)
        .ok_or_else(|| format!("unknown kind '{value}' (expected history, bookmarks, credentials)"))
}

fn main() {
    let cli = Cli::parse();

    let paths = match cli.data_dir {
        Some(ref dir) => platform::config::PlatformPaths::under(dir),
        None => platform::config::PlatformPaths::resolve(),
    };
    let (config, config_warnings) = platform::config::load_config(&paths.config_dir);

    util::logging::init(
        cli.debug,
        config.log_level.as_deref(),
        config.log_file.as_deref(),
    );
    for warning in &config_warnings {
        tracing::warn!("{}", warning);
    }

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        backend = %config.backend,
        "SyncBridge starting"
    );

    let storage_dir = config
        .storage_dir
        .clone()
        .unwrap_or_else(|| paths.storage_dir.clone());
    let store = ConfigStore::from_kind(config.backend, &storage_dir);
    let mut state = AppState::restore(&paths.data_dir);

    if let Err(e) = run(cli.command, &store, &mut state) {
        tracing::error!(error = %e, "Command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Command, store: &ConfigStore, state: &mut AppState) -> util::error::Result<()> {
    match command {
        Command::Platform => show_platform(),
        Command::Shortcut { combos } => {
            let detector = platform::host::system_detector();
            for combo in &combos {
                println!("{combo}\t{}", detector.format_shortcut(combo));
            }
            Ok(())
        }
        Command::Config { action } => run_config(action, store),
        Command::Consent { action } => {
            match action {
                ConsentAction::Status => {}
                ConsentAction::Grant => {
                    state.set_cloud_sync_consent(true);
                }
                ConsentAction::Deny => {
                    state.set_cloud_sync_consent(false);
                }
            }
            print_consent(state);
            Ok(())
        }
        Command::Sync { kind, input } => run_sync(kind, &input, store, state),
    }
}

fn show_platform() -> util::error::Result<()> {
    let detector = platform::host::system_detector();
    let descriptor = detector.descriptor();
    let out = serde_json::json!({
        "os_family": descriptor.os_family,
        "modifier_key": descriptor.modifier_key,
        "is_apple_silicon": descriptor.is_apple_silicon,
        "app_data_path": detector.app_data_path(),
    });
    println!("{}", to_pretty(&out)?);
    Ok(())
}

fn run_config(action: ConfigAction, store: &ConfigStore) -> util::error::Result<()> {
    match action {
        ConfigAction::Save { set, from_file } => {
            let mut config = match from_file {
                Some(ref path) => read_payload(path)?,
                None => ConfigPayload::new(),
            };
            for raw in &set {
                let (key, value) = payload::parse_assignment(raw).map_err(|reason| {
                    BridgeError::InvalidInput {
                        origin: "--set".to_string(),
                        reason,
                    }
                })?;
                config.insert(key, value);
            }
            if config.is_empty() {
                return Err(BridgeError::InvalidInput {
                    origin: "config save".to_string(),
                    reason: "nothing to save; pass --set KEY=VALUE or --from-file".to_string(),
                });
            }

            match store.try_save(&config) {
                Ok(()) => println!("Saved {} configuration entries.", config.len()),
                Err(StorageError::BackendUnavailable) => {
                    println!("No storage backend is configured; nothing was saved.");
                }
                Err(e) => return Err(e.into()),
            }
            Ok(())
        }
        ConfigAction::Show { reveal } => {
            match store.load() {
                Some(config) => {
                    let shown = if reveal { config } else { config.masked() };
                    println!("{}", to_pretty(&shown)?);
                }
                None => println!("No configuration stored."),
            }
            Ok(())
        }
        ConfigAction::Clear => {
            store.clear();
            println!("Configuration cleared.");
            Ok(())
        }
    }
}

fn run_sync(
    kind: SyncKind,
    input: &Path,
    store: &ConfigStore,
    state: &AppState,
) -> util::error::Result<()> {
    // No transmission is reachable until the user has answered the prompt.
    if state.consent_prompt_visible() {
        return Err(ConsentError::NotGranted {
            state: ConsentState::Unset,
        }
        .into());
    }

    let content = std::fs::read_to_string(input).map_err(|source| BridgeError::Io {
        path: input.to_path_buf(),
        operation: "read sync input",
        source,
    })?;
    let items: Vec<serde_json::Value> =
        serde_json::from_str(&content).map_err(|e| BridgeError::InvalidInput {
            origin: format!("'{}'", input.display()),
            reason: format!("expected a JSON array: {e}"),
        })?;

    let batches = [SyncBatch { kind, items }];
    let handle = state.consent_handle();
    let mut sink = DryRunSink::default();
    let report = sync::transmit_batches(&handle, store, &mut sink, &batches);

    for (kind, reason) in &report.skipped {
        match reason {
            SkipReason::ConsentNotGranted => {
                return Err(ConsentError::NotGranted {
                    state: state.consent(),
                }
                .into());
            }
            SkipReason::NoConfiguration => {
                println!("{kind}: skipped, no sync configuration stored.");
            }
        }
    }
    for kind in &report.sent {
        println!("{kind}: {} items would be sent (dry run).", batches[0].items.len());
    }
    for (kind, error) in &report.failed {
        println!("{kind}: failed: {error}");
    }
    Ok(())
}

fn read_payload(path: &Path) -> util::error::Result<ConfigPayload> {
    let content = std::fs::read_to_string(path).map_err(|source| BridgeError::Io {
        path: path.to_path_buf(),
        operation: "read configuration file",
        source,
    })?;
    serde_json::from_str(&content).map_err(|e| BridgeError::InvalidInput {
        origin: format!("'{}'", path.display()),
        reason: format!("expected a flat JSON object of strings, numbers, booleans: {e}"),
    })
}

fn print_consent(state: &AppState) {
    let consent = state.consent();
    match state.consent_decided_at {
        Some(at) => println!("Cloud sync consent: {consent} (since {})", at.to_rfc3339()),
        None => println!("Cloud sync consent: {consent}"),
    }
    if state.consent_prompt_visible() {
        println!("No decision yet. Run `syncbridge consent grant` or `syncbridge consent deny`.");
    }
}

fn to_pretty<T: serde::Serialize>(value: &T) -> util::error::Result<String> {
    serde_json::to_string_pretty(value).map_err(|source| BridgeError::Output { source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_to_pretty_reports_output_error() {
        // JSON object keys must be strings.
        let unrenderable: BTreeMap<(u8, u8), u8> = [((1, 2), 3)].into_iter().collect();
        let err = to_pretty(&unrenderable).unwrap_err();
        assert!(matches!(err, BridgeError::Output { .. }), "got: {err}");
        assert!(err.to_string().starts_with("Failed to render output"));
    }

    #[test]
    fn test_to_pretty_renders_payload() {
        let config: ConfigPayload = [("endpoint", "https://sync.example.com")]
            .into_iter()
            .collect();
        let out = to_pretty(&config).unwrap();
        assert!(out.contains("\"endpoint\": \"https://sync.example.com\""));
    }
}
