// SyncBridge - core/payload.rs
//
// The configuration payload handed from the landing surface to the shell:
// a flat map of string keys to string/number/boolean values (provider
// endpoint, API key, project identifiers).
//
// The bridge never validates individual fields. The payload is an atomic
// blob: it is stored and returned whole or not at all.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Placeholder shown instead of sensitive values.
const MASK: &str = "********";

/// Key fragments that mark a value as a secret when displayed.
const SENSITIVE_KEY_FRAGMENTS: &[&str] = &["key", "secret", "token", "password"];

/// A single payload value.
///
/// Untagged, so the stored JSON is the plain scalar. `Number` keeps the
/// original integer/float representation so a save/load cycle returns the
/// exact payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl ConfigValue {
    /// Interpret a command-line literal.
    ///
    /// `true`/`false` become booleans. A number is kept only when it prints
    /// back as exactly `raw`, so identifiers such as `007`, `+15` or a long
    /// project number stay strings. Everything else stays a string.
    pub fn parse_literal(raw: &str) -> Self {
        match raw {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        let number = match raw.parse::<i64>() {
            Ok(n) => Some(serde_json::Number::from(n)),
            Err(_) => raw.parse::<f64>().ok().and_then(serde_json::Number::from_f64),
        };
        match number {
            Some(n) if n.to_string() == raw => Self::Number(n),
            _ => Self::String(raw.to_string()),
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

/// Cloud-sync configuration payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigPayload {
    entries: BTreeMap<String, ConfigValue>,
}

impl ConfigPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Option<ConfigValue> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in sorted order. Safe to log; values are not.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy with every sensitive value replaced by a mask, for display.
    pub fn masked(&self) -> Self {
        let entries = self
            .entries
            .iter()
            .map(|(k, v)| {
                let shown = if is_sensitive_key(k) {
                    ConfigValue::String(MASK.to_string())
                } else {
                    v.clone()
                };
                (k.clone(), shown)
            })
            .collect();
        Self { entries }
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for ConfigPayload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Whether a key names a credential (API key, token, ...).
pub fn is_sensitive_key(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    SENSITIVE_KEY_FRAGMENTS.iter().any(|frag| lower.contains(frag))
}

/// Split a `KEY=VALUE` assignment into a key and a parsed value.
///
/// Only the first `=` separates; the value may itself contain `=`.
pub fn parse_assignment(raw: &str) -> Result<(String, ConfigValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in assignment '{raw}'"));
    }
    Ok((key.to_string(), ConfigValue::parse_literal(value)))
}

// =============================================================================
// Unit tests
// =============================================================================
