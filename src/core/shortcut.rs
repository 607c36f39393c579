// SyncBridge - core/shortcut.rs
//
// Rewrites platform-neutral accelerator strings ("CommandOrControl+Shift+P")
// into the host convention.
//
// Substitution is textual and ordered. `CommandOrControl` is rewritten
// before `Cmd`, so an already-substituted token is never touched twice.
// The output is for display only: feeding it back in is unsupported, so
// callers format each raw combo exactly once.

use super::platform::OsFamily;
use crate::util::constants::{GLYPH_COMMAND, GLYPH_CONTROL, GLYPH_OPTION, GLYPH_SHIFT};

/// Neutral token meaning Cmd on macOS and Ctrl elsewhere.
pub const COMMAND_OR_CONTROL: &str = "CommandOrControl";

/// Ordered macOS rewrite table.
const MACOS_REWRITES: &[(&str, &str)] = &[
    (COMMAND_OR_CONTROL, GLYPH_COMMAND),
    ("Cmd", GLYPH_COMMAND),
    ("Alt", GLYPH_OPTION),
    ("Shift", GLYPH_SHIFT),
    ("Ctrl", GLYPH_CONTROL),
];

/// Format `combo` for the given OS family.
pub fn format_for(os: OsFamily, combo: &str) -> String {
    match os {
        OsFamily::MacOs => MACOS_REWRITES
            .iter()
            .fold(combo.to_string(), |acc, (from, to)| acc.replace(from, to)),
        OsFamily::Windows | OsFamily::Linux => combo.replace(COMMAND_OR_CONTROL, "Ctrl"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macos_uses_glyphs() {
        assert_eq!(
            format_for(OsFamily::MacOs, "CommandOrControl+Shift+P"),
            "\u{2318}+\u{21E7}+P"
        );
        assert_eq!(
            format_for(OsFamily::MacOs, "Ctrl+Alt+Delete"),
            "\u{2303}+\u{2325}+Delete"
        );
        assert_eq!(format_for(OsFamily::MacOs, "Cmd+K"), "\u{2318}+K");
    }

    #[test]
    fn test_other_platforms_only_resolve_command_or_control() {
        for os in [OsFamily::Windows, OsFamily::Linux] {
            assert_eq!(
                format_for(os, "CommandOrControl+Shift+P"),
                "Ctrl+Shift+P"
            );
            assert_eq!(format_for(os, "Cmd+Alt+T"), "Cmd+Alt+T");
        }
    }

    /// `CommandOrControl` yields one glyph, not a glyph plus a leftover `Cmd`.
    #[test]
    fn test_command_or_control_rewritten_once() {
        let out = format_for(OsFamily::MacOs, "CommandOrControl+N");
        assert_eq!(out.matches(GLYPH_COMMAND).count(), 1);
        assert!(!out.contains("Control"));
    }

    #[test]
    fn test_plain_keys_untouched() {
        assert_eq!(format_for(OsFamily::MacOs, "F5"), "F5");
        assert_eq!(format_for(OsFamily::Linux, ""), "");
    }
}
