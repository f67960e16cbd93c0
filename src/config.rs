// ── Configuration flags ───────────────────────────────────────────────────────
//
// The handful of externally supplied settings the environment layer honours.
// Sources, lowest priority first:
//   1. built-in defaults
//   2. the JSON file named by `PROMPTENV_CONFIG`
//   3. `PROMPTENV_TERMINAL_WIDTH` / `PROMPTENV_DEBUG`
// No `unsafe`: pure safe Rust + serde_json.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

pub const CONFIG_ENV: &str = "PROMPTENV_CONFIG";
pub const TERMINAL_WIDTH_ENV: &str = "PROMPTENV_TERMINAL_WIDTH";
pub const DEBUG_ENV: &str = "PROMPTENV_DEBUG";

/// Settings passed to [`crate::Environment`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    /// Explicit terminal width.  0 = no override, ask the console.
    #[serde(default)]
    pub terminal_width: u16,
    /// Enables debug-level logging in the binary.
    #[serde(default)]
    pub debug: bool,
}

/// Read and parse a flags file.
///
/// Returns `None` on any error: file missing or JSON parse failure.  The
/// caller continues with defaults.
pub fn load(path: &Path) -> Option<Flags> {
    let data = fs::read(path).ok()?;
    serde_json::from_slice(&data).ok()
}

/// Resolve flags from the process environment.
pub fn from_env() -> Flags {
    from_lookup(|key| std::env::var(key).ok())
}

/// Same as [`from_env`] with an injectable variable lookup.
pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Flags {
    let mut flags = lookup(CONFIG_ENV)
        .and_then(|path| load(Path::new(&path)))
        .unwrap_or_default();

    if let Some(width) = lookup(TERMINAL_WIDTH_ENV).and_then(|v| v.trim().parse::<u16>().ok()) {
        flags.terminal_width = width;
    }
    if let Some(debug) = lookup(DEBUG_ENV) {
        flags.debug = matches!(debug.trim(), "1" | "true" | "yes");
    }
    flags
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        assert_eq!(from_lookup(lookup_from(&[])), Flags::default());
    }

    #[test]
    fn missing_fields_default() {
        let flags: Flags = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(flags.terminal_width, 0);
        assert!(!flags.debug);
    }

    #[test]
    fn file_then_env_override() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("flags.json");
        fs::write(&path, r#"{"terminal_width":120,"debug":true}"#).expect("write");

        let path_str = path.to_string_lossy().into_owned();
        let flags = from_lookup(lookup_from(&[(CONFIG_ENV, &path_str)]));
        assert_eq!(flags.terminal_width, 120);
        assert!(flags.debug);

        let flags = from_lookup(lookup_from(&[
            (CONFIG_ENV, &path_str),
            (TERMINAL_WIDTH_ENV, "80"),
            (DEBUG_ENV, "0"),
        ]));
        assert_eq!(flags.terminal_width, 80);
        assert!(!flags.debug);
    }

    #[test]
    fn unparsable_width_is_ignored() {
        let flags = from_lookup(lookup_from(&[(TERMINAL_WIDTH_ENV, "-3")]));
        assert_eq!(flags.terminal_width, 0);
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("flags.json");
        fs::write(&path, "not json").expect("write");
        assert_eq!(load(&path), None);
    }
}
