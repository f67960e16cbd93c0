// ── Platform abstraction layer ────────────────────────────────────────────────
//
// `Platform` is the capability interface the facade talks to.  One
// implementation per target family, selected at compile time through
// `NativePlatform`.  No `unsafe` lives here; all FFI is confined to the
// `win32` and `unix` sub-modules and never leaks outward.
//
// The helpers below are pure (environment lookups are injected) so they can
// be tested on any host.

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::registry::ValueStore;
use crate::types::{Connection, PathStyle, PlatformKind};

#[cfg(windows)]
pub mod win32;

#[cfg(unix)]
pub mod unix;

#[cfg(windows)]
pub type NativePlatform = win32::Win32Platform;

#[cfg(unix)]
pub type NativePlatform = unix::UnixPlatform;

/// Host queries with one implementation per operating system.
///
/// Implementations report raw outcomes; logging, tracing and the
/// fail-closed policy are applied by [`crate::Environment`].
pub trait Platform {
    fn kind(&self) -> PlatformKind;

    /// Whether the current context has administrative/root rights.  `Err`
    /// carries the reason the check itself could not be performed.
    fn is_elevated(&self) -> std::result::Result<bool, String>;

    /// Column count of the attached console.
    fn console_width(&self) -> Result<u16>;

    /// Process environment variable; `None` when unset.
    fn env_var(&self, key: &str) -> Option<String>;

    fn is_wsl(&self) -> bool;

    /// Running under a WSL2 (virtual machine) kernel.
    fn is_wsl2(&self) -> bool;

    /// Backing store for registry lookups.
    fn registry(&self) -> &dyn ValueStore;

    /// Enumerate active network adapters.  Failures are logged and yield an
    /// empty list.
    fn discover_connections(&self) -> Vec<Connection>;
}

// ── Home and cache directories ────────────────────────────────────────────────

/// `HOME`, then `HOMEDRIVE` + `HOMEPATH`, then `USERPROFILE`; empty when
/// none is set.
pub fn home_dir_from(env: impl Fn(&str) -> Option<String>) -> String {
    let var = |key: &str| env(key).unwrap_or_default();

    let home = var("HOME");
    if !home.is_empty() {
        return home;
    }
    let home = var("HOMEDRIVE") + &var("HOMEPATH");
    if !home.is_empty() {
        return home;
    }
    var("USERPROFILE")
}

/// Per-user cache directory for `kind`, falling back to `home`.
pub fn cache_dir_from(
    kind: PlatformKind,
    home: &str,
    env: impl Fn(&str) -> Option<String>,
) -> String {
    let non_empty = |key: &str| env(key).filter(|v| !v.is_empty());

    let cache = match kind {
        PlatformKind::Windows => non_empty("LOCALAPPDATA"),
        _ => non_empty("XDG_CACHE_HOME").or_else(|| {
            (!home.is_empty()).then(|| format!("{}/.cache", home.trim_end_matches('/')))
        }),
    };
    cache.unwrap_or_else(|| home.to_string())
}

// ── Path conventions ──────────────────────────────────────────────────────────

/// Swap separators so `path` follows `style`.  Pure string rewrite, no
/// filesystem access.
pub fn convert_path(path: &str, style: PathStyle) -> String {
    match style {
        PathStyle::Unix => path.replace('\\', "/"),
        PathStyle::Windows => path.replace('/', "\\"),
    }
}

// ── Writable directories ──────────────────────────────────────────────────────

/// `Ok` when `path` is an existing directory with the owner write bit set;
/// otherwise the reason it is not.
pub fn check_dir_writable(path: &Path) -> std::result::Result<(), String> {
    let meta = fs::metadata(path).map_err(|e| e.to_string())?;
    if !meta.is_dir() {
        return Err("Path isn't a directory".to_string());
    }
    if !owner_can_write(&meta) {
        return Err("Write permission bit is not set on this file for user".to_string());
    }
    Ok(())
}

#[cfg(unix)]
fn owner_can_write(meta: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o200 != 0
}

#[cfg(not(unix))]
fn owner_can_write(meta: &fs::Metadata) -> bool {
    !meta.permissions().readonly()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
