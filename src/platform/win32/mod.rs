// ── Win32 platform implementation ─────────────────────────────────────────────
//
// This is one of exactly two modules in the codebase where `unsafe` code is
// permitted (the other is `platform::unix`).  Every `unsafe` block MUST
// carry a `// SAFETY:` comment that states:
//   • which invariant makes the operation sound, and
//   • what the caller is responsible for maintaining.
//
// Native handles (console, registry keys, WLAN client, MIB tables) are owned
// by small guard types that release them on drop.

#![allow(unsafe_code)]

use crate::error::Result;
use crate::registry::ValueStore;
use crate::types::{Connection, PlatformKind};

use super::Platform;

// ── Sub-modules ───────────────────────────────────────────────────────────────

pub(crate) mod console; // CONOUT$ screen-buffer geometry
pub(crate) mod network; // GetIfTable2 + WLAN enrichment
pub(crate) mod registry; // RegOpenKeyExW / RegQueryValueExW
pub(crate) mod token; // Administrators SID membership

// ── Platform ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Win32Platform {
    registry: registry::Win32Registry,
}

impl Win32Platform {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Platform for Win32Platform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Windows
    }

    fn is_elevated(&self) -> std::result::Result<bool, String> {
        token::is_admin_member()
    }

    fn console_width(&self) -> Result<u16> {
        console::columns()
    }

    fn env_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn is_wsl(&self) -> bool {
        false
    }

    fn is_wsl2(&self) -> bool {
        false
    }

    fn registry(&self) -> &dyn ValueStore {
        &self.registry
    }

    fn discover_connections(&self) -> Vec<Connection> {
        network::discover()
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Null-terminated UTF-16 copy of `s`.
pub(crate) fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Convert a (possibly) null-terminated UTF-16 buffer to a `String`.
pub(crate) fn string_from_wide(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}
