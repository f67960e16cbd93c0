// ── Unix platform implementation ──────────────────────────────────────────────
//
// One of the two modules where `unsafe` code is permitted (the other is
// `platform::win32`).  Every `unsafe` block MUST carry a `// SAFETY:` comment.

#![allow(unsafe_code)]

use std::fs;

use tracing::error;

use crate::error::{EnvError, Result};
use crate::registry::{RawValue, RegistryRoot, ValueStore};
use crate::types::{Connection, PlatformKind};

use super::Platform;

// ── Sub-modules ───────────────────────────────────────────────────────────────

pub(crate) mod network; // adapter discovery via sysfs
pub(crate) mod terminal; // TIOCGWINSZ on the controlling terminal

// ── Platform ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct UnixPlatform {
    registry: NoRegistry,
}

impl UnixPlatform {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Platform for UnixPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::current()
    }

    fn is_elevated(&self) -> std::result::Result<bool, String> {
        // SAFETY: geteuid takes no arguments, cannot fail and touches no
        // memory owned by us.
        Ok(unsafe { libc::geteuid() } == 0)
    }

    fn console_width(&self) -> Result<u16> {
        terminal::columns()
    }

    fn env_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn is_wsl(&self) -> bool {
        kernel_version("IsWsl").is_some_and(|version| mentions_microsoft(&version))
    }

    fn is_wsl2(&self) -> bool {
        kernel_version("IsWsl2").is_some_and(|version| is_wsl2_kernel(&version))
    }

    fn registry(&self) -> &dyn ValueStore {
        &self.registry
    }

    fn discover_connections(&self) -> Vec<Connection> {
        network::discover()
    }
}

/// Contents of `/proc/version`; `None` off Linux or when unreadable.
fn kernel_version(operation: &'static str) -> Option<String> {
    if !cfg!(target_os = "linux") {
        return None;
    }
    fs::read_to_string("/proc/version")
        .inspect_err(|e| error!(operation, error = %e))
        .ok()
}

fn mentions_microsoft(proc_version: &str) -> bool {
    proc_version.to_ascii_lowercase().contains("microsoft")
}

/// WSL2 kernels are built as `*-microsoft-standard[-WSL2]`; WSL1 reports
/// `*-Microsoft`.
fn is_wsl2_kernel(proc_version: &str) -> bool {
    let version = proc_version.to_ascii_lowercase();
    version.contains("microsoft-standard") || version.contains("wsl2")
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// Unix hosts have no registry; every lookup fails at the access step.
#[derive(Debug, Default)]
pub struct NoRegistry;

impl ValueStore for NoRegistry {
    fn query(&self, root: RegistryRoot, subkey: &str, _value_name: &str) -> Result<RawValue> {
        let err = EnvError::StoreAccess {
            path: format!("{}\\{}", root.long_name(), subkey),
            detail: "registry is not available on this platform".to_string(),
        };
        error!(operation = "WindowsRegistryKeyValue", error = %err);
        Err(err)
    }
}
