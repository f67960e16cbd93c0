// ── Environment facade ────────────────────────────────────────────────────────
//
// The single interface callers use.  Every public method:
//   • opens an `OperationSpan` (closed on return, whatever the path), and
//   • logs its outcome: Debug with the result, or Error with the failure.
// Boolean facts fail closed to `false`; everything else returns a typed
// `EnvError`.  One `Environment` owns one connection cache for its lifetime.

use std::path::Path;

use crate::config::Flags;
use crate::connection::ConnectionCache;
use crate::error::Result;
use crate::platform::{self, NativePlatform, Platform};
use crate::registry;
use crate::trace::{log_err, log_ok, log_result, OperationSpan};
use crate::types::{Connection, ConnectionType, PathStyle, PlatformKind, RegistryValue};

pub struct Environment<P: Platform = NativePlatform> {
    platform: P,
    flags: Flags,
    connections: ConnectionCache,
}

impl Environment<NativePlatform> {
    /// Facade over the host this binary was built for.
    pub fn new(flags: Flags) -> Self {
        Self::with_platform(NativePlatform::default(), flags)
    }
}

impl<P: Platform> Environment<P> {
    pub fn with_platform(platform: P, flags: Flags) -> Self {
        Self {
            platform,
            flags,
            connections: ConnectionCache::new(),
        }
    }

    pub fn platform(&self) -> PlatformKind {
        let _span = OperationSpan::enter("Platform");
        let kind = self.platform.kind();
        log_ok("Platform", &kind);
        kind
    }

    /// Administrative/root rights.  `false` when the check fails.
    pub fn is_elevated(&self) -> bool {
        let _span = OperationSpan::enter("Root");
        match self.platform.is_elevated() {
            Ok(elevated) => {
                log_ok("Root", &elevated);
                elevated
            }
            Err(reason) => {
                log_err("Root", &reason);
                false
            }
        }
    }

    pub fn home_dir(&self) -> String {
        let _span = OperationSpan::enter("Home");
        let home = platform::home_dir_from(|key| self.platform.env_var(key));
        log_ok("Home", &home);
        home
    }

    pub fn cache_dir(&self) -> String {
        let _span = OperationSpan::enter("CachePath");
        let home = platform::home_dir_from(|key| self.platform.env_var(key));
        let cache = platform::cache_dir_from(self.platform.kind(), &home, |key| {
            self.platform.env_var(key)
        });
        log_ok("CachePath", &cache);
        cache
    }

    /// Explicit override from the flags, else the console's column count.
    pub fn terminal_width(&self) -> Result<u16> {
        let _span = OperationSpan::enter("TerminalWidth");
        if self.flags.terminal_width != 0 {
            log_ok("TerminalWidth", &self.flags.terminal_width);
            return Ok(self.flags.terminal_width);
        }
        log_result("TerminalWidth", self.platform.console_width())
    }

    /// Existing directory with the owner write bit set.  `false` otherwise,
    /// never an error.
    pub fn dir_is_writable(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let _span = OperationSpan::with_arg("DirIsWritable", path.display().to_string());
        match platform::check_dir_writable(path) {
            Ok(()) => {
                log_ok("DirIsWritable", &true);
                true
            }
            Err(reason) => {
                log_err("DirIsWritable", &reason);
                false
            }
        }
    }

    /// Rewrite separators for `style`.  Converting to the host's own
    /// convention returns the path unchanged.
    pub fn convert_path(&self, path: &str, style: PathStyle) -> String {
        let _span = OperationSpan::with_arg("ConvertPath", path);
        let converted = if style == PathStyle::for_platform(self.platform.kind()) {
            path.to_string()
        } else {
            platform::convert_path(path, style)
        };
        log_ok("ConvertPath", &converted);
        converted
    }

    pub fn is_wsl(&self) -> bool {
        let _span = OperationSpan::enter("IsWsl");
        let wsl = self.platform.is_wsl();
        log_ok("IsWsl", &wsl);
        wsl
    }

    pub fn is_wsl2(&self) -> bool {
        let _span = OperationSpan::enter("IsWsl2");
        let wsl2 = self.platform.is_wsl2();
        log_ok("IsWsl2", &wsl2);
        wsl2
    }

    /// Typed value at `ROOT\path\to\key\VALUE` (trailing `\` = default value).
    pub fn registry_value(&self, path: &str) -> Result<RegistryValue> {
        let _span = OperationSpan::with_arg("WindowsRegistryKeyValue", path);
        log_result(
            "WindowsRegistryKeyValue",
            registry::read_value(self.platform.registry(), path),
        )
    }

    /// First active adapter of `kind`.  Discovery runs once per
    /// `Environment`, on the first call.
    pub fn connection(&self, kind: ConnectionType) -> Result<Connection> {
        let _span = OperationSpan::with_arg("Connection", kind.as_str());
        log_result(
            "Connection",
            self.connections
                .get(kind, || self.platform.discover_connections()),
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
