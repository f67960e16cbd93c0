// ── Result types ──────────────────────────────────────────────────────────────
//
// Stable value types handed back to callers.  None of these carry a native
// handle or an OS-specific representation; they are plain data, serialisable
// for the `promptenv` snapshot binary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ── Platform identity ─────────────────────────────────────────────────────────

/// The operating system this build targets.  Fixed at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    Windows,
    Linux,
    Darwin,
    /// Any other unix flavour (BSDs, illumos, …).
    Unix,
}

impl PlatformKind {
    /// The platform of the running build.
    pub const fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else if cfg!(target_os = "macos") {
            Self::Darwin
        } else {
            Self::Unix
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Unix => "unix",
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Registry values ───────────────────────────────────────────────────────────

/// A decoded registry value.
///
/// Exactly one payload per variant; `display` is the canonical string form
/// shown in prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RegistryValue {
    /// `REG_SZ` / `REG_EXPAND_SZ`, unexpanded.
    String { value: String },
    /// 32-bit integer, displayed as `0x` + 8 uppercase hex digits.
    DWord { value: u32, display: String },
    /// 64-bit integer, displayed as `0x` + 16 uppercase hex digits.
    QWord { value: u64, display: String },
    /// Raw bytes.  `display` is the bytes read as UTF-8 (lossy), so it is
    /// only meaningful for values that actually hold text.
    Binary { value: Vec<u8>, display: String },
}

impl RegistryValue {
    pub fn dword(value: u32) -> Self {
        Self::DWord {
            value,
            display: format!("0x{value:08X}"),
        }
    }

    pub fn qword(value: u64) -> Self {
        Self::QWord {
            value,
            display: format!("0x{value:016X}"),
        }
    }

    pub fn binary(value: Vec<u8>) -> Self {
        let display = String::from_utf8_lossy(&value).into_owned();
        Self::Binary { value, display }
    }

    /// Short type tag: `STRING`, `DWORD`, `QWORD` or `BINARY`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String { .. } => "STRING",
            Self::DWord { .. } => "DWORD",
            Self::QWord { .. } => "QWORD",
            Self::Binary { .. } => "BINARY",
        }
    }

    /// The canonical display string.
    pub fn display(&self) -> &str {
        match self {
            Self::String { value } => value,
            Self::DWord { display, .. }
            | Self::QWord { display, .. }
            | Self::Binary { display, .. } => display,
        }
    }
}

impl fmt::Display for RegistryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}

// ── Network connections ───────────────────────────────────────────────────────

/// Adapter class of a discovered connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Ethernet,
    Wifi,
    Cellular,
    Bluetooth,
}

impl ConnectionType {
    pub const ALL: [ConnectionType; 4] = [
        ConnectionType::Ethernet,
        ConnectionType::Wifi,
        ConnectionType::Cellular,
        ConnectionType::Bluetooth,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ethernet => "ethernet",
            Self::Wifi => "wifi",
            Self::Cellular => "cellular",
            Self::Bluetooth => "bluetooth",
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown connection type '{s}'"))
    }
}

/// One active network adapter, as reported by the platform's discovery
/// routine.  Only discovery constructs these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    /// Adapter name (`eth0`, `Wi-Fi`, …).
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ConnectionType,
    /// Link speeds in bits per second; 0 when unknown.
    pub transmit_rate: u64,
    pub receive_rate: u64,
    /// Wi-Fi only.
    pub ssid: Option<String>,
    /// Signal quality 0–100, Wi-Fi only.
    pub signal: Option<u8>,
}

// ── Path conventions ──────────────────────────────────────────────────────────

/// Target convention for `convert_path`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStyle {
    /// `/`-separated.
    Unix,
    /// `\`-separated.
    Windows,
}

impl PathStyle {
    /// The convention native to `kind`.
    pub const fn for_platform(kind: PlatformKind) -> Self {
        match kind {
            PlatformKind::Windows => Self::Windows,
            PlatformKind::Linux | PlatformKind::Darwin | PlatformKind::Unix => Self::Unix,
        }
    }
}
