// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except:
//   • `platform::win32` – Win32 FFI (token, console, registry, IP Helper, WLAN)
//   • `platform::unix`  – libc FFI (geteuid, TIOCGWINSZ)
// Each unsafe block in those modules MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]

//! Host-system facts for shell prompts.
//!
//! [`Environment`] answers a fixed set of questions about the machine a
//! prompt is rendered on (privilege level, home directory, terminal width,
//! directory permissions, registry values, active network connections)
//! behind one interface, with one native implementation per platform chosen
//! at compile time.
//!
//! ```no_run
//! use promptenv::{config, ConnectionType, Environment};
//!
//! let env = Environment::new(config::from_env());
//! if let Ok(wifi) = env.connection(ConnectionType::Wifi) {
//!     println!("{} {:?}", wifi.name, wifi.ssid);
//! }
//! ```

pub mod config;
pub mod connection;
pub mod environment;
pub mod error;
pub mod platform;
pub mod registry;
pub mod trace;
pub mod types;

pub use config::Flags;
pub use environment::Environment;
pub use error::{EnvError, Result};
pub use platform::{NativePlatform, Platform};
pub use types::{Connection, ConnectionType, PathStyle, PlatformKind, RegistryValue};
