// ── Adapter discovery (sysfs) ─────────────────────────────────────────────────
//
// Walks `/sys/class/net` and classifies every operationally-up physical
// interface.  Wi-Fi link quality comes from `/proc/net/wireless`.  Other unix
// targets have neither file and discover nothing.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::types::{Connection, ConnectionType};

const SYS_CLASS_NET: &str = "/sys/class/net";
const PROC_NET_WIRELESS: &str = "/proc/net/wireless";

/// `ARPHRD_ETHER` from `if_arp.h`.
const ARPHRD_ETHER: u32 = 1;

/// Upper bound of the link-quality column for most drivers.
const LINK_QUALITY_MAX: f64 = 70.0;

pub(crate) fn discover() -> Vec<Connection> {
    if !cfg!(target_os = "linux") {
        debug!(operation = "Connection", "adapter discovery not supported on this platform");
        return Vec::new();
    }
    discover_in(Path::new(SYS_CLASS_NET), Path::new(PROC_NET_WIRELESS))
}

/// Discovery against an arbitrary sysfs root, for tests.
pub(crate) fn discover_in(net_root: &Path, wireless_stats: &Path) -> Vec<Connection> {
    let entries = match fs::read_dir(net_root) {
        Ok(entries) => entries,
        Err(e) => {
            error!(operation = "Connection", path = %net_root.display(), error = %e);
            return Vec::new();
        }
    };

    let stats = fs::read_to_string(wireless_stats).unwrap_or_default();

    let mut interfaces: Vec<(String, PathBuf)> = entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            Some((name, entry.path()))
        })
        .filter(|(name, _)| name != "lo")
        .collect();
    interfaces.sort_unstable();

    interfaces
        .into_iter()
        .filter(|(_, dir)| is_up(dir) && dir.join("device").exists())
        .filter_map(|(name, dir)| {
            let kind = classify(&dir)?;
            let rate = link_speed_bps(&dir);
            let signal = match kind {
                ConnectionType::Wifi => link_quality(&stats, &name),
                _ => None,
            };
            Some(Connection {
                name,
                kind,
                transmit_rate: rate,
                receive_rate: rate,
                ssid: None,
                signal,
            })
        })
        .collect()
}

fn read_trimmed(path: PathBuf) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

fn is_up(dir: &Path) -> bool {
    read_trimmed(dir.join("operstate")).as_deref() == Some("up")
}

fn classify(dir: &Path) -> Option<ConnectionType> {
    if dir.join("wireless").exists() || dir.join("phy80211").exists() {
        return Some(ConnectionType::Wifi);
    }

    let uevent = read_trimmed(dir.join("uevent")).unwrap_or_default();
    let devtype = uevent
        .lines()
        .find_map(|line| line.strip_prefix("DEVTYPE="))
        .map(str::trim);
    match devtype {
        Some("wwan") => return Some(ConnectionType::Cellular),
        Some("bluetooth") => return Some(ConnectionType::Bluetooth),
        Some("wlan") => return Some(ConnectionType::Wifi),
        _ => {}
    }

    let arp_type = read_trimmed(dir.join("type")).and_then(|t| t.parse::<u32>().ok());
    (arp_type == Some(ARPHRD_ETHER)).then_some(ConnectionType::Ethernet)
}

/// `speed` is in Mb/s and reads as -1 (or fails) when unknown.
fn link_speed_bps(dir: &Path) -> u64 {
    read_trimmed(dir.join("speed"))
        .and_then(|s| s.parse::<i64>().ok())
        .filter(|&mbps| mbps > 0)
        .map(|mbps| mbps as u64 * 1_000_000)
        .unwrap_or(0)
}

/// Link quality of `iface` scaled to 0–100.
///
/// ```text
/// Inter-| sta-|   Quality        |   Discarded packets
///  face | tus | link level noise |  nwid  crypt   frag
///  wlan0: 0000   54.  -56.  -256        0      0      0
/// ```
fn link_quality(stats: &str, iface: &str) -> Option<u8> {
    stats.lines().skip(2).find_map(|line| {
        let (name, rest) = line.split_once(':')?;
        if name.trim() != iface {
            return None;
        }
        let quality: f64 = rest
            .split_whitespace()
            .nth(1)?
            .trim_end_matches('.')
            .parse()
            .ok()?;
        let percent = (quality / LINK_QUALITY_MAX * 100.0).round().clamp(0.0, 100.0);
        Some(percent as u8)
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
