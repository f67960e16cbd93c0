// ── Adapter discovery (IP Helper + WLAN) ──────────────────────────────────────
//
// `GetIfTable2` lists every interface; we keep hardware interfaces that are
// operationally up and classify them by IANA ifType and physical medium.
// Wi-Fi rows are then enriched with SSID and signal quality from the WLAN
// service, when it is running.

#![allow(unsafe_code)]

use std::collections::HashMap;
use std::ffi::c_void;

use tracing::{debug, error};
use windows::{
    core::GUID,
    Win32::{
        Foundation::HANDLE,
        NetworkManagement::{
            IpHelper::{FreeMibTable, GetIfTable2, MIB_IF_ROW2, MIB_IF_TABLE2},
            WiFi::{
                wlan_intf_opcode_current_connection, WlanCloseHandle, WlanEnumInterfaces,
                WlanFreeMemory, WlanOpenHandle, WlanQueryInterface, WLAN_CONNECTION_ATTRIBUTES,
                WLAN_INTERFACE_INFO_LIST,
            },
        },
    },
};

use super::string_from_wide;
use crate::types::{Connection, ConnectionType};

const OPERATION: &str = "Connection";

// IANA ifType values (ipifcons.h).
const IF_TYPE_ETHERNET_CSMACD: u32 = 6;
const IF_TYPE_IEEE80211: u32 = 71;
const IF_TYPE_WWANPP: u32 = 243;
const IF_TYPE_WWANPP2: u32 = 244;

/// `IfOperStatusUp`.
const OPER_STATUS_UP: i32 = 1;

/// `NdisPhysicalMediumBluetooth`.
const PHYSICAL_MEDIUM_BLUETOOTH: i32 = 10;

/// Bit 0 of `InterfaceAndOperStatusFlags`.
const FLAG_HARDWARE_INTERFACE: u8 = 0x01;

/// Client version for Windows Vista and later.
const WLAN_CLIENT_VERSION: u32 = 2;

pub(crate) fn discover() -> Vec<Connection> {
    let rows = match interface_rows() {
        Ok(rows) => rows,
        Err(detail) => {
            error!(operation = OPERATION, error = %detail);
            return Vec::new();
        }
    };

    let mut wlan = match WlanClient::open() {
        Ok(client) => client.connections(),
        Err(detail) => {
            debug!(operation = OPERATION, %detail, "WLAN service unavailable");
            HashMap::new()
        }
    };

    rows.into_iter()
        .map(|row| {
            let (ssid, signal) = match row.kind {
                ConnectionType::Wifi => wlan.remove(&row.guid).unwrap_or((None, None)),
                _ => (None, None),
            };
            Connection {
                name: row.alias,
                kind: row.kind,
                transmit_rate: row.transmit_rate,
                receive_rate: row.receive_rate,
                ssid,
                signal,
            }
        })
        .collect()
}

// ── Interface table ───────────────────────────────────────────────────────────

struct InterfaceRow {
    guid: GUID,
    alias: String,
    kind: ConnectionType,
    transmit_rate: u64,
    receive_rate: u64,
}

/// MIB table from `GetIfTable2`; freed on drop.
struct MibTable(*mut MIB_IF_TABLE2);

impl Drop for MibTable {
    fn drop(&mut self) {
        // SAFETY: the pointer came from a successful GetIfTable2 and is freed
        // exactly once, here.
        unsafe { FreeMibTable(self.0 as *const c_void) };
    }
}

fn interface_rows() -> Result<Vec<InterfaceRow>, String> {
    let mut table: *mut MIB_IF_TABLE2 = std::ptr::null_mut();
    // SAFETY: `table` is a valid out-pointer; ownership of the returned
    // buffer passes to MibTable.
    let status = unsafe { GetIfTable2(&mut table) };
    if status.is_err() {
        return Err(format!(
            "GetIfTable2: {}",
            windows::core::Error::from(status).message()
        ));
    }
    let table = MibTable(table);

    // SAFETY: GetIfTable2 succeeded, so `table.0` points to a header followed
    // by `NumEntries` contiguous rows, all alive until `table` drops.
    let rows: &[MIB_IF_ROW2] = unsafe {
        let header = &*table.0;
        std::slice::from_raw_parts(header.Table.as_ptr(), header.NumEntries as usize)
    };

    Ok(rows.iter().filter_map(classify).collect())
}

fn classify(row: &MIB_IF_ROW2) -> Option<InterfaceRow> {
    if row.InterfaceAndOperStatusFlags._bitfield & FLAG_HARDWARE_INTERFACE == 0 {
        return None;
    }
    if row.OperStatus.0 != OPER_STATUS_UP {
        return None;
    }

    let kind = match row.Type {
        IF_TYPE_ETHERNET_CSMACD if row.PhysicalMediumType.0 == PHYSICAL_MEDIUM_BLUETOOTH => {
            ConnectionType::Bluetooth
        }
        IF_TYPE_ETHERNET_CSMACD => ConnectionType::Ethernet,
        IF_TYPE_IEEE80211 => ConnectionType::Wifi,
        IF_TYPE_WWANPP | IF_TYPE_WWANPP2 => ConnectionType::Cellular,
        _ => return None,
    };

    Some(InterfaceRow {
        guid: row.InterfaceGuid,
        alias: string_from_wide(&row.Alias),
        kind,
        transmit_rate: row.TransmitLinkSpeed,
        receive_rate: row.ReceiveLinkSpeed,
    })
}

// ── WLAN enrichment ───────────────────────────────────────────────────────────

/// WLAN client session; closed on drop.
struct WlanClient(HANDLE);

impl Drop for WlanClient {
    fn drop(&mut self) {
        // SAFETY: the handle came from a successful WlanOpenHandle and is
        // closed exactly once, here.
        unsafe {
            let _ = WlanCloseHandle(self.0, None);
        }
    }
}

/// Buffer allocated by the WLAN API; freed on drop.
struct WlanMemory(*mut c_void);

impl Drop for WlanMemory {
    fn drop(&mut self) {
        // SAFETY: the pointer was allocated by the WLAN API and is freed
        // exactly once, here.
        unsafe { WlanFreeMemory(self.0 as *const c_void) };
    }
}

impl WlanClient {
    fn open() -> Result<Self, String> {
        let mut negotiated = 0u32;
        let mut handle = HANDLE::default();
        // SAFETY: both out-pointers are valid locals.
        let status =
            unsafe { WlanOpenHandle(WLAN_CLIENT_VERSION, None, &mut negotiated, &mut handle) };
        if status != 0 {
            return Err(format!("WlanOpenHandle returned {status}"));
        }
        Ok(Self(handle))
    }

    /// SSID and signal quality per connected interface GUID.
    fn connections(&self) -> HashMap<GUID, (Option<String>, Option<u8>)> {
        let mut found = HashMap::new();

        let mut list: *mut WLAN_INTERFACE_INFO_LIST = std::ptr::null_mut();
        // SAFETY: `self.0` is an open client handle; `list` is a valid
        // out-pointer whose buffer WlanMemory releases.
        let status = unsafe { WlanEnumInterfaces(self.0, None, &mut list) };
        if status != 0 {
            debug!(operation = OPERATION, status, "WlanEnumInterfaces failed");
            return found;
        }
        let list = WlanMemory(list as *mut c_void);

        // SAFETY: WlanEnumInterfaces succeeded, so the buffer holds a header
        // followed by `dwNumberOfItems` entries, alive until `list` drops.
        let interfaces = unsafe {
            let header = &*(list.0 as *const WLAN_INTERFACE_INFO_LIST);
            std::slice::from_raw_parts(
                header.InterfaceInfo.as_ptr(),
                header.dwNumberOfItems as usize,
            )
        };

        for info in interfaces {
            if let Some(attrs) = self.current_connection(&info.InterfaceGuid) {
                found.insert(info.InterfaceGuid, attrs);
            }
        }
        found
    }

    fn current_connection(&self, guid: &GUID) -> Option<(Option<String>, Option<u8>)> {
        let mut size = 0u32;
        let mut data: *mut c_void = std::ptr::null_mut();
        // SAFETY: `guid` outlives the call; `size` and `data` are valid
        // out-pointers and WlanMemory releases the returned buffer.
        let status = unsafe {
            WlanQueryInterface(
                self.0,
                guid,
                wlan_intf_opcode_current_connection,
                None,
                &mut size,
                &mut data,
                None,
            )
        };
        if status != 0 || data.is_null() {
            return None;
        }
        let data = WlanMemory(data);

        // SAFETY: for this opcode the buffer is a WLAN_CONNECTION_ATTRIBUTES.
        let attrs = unsafe { &*(data.0 as *const WLAN_CONNECTION_ATTRIBUTES) };
        let assoc = &attrs.wlanAssociationAttributes;
        let len = (assoc.dot11Ssid.uSSIDLength as usize).min(assoc.dot11Ssid.ucSSID.len());
        let ssid = String::from_utf8_lossy(&assoc.dot11Ssid.ucSSID[..len]).into_owned();
        let signal = assoc.wlanSignalQuality.min(100) as u8;

        Some(((!ssid.is_empty()).then_some(ssid), Some(signal)))
    }
}
