#![allow(unsafe_code)]

use tracing::{debug, error};
use windows::{
    core::PCWSTR,
    Win32::{
        Foundation::WIN32_ERROR,
        System::Registry::{
            RegCloseKey, RegOpenKeyExW, RegQueryValueExW, HKEY, HKEY_CLASSES_ROOT,
            HKEY_CURRENT_CONFIG, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, HKEY_USERS, KEY_READ,
            REG_VALUE_TYPE,
        },
    },
};

use super::to_wide;
use crate::error::{EnvError, Result};
use crate::registry::{RawValue, RegistryRoot, ValueStore};

const OPERATION: &str = "WindowsRegistryKeyValue";

/// Live registry, read-only.
#[derive(Debug, Default)]
pub struct Win32Registry;

/// Open key; closed on drop.
struct KeyGuard(HKEY);

impl Drop for KeyGuard {
    fn drop(&mut self) {
        // SAFETY: the key was opened by RegOpenKeyExW and is closed exactly
        // once, here.
        unsafe {
            let _ = RegCloseKey(self.0);
        }
    }
}

fn root_handle(root: RegistryRoot) -> HKEY {
    match root {
        RegistryRoot::ClassesRoot => HKEY_CLASSES_ROOT,
        RegistryRoot::CurrentConfig => HKEY_CURRENT_CONFIG,
        RegistryRoot::CurrentUser => HKEY_CURRENT_USER,
        RegistryRoot::LocalMachine => HKEY_LOCAL_MACHINE,
        RegistryRoot::Users => HKEY_USERS,
    }
}

impl ValueStore for Win32Registry {
    fn query(&self, root: RegistryRoot, subkey: &str, value_name: &str) -> Result<RawValue> {
        let full_path = format!("{}\\{}", root.long_name(), subkey);
        let access_error = |function: &str, status: WIN32_ERROR| {
            let err = EnvError::StoreAccess {
                path: full_path.clone(),
                detail: format!("{function}: {}", windows::core::Error::from(status).message()),
            };
            error!(operation = OPERATION, error = %err);
            err
        };

        // ── Open ─────────────────────────────────────────────────────────────
        let subkey_w = to_wide(subkey);
        let mut key = HKEY::default();
        // SAFETY: `subkey_w` is null-terminated and outlives the call; `key`
        // is a valid out-pointer.
        let status = unsafe {
            RegOpenKeyExW(
                root_handle(root),
                PCWSTR(subkey_w.as_ptr()),
                Some(0),
                KEY_READ,
                &mut key,
            )
        };
        if status.is_err() {
            return Err(access_error("RegOpenKeyExW", status));
        }
        let key = KeyGuard(key);
        debug!(operation = OPERATION, path = %full_path, "key opened");

        // ── Size + type ──────────────────────────────────────────────────────
        let name_w = to_wide(value_name);
        let mut value_type = REG_VALUE_TYPE::default();
        let mut size: u32 = 0;
        // SAFETY: data pointer is None, so only `value_type` and `size` are
        // written; both are valid out-pointers.
        let status = unsafe {
            RegQueryValueExW(
                key.0,
                PCWSTR(name_w.as_ptr()),
                None,
                Some(&mut value_type),
                None,
                Some(&mut size),
            )
        };
        if status.is_err() {
            return Err(access_error("RegQueryValueExW", status));
        }

        // ── Data ─────────────────────────────────────────────────────────────
        let mut data = vec![0u8; size as usize];
        // SAFETY: `data` is exactly `size` bytes long and `size` tells the API
        // so; it writes at most that many bytes.
        let status = unsafe {
            RegQueryValueExW(
                key.0,
                PCWSTR(name_w.as_ptr()),
                None,
                Some(&mut value_type),
                Some(data.as_mut_ptr()),
                Some(&mut size),
            )
        };
        if status.is_err() {
            return Err(access_error("RegQueryValueExW", status));
        }
        data.truncate(size as usize);

        debug!(
            operation = OPERATION,
            value = value_name,
            type_code = value_type.0,
            bytes = data.len(),
            "value queried"
        );
        Ok(RawValue {
            type_code: value_type.0,
            data,
        })
    }
}
