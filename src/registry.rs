// ── Registry value decoder ────────────────────────────────────────────────────
//
// Turns `ROOT\segment\...\KEY` into a typed `RegistryValue`:
//   1. split off the root alias (no separator → MalformedPath)
//   2. resolve the alias (unknown → UnknownRoot)
//   3. last segment = value name; trailing `\` = the key's default value
//   4-5. open + query through a `ValueStore` (failure → StoreAccess)
//   6-7. decode by declared type (anything else → UnsupportedValueType)
//
// Parsing and decoding are pure and run on every platform.  Only the
// `ValueStore` implementation touches the OS.

use tracing::{debug, error};

use crate::error::{EnvError, Result};
use crate::types::RegistryValue;

const OPERATION: &str = "WindowsRegistryKeyValue";
const SEPARATOR: char = '\\';

// ── Native type codes (winnt.h) ───────────────────────────────────────────────

pub const REG_NONE: u32 = 0;
pub const REG_SZ: u32 = 1;
pub const REG_EXPAND_SZ: u32 = 2;
pub const REG_BINARY: u32 = 3;
pub const REG_DWORD: u32 = 4;
pub const REG_DWORD_BIG_ENDIAN: u32 = 5;
pub const REG_MULTI_SZ: u32 = 7;
pub const REG_QWORD: u32 = 11;

// ── Roots ─────────────────────────────────────────────────────────────────────

/// Top-level registry namespaces reachable through a root alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryRoot {
    ClassesRoot,
    CurrentConfig,
    CurrentUser,
    LocalMachine,
    Users,
}

impl RegistryRoot {
    /// Resolve a short (`HKLM`) or long (`HKEY_LOCAL_MACHINE`) alias.
    pub fn from_alias(alias: &str) -> Option<Self> {
        match alias {
            "HKCR" | "HKEY_CLASSES_ROOT" => Some(Self::ClassesRoot),
            "HKCC" | "HKEY_CURRENT_CONFIG" => Some(Self::CurrentConfig),
            "HKCU" | "HKEY_CURRENT_USER" => Some(Self::CurrentUser),
            "HKLM" | "HKEY_LOCAL_MACHINE" => Some(Self::LocalMachine),
            "HKU" | "HKEY_USERS" => Some(Self::Users),
            _ => None,
        }
    }

    /// Long-form name, as written in `regedit`.
    pub fn long_name(self) -> &'static str {
        match self {
            Self::ClassesRoot => "HKEY_CLASSES_ROOT",
            Self::CurrentConfig => "HKEY_CURRENT_CONFIG",
            Self::CurrentUser => "HKEY_CURRENT_USER",
            Self::LocalMachine => "HKEY_LOCAL_MACHINE",
            Self::Users => "HKEY_USERS",
        }
    }
}

/// A parsed registry path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryQuery<'a> {
    pub root: RegistryRoot,
    /// Segments between the root and the value name, `\`-joined.
    pub subkey: &'a str,
    /// Empty for the key's default value.
    pub value_name: &'a str,
}

/// Split and resolve a registry path without touching the store.
pub fn parse_path(path: &str) -> Result<RegistryQuery<'_>> {
    let Some((alias, rest)) = path.split_once(SEPARATOR) else {
        return Err(EnvError::MalformedPath(path.to_string()));
    };
    let root = RegistryRoot::from_alias(alias).ok_or_else(|| EnvError::UnknownRoot(alias.to_string()))?;

    let (subkey, value_name) = match rest.strip_suffix(SEPARATOR) {
        Some(subkey) => (subkey, ""),
        None => rest.rsplit_once(SEPARATOR).unwrap_or(("", rest)),
    };
    Ok(RegistryQuery {
        root,
        subkey,
        value_name,
    })
}

// ── Store access ──────────────────────────────────────────────────────────────

/// Undecoded value as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue {
    pub type_code: u32,
    pub data: Vec<u8>,
}

/// Read-only access to a hierarchical configuration store.
///
/// Implementations open `subkey` under `root` for reading, query
/// `value_name` and release the key before returning.  Every failure maps to
/// [`EnvError::StoreAccess`] with the native detail and is logged here, where
/// it is detected.
pub trait ValueStore {
    fn query(&self, root: RegistryRoot, subkey: &str, value_name: &str) -> Result<RawValue>;
}

/// Resolve `path` against `store` and decode the value.
pub fn read_value(store: &dyn ValueStore, path: &str) -> Result<RegistryValue> {
    let query = parse_path(path).inspect_err(|err| error!(operation = OPERATION, error = %err))?;
    debug!(
        operation = OPERATION,
        root = query.root.long_name(),
        subkey = query.subkey,
        value = query.value_name,
        "path resolved"
    );

    // The store logs its own failures.
    let raw = store.query(query.root, query.subkey, query.value_name)?;

    let value = decode(raw)
        .map_err(|err| match err {
            EnvError::StoreAccess { detail, .. } => EnvError::StoreAccess {
                path: path.to_string(),
                detail,
            },
            other => other,
        })
        .inspect_err(|err| error!(operation = OPERATION, error = %err))?;
    debug!(
        operation = OPERATION,
        "{}({}): {}",
        query.value_name,
        value.type_name(),
        value.display()
    );
    Ok(value)
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// Decode a raw value by its declared type.
///
/// Integer payloads must be exactly 4 or 8 bytes; anything else is reported
/// as `StoreAccess` with an empty path, which `read_value` fills in.
pub fn decode(raw: RawValue) -> Result<RegistryValue> {
    match raw.type_code {
        REG_SZ | REG_EXPAND_SZ => Ok(RegistryValue::String {
            value: utf16_to_string(&raw.data),
        }),
        REG_DWORD => Ok(RegistryValue::dword(u32::from_le_bytes(exact(&raw)?))),
        REG_DWORD_BIG_ENDIAN => Ok(RegistryValue::dword(u32::from_be_bytes(exact(&raw)?))),
        REG_QWORD => Ok(RegistryValue::qword(u64::from_le_bytes(exact(&raw)?))),
        REG_BINARY => Ok(RegistryValue::binary(raw.data)),
        other => Err(EnvError::UnsupportedValueType(other)),
    }
}

/// Little-endian UTF-16 up to the first NUL.
fn utf16_to_string(data: &[u8]) -> String {
    let units: Vec<u16> = data
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .take_while(|&unit| unit != 0)
        .collect();
    String::from_utf16_lossy(&units)
}

/// The payload as exactly `N` bytes.
fn exact<const N: usize>(raw: &RawValue) -> Result<[u8; N]> {
    <[u8; N]>::try_from(raw.data.as_slice()).map_err(|_| EnvError::StoreAccess {
        path: String::new(),
        detail: format!(
            "value of type {} holds {} bytes, expected {N}",
            raw.type_code,
            raw.data.len()
        ),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::trace::count_error_events;

    /// Records every query and answers with a fixed value.
    struct FakeStore {
        answer: Result<RawValue>,
        calls: RefCell<Vec<(RegistryRoot, String, String)>>,
    }

    impl FakeStore {
        fn answering(type_code: u32, data: Vec<u8>) -> Self {
            Self {
                answer: Ok(RawValue { type_code, data }),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl ValueStore for FakeStore {
        fn query(&self, root: RegistryRoot, subkey: &str, value_name: &str) -> Result<RawValue> {
            self.calls
                .borrow_mut()
                .push((root, subkey.to_string(), value_name.to_string()));
            self.answer.clone()
        }
    }

    fn utf16(s: &str) -> Vec<u8> {
        s.encode_utf16()
            .chain(std::iter::once(0))
            .flat_map(u16::to_le_bytes)
            .collect()
    }

    #[test]
    fn path_without_separator_is_malformed_and_never_queries() {
        let store = FakeStore::answering(REG_DWORD, vec![0; 4]);
        let err = read_value(&store, "HKLM").unwrap_err();
        assert_eq!(err, EnvError::MalformedPath("HKLM".into()));
        assert!(store.calls.borrow().is_empty());
    }

    #[test]
    fn unknown_root_never_queries() {
        let store = FakeStore::answering(REG_DWORD, vec![0; 4]);
        let err = read_value(&store, r"FOO\Bar\Baz").unwrap_err();
        assert_eq!(err, EnvError::UnknownRoot("FOO".into()));
        assert!(store.calls.borrow().is_empty());
    }

    #[test]
    fn short_and_long_aliases_resolve_identically() {
        let pairs = [
            ("HKCR", "HKEY_CLASSES_ROOT"),
            ("HKCC", "HKEY_CURRENT_CONFIG"),
            ("HKCU", "HKEY_CURRENT_USER"),
            ("HKLM", "HKEY_LOCAL_MACHINE"),
            ("HKU", "HKEY_USERS"),
        ];
        for (short, long) in pairs {
            let short_path = format!(r"{short}\Software\Value");
            let long_path = format!(r"{long}\Software\Value");
            let a = parse_path(&short_path).expect("short");
            let b = parse_path(&long_path).expect("long");
            assert_eq!(a, b, "{short} vs {long}");
            assert_eq!(a.root.long_name(), long);
        }
    }

    #[test]
    fn splits_subkey_and_value_name() {
        let q = parse_path(r"HKLM\Software\Microsoft\Windows NT\CurrentVersion\EditionID")
            .expect("parse");
        assert_eq!(q.root, RegistryRoot::LocalMachine);
        assert_eq!(q.subkey, r"Software\Microsoft\Windows NT\CurrentVersion");
        assert_eq!(q.value_name, "EditionID");
    }

    #[test]
    fn trailing_separator_selects_default_value() {
        let q = parse_path(r"HKCU\Software\Classes\").expect("parse");
        assert_eq!(q.subkey, r"Software\Classes");
        assert_eq!(q.value_name, "");
    }

    #[test]
    fn value_directly_under_root() {
        let q = parse_path(r"HKU\Value").expect("parse");
        assert_eq!(q.subkey, "");
        assert_eq!(q.value_name, "Value");
    }

    #[test]
    fn store_receives_parsed_segments() {
        let store = FakeStore::answering(REG_SZ, utf16("Professional"));
        let value = read_value(&store, r"HKEY_LOCAL_MACHINE\Software\Edition").expect("read");
        assert_eq!(
            value,
            RegistryValue::String {
                value: "Professional".into()
            }
        );
        assert_eq!(
            store.calls.borrow().as_slice(),
            &[(
                RegistryRoot::LocalMachine,
                "Software".to_string(),
                "Edition".to_string()
            )]
        );
    }

    #[test]
    fn store_failure_passes_through() {
        let store = FakeStore {
            answer: Err(EnvError::StoreAccess {
                path: r"Software\Missing".into(),
                detail: "The system cannot find the file specified.".into(),
            }),
            calls: RefCell::new(Vec::new()),
        };
        let err = read_value(&store, r"HKLM\Software\Missing\Value").unwrap_err();
        assert!(matches!(err, EnvError::StoreAccess { .. }));
    }

    #[test]
    fn dword_and_qword_255() {
        let dword = decode(RawValue {
            type_code: REG_DWORD,
            data: 255u32.to_le_bytes().to_vec(),
        })
        .expect("dword");
        assert_eq!(dword, RegistryValue::dword(255));
        assert_eq!(dword.display(), "0x000000FF");

        let qword = decode(RawValue {
            type_code: REG_QWORD,
            data: 255u64.to_le_bytes().to_vec(),
        })
        .expect("qword");
        assert_eq!(qword.display(), "0x00000000000000FF");
    }

    #[test]
    fn big_endian_dword_decodes_as_dword() {
        let value = decode(RawValue {
            type_code: REG_DWORD_BIG_ENDIAN,
            data: vec![0, 0, 0, 0xff],
        })
        .expect("dword be");
        assert_eq!(value, RegistryValue::dword(255));
    }

    #[test]
    fn expand_sz_stays_unexpanded() {
        let value = decode(RawValue {
            type_code: REG_EXPAND_SZ,
            data: utf16(r"%SystemRoot%\system32"),
        })
        .expect("expand_sz");
        assert_eq!(value.display(), r"%SystemRoot%\system32");
    }

    #[test]
    fn binary_is_reinterpreted_as_text() {
        let value = decode(RawValue {
            type_code: REG_BINARY,
            data: b"abc".to_vec(),
        })
        .expect("binary");
        assert_eq!(value.display(), "abc");
    }

    #[test]
    fn short_integer_payloads_are_rejected() {
        for (type_code, data) in [
            (REG_DWORD, vec![0xff, 0x01]),
            (REG_DWORD_BIG_ENDIAN, vec![0xff]),
            (REG_QWORD, 255u32.to_le_bytes().to_vec()),
        ] {
            let err = decode(RawValue { type_code, data }).unwrap_err();
            assert!(matches!(err, EnvError::StoreAccess { .. }), "type {type_code}");
        }
    }

    #[test]
    fn short_payload_error_names_the_requested_path() {
        let store = FakeStore::answering(REG_DWORD, vec![0xff, 0x01]);
        let err = read_value(&store, r"HKCU\Software\Short").unwrap_err();
        match err {
            EnvError::StoreAccess { path, detail } => {
                assert_eq!(path, r"HKCU\Software\Short");
                assert!(detail.contains("2 bytes"), "{detail}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn store_failures_are_not_logged_again_by_the_decoder() {
        let store = FakeStore {
            answer: Err(EnvError::StoreAccess {
                path: r"Software\Missing".into(),
                detail: "not found".into(),
            }),
            calls: RefCell::new(Vec::new()),
        };
        let (result, errors) =
            count_error_events(|| read_value(&store, r"HKLM\Software\Missing\Value"));
        assert!(result.is_err());
        assert_eq!(errors, 0);

        let (result, errors) = count_error_events(|| read_value(&store, "HKLM"));
        assert!(result.is_err());
        assert_eq!(errors, 1);
    }

    #[test]
    fn unsupported_types_name_the_code() {
        for code in [REG_NONE, REG_MULTI_SZ, 6] {
            let err = decode(RawValue {
                type_code: code,
                data: Vec::new(),
            })
            .unwrap_err();
            assert_eq!(err, EnvError::UnsupportedValueType(code));
        }
    }
}
