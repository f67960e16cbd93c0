// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible facts in promptenv return `error::Result<T>`.  No panics in
// production paths; every variant is logged at the point of detection and
// then handed back to the caller, who decides how to surface it (usually by
// omitting a prompt segment).

use thiserror::Error;

use crate::types::ConnectionType;

/// Every error that promptenv can produce.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    /// A registry path without a single `\` separator.
    #[error("malformed registry path: '{0}'")]
    MalformedPath(String),

    /// The first registry path segment is not a recognised root alias.
    #[error("unknown registry root: '{0}'")]
    UnknownRoot(String),

    /// Opening the key or querying the value failed.  `detail` carries the
    /// native error text.
    #[error("registry access failed for '{path}': {detail}")]
    StoreAccess { path: String, detail: String },

    /// The value exists but its declared type has no decoder.
    #[error("no formatter for registry value type: {0}")]
    UnsupportedValueType(u32),

    /// The console could not be opened or its geometry could not be read.
    #[error("{function} failed: {detail}")]
    ConsoleQuery {
        /// The name of the failing call, for display purposes.
        function: &'static str,
        detail: String,
    },

    /// Adapter discovery produced nothing at all.
    #[error("no connections found")]
    NoConnectionsFound,

    /// Discovery found adapters, none of the requested type.
    #[error("network type '{0}' not found")]
    ConnectionTypeNotFound(ConnectionType),
}

impl EnvError {
    /// `true` when the failure means "this fact is unavailable on this host"
    /// rather than a malformed request.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::NoConnectionsFound | Self::ConnectionTypeNotFound(_) => true,
            Self::StoreAccess { .. } | Self::ConsoleQuery { .. } => true,
            Self::MalformedPath(_) | Self::UnknownRoot(_) | Self::UnsupportedValueType(_) => false,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EnvError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_errors_are_distinct_kinds() {
        let none = EnvError::NoConnectionsFound;
        let missing = EnvError::ConnectionTypeNotFound(ConnectionType::Wifi);
        assert_ne!(none, missing);
        assert!(none.is_unavailable());
        assert!(missing.is_unavailable());
    }

    #[test]
    fn display_names_the_requested_type() {
        let err = EnvError::ConnectionTypeNotFound(ConnectionType::Cellular);
        assert_eq!(err.to_string(), "network type 'cellular' not found");
    }

    #[test]
    fn display_names_the_type_code() {
        assert_eq!(
            EnvError::UnsupportedValueType(7).to_string(),
            "no formatter for registry value type: 7"
        );
    }

    #[test]
    fn malformed_requests_are_not_unavailability() {
        assert!(!EnvError::MalformedPath("HKLM".into()).is_unavailable());
        assert!(!EnvError::UnknownRoot("FOO".into()).is_unavailable());
    }
}
