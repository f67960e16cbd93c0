// ── Connection cache ──────────────────────────────────────────────────────────
//
// Adapter discovery is comparatively slow, so it runs at most once per
// `Environment`.  The cell has three observable states:
//   • unset                      – discovery has not run yet
//   • `ConnectionSet::Empty`     – discovery ran and found nothing
//   • `ConnectionSet::Found(..)` – discovery ran and found adapters
// Transitions go unset → set only.  `OnceCell::get_or_init` makes the
// transition atomic when the facade is shared between threads.

use once_cell::sync::OnceCell;
use tracing::{debug, error};

use crate::error::{EnvError, Result};
use crate::types::{Connection, ConnectionType};

const OPERATION: &str = "Connection";

/// Memoized outcome of the single discovery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionSet {
    Empty,
    Found(Vec<Connection>),
}

impl From<Vec<Connection>> for ConnectionSet {
    fn from(connections: Vec<Connection>) -> Self {
        if connections.is_empty() {
            Self::Empty
        } else {
            Self::Found(connections)
        }
    }
}

#[derive(Debug, Default)]
pub struct ConnectionCache {
    state: OnceCell<ConnectionSet>,
}

impl ConnectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` once discovery has run, whatever it found.
    pub fn is_populated(&self) -> bool {
        self.state.get().is_some()
    }

    /// First connection of `kind`, running `discover` only if this cache has
    /// never been populated.
    pub fn get(
        &self,
        kind: ConnectionType,
        discover: impl FnOnce() -> Vec<Connection>,
    ) -> Result<Connection> {
        let set = self.state.get_or_init(|| {
            let found = discover();
            debug!(operation = OPERATION, count = found.len(), "adapter discovery finished");
            ConnectionSet::from(found)
        });

        let connections = match set {
            ConnectionSet::Empty => {
                error!(operation = OPERATION, "No connections found");
                return Err(EnvError::NoConnectionsFound);
            }
            ConnectionSet::Found(connections) => connections,
        };

        match connections.iter().find(|c| c.kind == kind) {
            Some(connection) => Ok(connection.clone()),
            None => {
                error!(operation = OPERATION, "Network type '{kind}' not found");
                Err(EnvError::ConnectionTypeNotFound(kind))
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn connection(name: &str, kind: ConnectionType) -> Connection {
        Connection {
            name: name.to_string(),
            kind,
            transmit_rate: 1_000_000_000,
            receive_rate: 1_000_000_000,
            ssid: None,
            signal: None,
        }
    }

    #[test]
    fn discovery_runs_once_across_types() {
        let cache = ConnectionCache::new();
        let runs = Cell::new(0);
        let discover = || {
            runs.set(runs.get() + 1);
            vec![
                connection("eth0", ConnectionType::Ethernet),
                connection("wlan0", ConnectionType::Wifi),
            ]
        };

        assert!(!cache.is_populated());
        let eth = cache.get(ConnectionType::Ethernet, discover).expect("ethernet");
        assert_eq!(eth.name, "eth0");
        let wifi = cache.get(ConnectionType::Wifi, discover).expect("wifi");
        assert_eq!(wifi.name, "wlan0");
        assert_eq!(runs.get(), 1);
        assert!(cache.is_populated());
    }

    #[test]
    fn empty_discovery_is_memoized_as_failure() {
        let cache = ConnectionCache::new();
        let runs = Cell::new(0);
        let discover = || {
            runs.set(runs.get() + 1);
            Vec::new()
        };

        for _ in 0..3 {
            assert_eq!(
                cache.get(ConnectionType::Wifi, discover),
                Err(EnvError::NoConnectionsFound)
            );
        }
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn missing_type_is_a_distinct_error() {
        let cache = ConnectionCache::new();
        let err = cache
            .get(ConnectionType::Cellular, || {
                vec![connection("eth0", ConnectionType::Ethernet)]
            })
            .unwrap_err();
        assert_eq!(err, EnvError::ConnectionTypeNotFound(ConnectionType::Cellular));
    }

    #[test]
    fn concurrent_callers_share_one_discovery() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::thread;
        use std::time::Duration;

        let cache = ConnectionCache::new();
        let runs = AtomicUsize::new(0);

        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    let eth = cache
                        .get(ConnectionType::Ethernet, || {
                            runs.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(50));
                            vec![connection("eth0", ConnectionType::Ethernet)]
                        })
                        .expect("ethernet");
                    assert_eq!(eth.name, "eth0");
                });
            }
        });

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(cache.is_populated());
    }

    #[test]
    fn first_match_wins() {
        let cache = ConnectionCache::new();
        let eth = cache
            .get(ConnectionType::Ethernet, || {
                vec![
                    connection("wlan0", ConnectionType::Wifi),
                    connection("eth0", ConnectionType::Ethernet),
                    connection("eth1", ConnectionType::Ethernet),
                ]
            })
            .expect("ethernet");
        assert_eq!(eth.name, "eth0");
    }
}
