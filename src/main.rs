// ── promptenv snapshot ────────────────────────────────────────────────────────
//
// Prints every host fact as one JSON document on stdout.  Logs go to stderr;
// the filter comes from `PROMPTENV_LOG`, else the `debug` flag.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing_subscriber::EnvFilter;

use promptenv::{config, Connection, ConnectionType, Environment, PlatformKind};

const LOG_ENV: &str = "PROMPTENV_LOG";

#[derive(Serialize)]
struct Snapshot {
    platform: PlatformKind,
    elevated: bool,
    home: String,
    cache_dir: String,
    terminal_width: Option<u16>,
    wsl: bool,
    wsl2: bool,
    connections: BTreeMap<&'static str, Option<Connection>>,
}

fn init_tracing(debug: bool) {
    let fallback = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let flags = config::from_env();
    init_tracing(flags.debug);

    let env = Environment::new(flags);
    let snapshot = Snapshot {
        platform: env.platform(),
        elevated: env.is_elevated(),
        home: env.home_dir(),
        cache_dir: env.cache_dir(),
        terminal_width: env.terminal_width().ok(),
        wsl: env.is_wsl(),
        wsl2: env.is_wsl2(),
        connections: ConnectionType::ALL
            .into_iter()
            .map(|kind| (kind.as_str(), env.connection(kind).ok()))
            .collect(),
    };

    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("promptenv: failed to serialise snapshot: {e}");
            std::process::exit(1);
        }
    }
}
