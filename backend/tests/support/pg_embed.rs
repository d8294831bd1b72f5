//! One embedded PostgreSQL cluster per suite.
//!
//! Without `PG_RUNTIME_DIR` and `PG_DATA_DIR`, `pg-embed-setup-unpriv` works
//! under `/var/tmp`. Missing variables are pointed at a fresh directory in
//! the cargo target dir while the cluster boots.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use pg_embedded_setup_unpriv::TestCluster;
use uuid::Uuid;

/// Boots download and unpack binaries; run them one at a time.
static BOOT: Mutex<()> = Mutex::new(());

/// Delays between attempts; the last failure is returned as-is.
const RETRY_DELAYS: [Duration; 3] = [
    Duration::from_millis(500),
    Duration::from_secs(1),
    Duration::from_secs(2),
];

fn looks_transient(failure: &str) -> bool {
    let failure = failure.to_ascii_lowercase();
    [
        "connection reset",
        "connection refused",
        "timed out",
        "temporarily unavailable",
        "dns error",
        "error decoding response body",
    ]
    .iter()
    .any(|needle| failure.contains(needle))
}

fn scratch_root() -> std::io::Result<PathBuf> {
    let target = env::var_os("CARGO_TARGET_DIR")
        .map_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../target"), PathBuf::from);
    let root = target
        .join("pg-embed")
        .join(format!("seed-ledger-{}", Uuid::new_v4()));
    for leaf in ["install", "data"] {
        fs::create_dir_all(root.join(leaf))?;
    }
    Ok(root)
}

/// Boot a cluster, retrying failures that look like network hiccups.
pub fn test_cluster() -> Result<TestCluster, String> {
    let _boot = BOOT.lock().unwrap_or_else(PoisonError::into_inner);

    let configured = ["PG_RUNTIME_DIR", "PG_DATA_DIR"]
        .iter()
        .all(|name| env::var_os(name).is_some());
    let _dirs = if configured {
        None
    } else {
        let root = scratch_root().map_err(|err| format!("scratch dirs: {err}"))?;
        let dir = |leaf: &str| Some(root.join(leaf).to_string_lossy().into_owned());
        Some(env_lock::lock_env([
            ("PG_RUNTIME_DIR", dir("install")),
            ("PG_DATA_DIR", dir("data")),
        ]))
    };

    let mut delays = RETRY_DELAYS.iter();
    loop {
        let failure = match TestCluster::new() {
            Ok(cluster) => return Ok(cluster),
            Err(err) => format!("{err:?}"),
        };
        match delays.next() {
            Some(delay) if looks_transient(&failure) => {
                eprintln!("pg-embed: transient boot failure, retrying in {delay:?}: {failure}");
                thread::sleep(*delay);
            }
            _ => return Err(failure),
        }
    }
}
