//! Append command implementation.

use seglog_store::{Store, StoreConfig};
use std::io::BufRead;
use std::path::Path;
use tracing::info;

/// Appends each payload, or each line of stdin when none are given.
pub fn run(path: &Path, payloads: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open(path, StoreConfig::new().create_dirs(true))?;
    info!("Appending to {:?} at offset {}", path, store.size());

    if payloads.is_empty() {
        for line in std::io::stdin().lock().lines() {
            append_one(&store, line?.as_bytes())?;
        }
    } else {
        for payload in payloads {
            append_one(&store, payload.as_bytes())?;
        }
    }

    let size = store.size();
    store.close()?;
    info!("Store size is now {} bytes", size);
    Ok(())
}

fn append_one(store: &Store, payload: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
    let appended = store.append(payload)?;
    println!("{} {}", appended.position, appended.written);
    Ok(())
}
