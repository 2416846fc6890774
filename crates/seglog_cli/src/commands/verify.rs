//! Verify command implementation.

use super::open_existing;
use std::path::Path;

/// Runs the verify command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying store at {:?}", path);
    println!();

    let store = open_existing(path)?;
    let report = store.verify()?;
    let size = store.size();
    store.close()?;

    println!("  Records checked: {}", report.records);
    println!("  Valid bytes:     {} of {}", report.valid_len, size);
    println!();

    if report.is_clean() {
        println!("✓ Store verification passed");
        Ok(())
    } else {
        println!(
            "✗ Store verification failed: {} trailing bytes after offset {}",
            report.torn_tail, report.valid_len
        );
        Err("Verification failed".into())
    }
}
