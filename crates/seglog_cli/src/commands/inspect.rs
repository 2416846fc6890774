//! Inspect command implementation.

use super::{open_existing, Format};
use serde::Serialize;
use std::path::Path;

/// Store inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Store file path.
    pub path: String,
    /// Size in bytes.
    pub size: u64,
    /// Number of complete records.
    pub record_count: u64,
    /// Bytes covered by complete records.
    pub valid_len: u64,
    /// Trailing bytes that do not form a record.
    pub torn_tail: u64,
    /// Average payload size of complete records.
    pub avg_payload: u64,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: Format) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_existing(path)?;
    let report = store.verify()?;

    let payload_bytes = report.valid_len - report.records * seglog_store::LEN_WIDTH;
    let result = InspectResult {
        path: path.display().to_string(),
        size: store.size(),
        record_count: report.records,
        valid_len: report.valid_len,
        torn_tail: report.torn_tail,
        avg_payload: payload_bytes.checked_div(report.records).unwrap_or(0),
    };
    store.close()?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        Format::Text => {
            println!("Store: {}", result.path);
            println!("  Size:        {} bytes", result.size);
            println!("  Records:     {}", result.record_count);
            println!("  Valid bytes: {}", result.valid_len);
            println!("  Torn tail:   {} bytes", result.torn_tail);
            println!("  Avg payload: {} bytes", result.avg_payload);
        }
    }

    Ok(())
}
