//! Dump command implementation.

use super::{open_existing, Format, RecordInfo};
use seglog_store::Store;
use std::path::Path;

/// Lists records starting at `start_offset`.
pub fn run(
    path: &Path,
    limit: Option<usize>,
    start_offset: u64,
    format: Format,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_existing(path)?;
    let records = collect_records(&store, start_offset, limit)?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        Format::Text => print_text_output(&records),
    }

    store.close()?;
    Ok(())
}

fn collect_records(
    store: &Store,
    start_offset: u64,
    limit: Option<usize>,
) -> Result<Vec<RecordInfo>, Box<dyn std::error::Error>> {
    store
        .records_from(start_offset)
        .take(limit.unwrap_or(usize::MAX))
        .map(|result| -> Result<RecordInfo, Box<dyn std::error::Error>> {
            let record = result?;
            Ok(RecordInfo::new(record.position, &record.payload))
        })
        .collect()
}

fn print_text_output(records: &[RecordInfo]) {
    println!("Records ({} total)", records.len());
    println!("================");
    println!();

    for record in records {
        let shown = record.text.as_deref().unwrap_or(&record.hex);
        println!("[{:>10}] {:>8} bytes  {}", record.position, record.len, shown);
    }
}
