//! Read command implementation.

use super::{open_existing, Format, RecordInfo};
use std::path::Path;

/// Prints the record at `position`.
pub fn run(path: &Path, position: u64, format: Format) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_existing(path)?;
    let payload = store.read(position)?;
    let info = RecordInfo::new(position, &payload);

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&info)?),
        Format::Text => match &info.text {
            Some(text) => println!("{text}"),
            None => println!("{}", info.hex),
        },
    }

    store.close()?;
    Ok(())
}
