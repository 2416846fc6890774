//! CLI command implementations.

pub mod append;
pub mod dump;
pub mod inspect;
pub mod read;
pub mod verify;

use seglog_store::{Store, StoreConfig};
use serde::Serialize;
use std::path::Path;

/// Output format shared by the listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// Human-readable text
    Text,
    /// Pretty-printed JSON
    Json,
}

/// A record as printed by `read` and `dump`.
#[derive(Debug, Serialize)]
pub struct RecordInfo {
    /// Position of the record's length prefix.
    pub position: u64,
    /// Payload length in bytes.
    pub len: usize,
    /// Payload as UTF-8 when it is valid text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Payload as lowercase hex.
    pub hex: String,
}

impl RecordInfo {
    /// Describes a payload read at `position`.
    pub fn new(position: u64, payload: &[u8]) -> Self {
        Self {
            position,
            len: payload.len(),
            text: std::str::from_utf8(payload).ok().map(str::to_owned),
            hex: hex_encode(payload),
        }
    }
}

/// Opens an existing store file, refusing to create a new one.
pub fn open_existing(path: &Path) -> Result<Store, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("store file not found: {}", path.display()).into());
    }
    Ok(Store::open(path, StoreConfig::default())?)
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
