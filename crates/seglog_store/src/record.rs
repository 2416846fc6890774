//! Record framing.
//!
//! Every record is stored as an 8-byte big-endian length followed by the
//! payload bytes:
//!
//! ```text
//! | length n (8, big-endian) | payload (n) |
//! ```
//!
//! Records are laid out contiguously from offset 0. There is no file
//! header, trailer, magic number, checksum or padding.

/// Width of the length prefix in bytes.
pub const LEN_WIDTH: u64 = 8;

/// A record read back from a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Offset of the record's length prefix.
    pub position: u64,
    /// The payload bytes.
    pub payload: Vec<u8>,
}

impl Record {
    /// Returns the number of bytes the record occupies on disk.
    #[must_use]
    pub fn framed_len(&self) -> u64 {
        framed_len(self.payload.len() as u64)
    }

    /// Returns the offset just past this record.
    #[must_use]
    pub fn end(&self) -> u64 {
        self.position + self.framed_len()
    }
}

/// Result of a successful append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appended {
    /// Bytes added to the store, prefix included.
    pub written: u64,
    /// Offset of the new record's length prefix.
    pub position: u64,
}

/// Encodes the length prefix for a payload of `len` bytes.
#[must_use]
pub fn encode_len(len: u64) -> [u8; LEN_WIDTH as usize] {
    len.to_be_bytes()
}

/// Decodes a length prefix.
#[must_use]
pub fn decode_len(prefix: [u8; LEN_WIDTH as usize]) -> u64 {
    u64::from_be_bytes(prefix)
}

/// Returns the on-disk size of a record with a `len`-byte payload.
#[must_use]
pub const fn framed_len(len: u64) -> u64 {
    LEN_WIDTH + len
}
