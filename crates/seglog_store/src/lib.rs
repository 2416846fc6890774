//! # SegLog Store
//!
//! The lowest-level storage primitive of a segmented, append-only log.
//!
//! A [`Store`] persists opaque binary records to a single file. Each record
//! is framed with an 8-byte big-endian length prefix and addressed by its
//! position, the byte offset where that prefix begins. Segments, indexes,
//! compaction and replication live above this crate and call into it.
//!
//! ## On-Disk Format
//!
//! ```text
//! | length n (8, big-endian) | payload (n) | length | payload | ...
//! ```
//!
//! No header, trailer, magic number or checksum.
//!
//! ## Design Principles
//!
//! - Records are opaque byte sequences; the store never interprets them
//! - Appends are buffered in memory, reads always see what was appended
//! - `size` is owned by the store and only changes under its lock
//! - Must be `Send + Sync` so one store can be shared by many threads
//!
//! ## Example
//!
//! ```rust
//! use seglog_store::{MemoryFile, Store};
//!
//! let store = Store::new(MemoryFile::new()).unwrap();
//! let appended = store.append(b"hello world").unwrap();
//! let data = store.read(appended.position).unwrap();
//! assert_eq!(&data, b"hello world");
//! store.close().unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod buffer;
mod config;
mod error;
mod file;
mod memory;
mod record;
mod scan;
mod store;

pub use config::{StoreConfig, DEFAULT_BUFFER_CAPACITY};
pub use error::{StoreError, StoreResult};
pub use file::StoreFile;
pub use memory::MemoryFile;
pub use record::{decode_len, encode_len, framed_len, Appended, Record, LEN_WIDTH};
pub use scan::{Records, ScanReport};
pub use store::Store;
