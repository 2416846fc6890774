//! Error types for store operations.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred on the underlying file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Attempted to read beyond the end of the store.
    ///
    /// Raised for positions past the end and for records whose length
    /// prefix points beyond the bytes actually present.
    #[error("read beyond end of store: offset {offset}, len {len}, size {size}")]
    ReadPastEnd {
        /// The requested read offset.
        offset: u64,
        /// The requested read length.
        len: u64,
        /// The store size at the time of the read.
        size: u64,
    },

    /// A length prefix cannot describe a valid record.
    #[error("corrupt record at position {position}: {message}")]
    CorruptRecord {
        /// Position of the record's length prefix.
        position: u64,
        /// Description of the corruption.
        message: String,
    },

    /// The store has been closed.
    #[error("store is closed")]
    Closed,

    /// Another handle holds the exclusive lock on the store file.
    #[error("store file is locked by another process")]
    Locked,
}

impl StoreError {
    /// Creates a corrupt record error.
    pub fn corrupt_record(position: u64, message: impl Into<String>) -> Self {
        Self::CorruptRecord {
            position,
            message: message.into(),
        }
    }

    /// Returns `true` if the error means the requested record is missing
    /// or damaged, as opposed to a device failure or a closed store.
    ///
    /// Callers use this to choose between repairing the file and aborting.
    #[must_use]
    pub fn is_corrupt_or_missing(&self) -> bool {
        matches!(self, Self::ReadPastEnd { .. } | Self::CorruptRecord { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_or_missing_classification() {
        let past_end = StoreError::ReadPastEnd {
            offset: 10,
            len: 8,
            size: 4,
        };
        assert!(past_end.is_corrupt_or_missing());
        assert!(StoreError::corrupt_record(0, "bad prefix").is_corrupt_or_missing());

        let io = StoreError::Io(io::Error::new(io::ErrorKind::Other, "device"));
        assert!(!io.is_corrupt_or_missing());
        assert!(!StoreError::Closed.is_corrupt_or_missing());
    }

    #[test]
    fn display_messages() {
        assert_eq!(StoreError::Closed.to_string(), "store is closed");
        assert_eq!(
            StoreError::corrupt_record(16, "length overflows").to_string(),
            "corrupt record at position 16: length overflows"
        );
    }
}
