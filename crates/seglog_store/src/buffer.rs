//! The write buffer sitting in front of a store file.

use crate::file::StoreFile;
use crate::record::{encode_len, framed_len};
use std::io;

/// Accumulates framed records in memory and spills them to the file.
///
/// The buffer always covers the file range `flushed..flushed + len`, so
/// `flushed + len` is the logical size of the store.
///
/// Every operation either commits completely or leaves the buffer as it
/// was. A failed write cuts the file back to `flushed`, so no partial
/// bytes outlive the error.
#[derive(Debug)]
pub(crate) struct WriteBuffer {
    buf: Vec<u8>,
    capacity: usize,
    flushed: u64,
}

impl WriteBuffer {
    /// Creates an empty buffer whose first byte lands at file offset `flushed`.
    pub(crate) fn new(capacity: usize, flushed: u64) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
            flushed,
        }
    }

    /// Bytes already written to the file.
    pub(crate) fn flushed(&self) -> u64 {
        self.flushed
    }

    /// Logical size: flushed bytes plus buffered bytes.
    pub(crate) fn size(&self) -> u64 {
        self.flushed + self.buf.len() as u64
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes all buffered bytes to `file`.
    pub(crate) fn flush(&mut self, file: &dyn StoreFile) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }

        file.write_all_at(&self.buf, self.flushed).map_err(|e| self.cut_torn_tail(file, e))?;
        self.flushed += self.buf.len() as u64;
        self.buf.clear();
        Ok(())
    }

    /// Frames `payload` and appends it.
    ///
    /// Spills the buffer first if the record would overflow it. Records
    /// that are larger than the whole buffer go straight to the file.
    ///
    /// Returns the number of bytes the record occupies.
    pub(crate) fn append(&mut self, file: &dyn StoreFile, payload: &[u8]) -> io::Result<u64> {
        let len = payload.len() as u64;
        let framed = framed_len(len);
        let prefix = encode_len(len);

        if self.buf.len() as u64 + framed > self.capacity as u64 {
            self.flush(file)?;
        }

        if framed > self.capacity as u64 {
            file.write_all_at(&prefix, self.flushed)
                .and_then(|()| file.write_all_at(payload, self.flushed + prefix.len() as u64))
                .map_err(|e| self.cut_torn_tail(file, e))?;
            self.flushed += framed;
        } else {
            self.buf.extend_from_slice(&prefix);
            self.buf.extend_from_slice(payload);
        }

        Ok(framed)
    }

    /// Truncates `file` back to the flushed offset after a failed write.
    ///
    /// Returns the error to report: `err` itself, or `err` with the
    /// truncation failure appended when the file could not be cut.
    fn cut_torn_tail(&self, file: &dyn StoreFile, err: io::Error) -> io::Error {
        match file.set_len(self.flushed) {
            Ok(()) => err,
            Err(trunc) => io::Error::new(
                err.kind(),
                format!("{err}; truncating to {} also failed: {trunc}", self.flushed),
            ),
        }
    }
}
