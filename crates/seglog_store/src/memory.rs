//! In-memory store file for testing.

use crate::file::StoreFile;
use parking_lot::{Mutex, RwLock};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

/// An in-memory [`StoreFile`].
///
/// This file keeps all bytes in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral stores that don't need persistence
///
/// It can also be told to fail its operations, which lets tests drive
/// the store's error paths (a full disk, a dead device, an unstat-able
/// handle) without touching a real filesystem.
///
/// # Example
///
/// ```rust
/// use seglog_store::{MemoryFile, Store};
///
/// let store = Store::new(MemoryFile::new()).unwrap();
/// let appended = store.append(b"test data").unwrap();
/// assert_eq!(appended.position, 0);
/// assert_eq!(store.size(), 17);
/// ```
#[derive(Debug, Default)]
pub struct MemoryFile {
    data: RwLock<Vec<u8>>,
    fail_writes: AtomicBool,
    /// Writes still allowed before every later write fails.
    writes_left: Mutex<Option<usize>>,
    fail_reads: AtomicBool,
    fail_len: AtomicBool,
}

impl MemoryFile {
    /// Creates a new empty in-memory file.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory file with pre-existing contents.
    ///
    /// Useful for testing recovery scenarios.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: RwLock::new(data),
            ..Self::default()
        }
    }

    /// Returns a copy of all bytes in the file.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        self.data.read().clone()
    }

    /// Makes every subsequent write fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Lets the next `n` writes succeed and fails every write after them.
    ///
    /// A failed write still lands the first half of its bytes, the way a
    /// device that fills up mid-write would.
    pub fn fail_writes_after(&self, n: usize) {
        *self.writes_left.lock() = Some(n);
    }

    /// Makes every subsequent read fail (or succeed again).
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `len` call fail (or succeed again).
    pub fn fail_len(&self, fail: bool) {
        self.fail_len.store(fail, Ordering::SeqCst);
    }

    fn write_unchecked(&self, buf: &[u8], offset: u64) -> io::Result<()> {
        let mut data = self.data.write();
        let start = usize::try_from(offset)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "offset too large"))?;
        let end = start + buf.len();
        if end > data.len() {
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(buf);
        Ok(())
    }

    fn injected(kind: io::ErrorKind, op: &str) -> io::Error {
        io::Error::new(kind, format!("injected {op} failure"))
    }
}

impl StoreFile for MemoryFile {
    fn len(&self) -> io::Result<u64> {
        if self.fail_len.load(Ordering::SeqCst) {
            return Err(Self::injected(io::ErrorKind::PermissionDenied, "stat"));
        }
        Ok(self.data.read().len() as u64)
    }

    fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> io::Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::injected(io::ErrorKind::Other, "read"));
        }

        let data = self.data.read();
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        let end = start.saturating_add(buf.len());
        if end > data.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "failed to fill whole buffer",
            ));
        }

        buf.copy_from_slice(&data[start..end]);
        Ok(())
    }

    fn write_all_at(&self, buf: &[u8], offset: u64) -> io::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::injected(io::ErrorKind::Other, "write"));
        }
        let torn = match self.writes_left.lock().as_mut() {
            Some(0) => true,
            Some(left) => {
                *left -= 1;
                false
            }
            None => false,
        };
        if torn {
            self.write_unchecked(&buf[..buf.len() / 2], offset)?;
            return Err(Self::injected(io::ErrorKind::StorageFull, "write"));
        }

        self.write_unchecked(buf, offset)
    }

    fn set_len(&self, len: u64) -> io::Result<()> {
        let len = usize::try_from(len)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "length too large"))?;
        self.data.write().resize(len, 0);
        Ok(())
    }

    fn sync(&self) -> io::Result<()> {
        // Nothing to make durable
        Ok(())
    }
}
