//! The record store.

use crate::buffer::WriteBuffer;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::file::StoreFile;
use crate::record::{decode_len, framed_len, Appended, LEN_WIDTH};
use crate::scan::{Records, ScanReport};
use parking_lot::{Mutex, RwLock};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// An append-only store of length-prefixed records over a single file.
///
/// Each record is written as an 8-byte big-endian length followed by its
/// payload. [`append`](Self::append) returns the record's position, the
/// byte offset of its length prefix, and [`read`](Self::read) takes that
/// position back.
///
/// # Write Path
///
/// Appends go into an in-memory write buffer first. The buffer is spilled
/// to the file when it fills up, on [`flush`](Self::flush), on
/// [`close`](Self::close), and whenever a read needs bytes that are still
/// buffered. A record is therefore readable as soon as `append` returns.
///
/// # Thread Safety
///
/// A store is shared by reference across threads. Appends, flushes and
/// close are serialized by one lock. Reads of flushed bytes only share
/// the file handle, so they run concurrently with each other and with an
/// append that is filling the buffer.
///
/// # Example
///
/// ```rust
/// use seglog_store::{MemoryFile, Store};
///
/// let store = Store::new(MemoryFile::new()).unwrap();
/// let appended = store.append(&[0x01, 0x02, 0x03]).unwrap();
/// assert_eq!((appended.written, appended.position), (11, 0));
/// assert_eq!(store.read(0).unwrap(), vec![0x01, 0x02, 0x03]);
/// assert_eq!(store.size(), 11);
/// store.close().unwrap();
/// ```
pub struct Store {
    path: Option<PathBuf>,
    config: StoreConfig,
    /// `None` once the store is closed.
    file: RwLock<Option<Box<dyn StoreFile>>>,
    writer: Mutex<WriteBuffer>,
    /// Mirror of `writer.flushed()` for lock-free read checks.
    flushed: AtomicU64,
}

impl Store {
    /// Creates a store over an open file with the default configuration.
    ///
    /// The store's size starts at the file's current length, so appends
    /// continue after any records already present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file's length cannot be determined.
    pub fn new(file: impl StoreFile + 'static) -> StoreResult<Self> {
        Self::with_config(file, StoreConfig::default())
    }

    /// Creates a store over an open file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file's length cannot be determined.
    pub fn with_config(file: impl StoreFile + 'static, config: StoreConfig) -> StoreResult<Self> {
        Self::build(Box::new(file), None, config)
    }

    /// Opens or creates the store file at `path`.
    ///
    /// An existing file is never truncated. With `lock_file` set, an
    /// exclusive advisory lock is held on the file until the store is
    /// closed or dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Locked`] if another handle holds the lock, or
    /// an I/O error if the file cannot be opened or stat'ed.
    pub fn open(path: &Path, config: StoreConfig) -> StoreResult<Self> {
        if config.create_dirs {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        if config.lock_file {
            lock_exclusive(&file)?;
        }

        Self::build(Box::new(file), Some(path.to_path_buf()), config)
    }

    fn build(
        file: Box<dyn StoreFile>,
        path: Option<PathBuf>,
        config: StoreConfig,
    ) -> StoreResult<Self> {
        let size = file.len()?;
        debug!(?path, size, "opened store");

        Ok(Self {
            path,
            writer: Mutex::new(WriteBuffer::new(config.buffer_capacity, size)),
            flushed: AtomicU64::new(size),
            file: RwLock::new(Some(file)),
            config,
        })
    }

    /// Returns the path of the store file, if it was opened by path.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the configuration this store was built with.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Appends a record.
    ///
    /// Returns the bytes written (payload plus the 8-byte prefix) and the
    /// position of the record. Concurrent appends are serialized and each
    /// gets its own non-overlapping position.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if spilling to the file fails. The store's size
    /// is left unchanged and the same payload can be appended again.
    /// Returns [`StoreError::Closed`] after [`close`](Self::close).
    pub fn append(&self, payload: &[u8]) -> StoreResult<Appended> {
        let mut writer = self.writer.lock();
        let guard = self.file.read();
        let file = guard.as_deref().ok_or(StoreError::Closed)?;

        let position = writer.size();
        let written = writer.append(file, payload)?;
        self.flushed.store(writer.flushed(), Ordering::Release);

        Ok(Appended { written, position })
    }

    /// Reads the record whose length prefix starts at `position`.
    ///
    /// Buffered records are flushed first if needed, so a record is
    /// readable immediately after its append returns.
    ///
    /// # Errors
    ///
    /// - [`StoreError::ReadPastEnd`] if `position` or the record's extent
    ///   lies beyond the end of the store
    /// - [`StoreError::CorruptRecord`] if the length prefix is impossible
    /// - [`StoreError::Closed`] after [`close`](Self::close)
    /// - an I/O error if the device read fails
    pub fn read(&self, position: u64) -> StoreResult<Vec<u8>> {
        let mut prefix = [0u8; LEN_WIDTH as usize];
        self.make_visible(position, LEN_WIDTH, true)?;
        self.read_exact(&mut prefix, position)?;

        let len = decode_len(prefix);
        let framed = position
            .checked_add(LEN_WIDTH)
            .and_then(|start| start.checked_add(len))
            .map(|_| framed_len(len))
            .ok_or_else(|| {
                StoreError::corrupt_record(position, format!("length {len} overflows the file"))
            })?;
        let len_usize = usize::try_from(len).map_err(|_| {
            StoreError::corrupt_record(position, format!("length {len} exceeds address space"))
        })?;

        self.make_visible(position, framed, true)?;

        let mut payload = vec![0u8; len_usize];
        self.read_exact(&mut payload, position + LEN_WIDTH)?;
        Ok(payload)
    }

    /// Reads raw bytes starting at `offset` into `buf`.
    ///
    /// Returns the number of bytes read, which is less than `buf.len()`
    /// only when the store ends first. Reading at exactly the end of the
    /// store returns `0`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ReadPastEnd`] if `offset` is beyond the end of
    /// the store, [`StoreError::Closed`] after close, or an I/O error.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> StoreResult<usize> {
        let available = self.make_visible(offset, buf.len() as u64, false)?;
        // available <= buf.len(), so this cannot truncate
        let n = available as usize;
        self.read_exact(&mut buf[..n], offset)?;
        Ok(n)
    }

    /// Writes buffered records to the file.
    ///
    /// With `sync_on_flush` set, the file is also synced.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the write fails, or
    /// [`StoreError::Closed`] after close.
    pub fn flush(&self) -> StoreResult<()> {
        let mut writer = self.writer.lock();
        let guard = self.file.read();
        let file = guard.as_deref().ok_or(StoreError::Closed)?;

        self.spill(&mut writer, file)?;
        if self.config.sync_on_flush {
            file.sync()?;
        }
        Ok(())
    }

    /// Flushes buffered records and syncs the file to durable storage.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the write or sync fails, or
    /// [`StoreError::Closed`] after close.
    pub fn sync(&self) -> StoreResult<()> {
        let mut writer = self.writer.lock();
        let guard = self.file.read();
        let file = guard.as_deref().ok_or(StoreError::Closed)?;

        self.spill(&mut writer, file)?;
        file.sync()?;
        Ok(())
    }

    /// Flushes buffered records and releases the file.
    ///
    /// Any bytes past the store's size are cut off, so the file length
    /// matches [`size`](Self::size) afterwards. If flushing fails the store
    /// stays open and `close` may be retried.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the final flush or sync fails, or
    /// [`StoreError::Closed`] if the store is already closed.
    pub fn close(&self) -> StoreResult<()> {
        let mut writer = self.writer.lock();
        let mut guard = self.file.write();
        let file = guard.as_deref().ok_or(StoreError::Closed)?;

        self.spill(&mut writer, file)?;
        let size = writer.size();
        let len = file.len()?;
        if len > size {
            warn!(path = ?self.path, len, size, "cutting bytes past the end on close");
            file.set_len(size)?;
        }
        if self.config.sync_on_close {
            file.sync()?;
        }

        *guard = None;
        debug!(path = ?self.path, size = writer.size(), "closed store");
        Ok(())
    }

    /// Returns `true` once [`close`](Self::close) has succeeded.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.file.read().is_none()
    }

    /// Returns the logical size of the store in bytes.
    ///
    /// This is the position the next append will get.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.writer.lock().size()
    }

    /// Returns the number of bytes already written to the file.
    #[must_use]
    pub fn flushed_len(&self) -> u64 {
        self.flushed.load(Ordering::Acquire)
    }

    /// Returns an iterator over every record, starting at offset 0.
    ///
    /// The iterator stops at the size the store had when it was created.
    #[must_use]
    pub fn records(&self) -> Records<'_> {
        self.records_from(0)
    }

    /// Returns an iterator over the records starting at `position`.
    ///
    /// `position` must be the start of a record.
    #[must_use]
    pub fn records_from(&self, position: u64) -> Records<'_> {
        Records::new(self, position, self.size())
    }

    /// Walks every record and reports how much of the file is well framed.
    ///
    /// A truncated or impossible record at the tail is reported, not
    /// returned as an error.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the device fails, or
    /// [`StoreError::Closed`] after close.
    pub fn verify(&self) -> StoreResult<ScanReport> {
        let size = self.size();
        let mut report = ScanReport::default();

        for result in Records::new(self, 0, size) {
            match result {
                Ok(record) => {
                    report.records += 1;
                    report.valid_len = record.end();
                }
                Err(e) if e.is_corrupt_or_missing() => {
                    report.torn_tail = size - report.valid_len;
                    warn!(
                        path = ?self.path,
                        valid_len = report.valid_len,
                        torn_tail = report.torn_tail,
                        error = %e,
                        "store has a damaged tail"
                    );
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }

    /// Ensures the range `offset..offset + len` is readable from the file.
    ///
    /// Returns how many bytes of the range exist. With `exact` set, a
    /// range extending past the end is an error instead.
    fn make_visible(&self, offset: u64, len: u64, exact: bool) -> StoreResult<u64> {
        let end = offset.saturating_add(len);
        if end <= self.flushed.load(Ordering::Acquire) {
            return Ok(len);
        }

        let mut writer = self.writer.lock();
        let guard = self.file.read();
        let file = guard.as_deref().ok_or(StoreError::Closed)?;

        let size = writer.size();
        if offset > size || (exact && end > size) {
            return Err(StoreError::ReadPastEnd { offset, len, size });
        }

        let available = len.min(size - offset);
        if offset + available > writer.flushed() {
            self.spill(&mut writer, file)?;
        }
        Ok(available)
    }

    fn read_exact(&self, buf: &mut [u8], offset: u64) -> StoreResult<()> {
        let len = buf.len() as u64;
        let guard = self.file.read();
        let file = guard.as_deref().ok_or(StoreError::Closed)?;

        file.read_exact_at(buf, offset).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                StoreError::ReadPastEnd {
                    offset,
                    len,
                    size: self.flushed.load(Ordering::Acquire),
                }
            } else {
                StoreError::Io(e)
            }
        })
    }

    fn spill(&self, writer: &mut WriteBuffer, file: &dyn StoreFile) -> StoreResult<()> {
        if writer.is_empty() {
            return Ok(());
        }

        writer.flush(file)?;
        self.flushed.store(writer.flushed(), Ordering::Release);
        debug!(flushed = writer.flushed(), "flushed store buffer");
        Ok(())
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        let writer = self.writer.get_mut();
        if let Some(file) = self.file.get_mut().as_deref() {
            if let Err(e) = writer.flush(file) {
                warn!(path = ?self.path, error = %e, "failed to flush store on drop");
            }
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("path", &self.path)
            .field("size", &self.size())
            .field("flushed", &self.flushed_len())
            .finish_non_exhaustive()
    }
}

fn lock_exclusive(file: &File) -> StoreResult<()> {
    use fs2::FileExt;

    file.try_lock_exclusive().map_err(|e| {
        if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() {
            StoreError::Locked
        } else {
            StoreError::Io(e)
        }
    })
}
