//! The file seam beneath a store.

use std::fs::File;
use std::io;

/// A byte file that a [`Store`](crate::Store) frames records into.
///
/// Implementations are **opaque byte files**. They know nothing about
/// length prefixes or records; the store owns all framing.
///
/// All operations take `&self` and address the file by absolute offset,
/// so one handle can serve concurrent readers while a writer appends.
///
/// # Invariants
///
/// - `len` reports every byte successfully written with `write_all_at`
/// - `read_exact_at` returns exactly the bytes previously written at that offset
/// - Implementations must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`std::fs::File`] - For persistent storage
/// - [`super::MemoryFile`] - For testing
#[allow(clippy::len_without_is_empty)]
pub trait StoreFile: Send + Sync + std::fmt::Debug {
    /// Returns the current length of the file in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be stat'ed.
    fn len(&self) -> io::Result<u64>;

    /// Fills `buf` with the bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedEof` if the file ends before `buf` is full, or
    /// any other I/O error from the device.
    fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> io::Result<()>;

    /// Writes all of `buf` starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails. Part of `buf` may have reached
    /// the file; callers cut it off again with [`set_len`](Self::set_len).
    fn write_all_at(&self, buf: &[u8], offset: u64) -> io::Result<()>;

    /// Truncates or extends the file to exactly `len` bytes.
    ///
    /// Used to cut off the bytes of a write that failed partway.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be resized.
    fn set_len(&self, len: u64) -> io::Result<()>;

    /// Syncs data and metadata to durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    fn sync(&self) -> io::Result<()>;
}

impl StoreFile for File {
    fn len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    #[cfg(unix)]
    fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> io::Result<()> {
        std::os::unix::fs::FileExt::read_exact_at(self, buf, offset)
    }

    #[cfg(windows)]
    fn read_exact_at(&self, mut buf: &mut [u8], mut offset: u64) -> io::Result<()> {
        use std::os::windows::fs::FileExt;

        while !buf.is_empty() {
            match self.seek_read(buf, offset) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "failed to fill whole buffer",
                    ))
                }
                Ok(n) => {
                    let rest = buf;
                    buf = &mut rest[n..];
                    offset += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    #[cfg(unix)]
    fn write_all_at(&self, buf: &[u8], offset: u64) -> io::Result<()> {
        std::os::unix::fs::FileExt::write_all_at(self, buf, offset)
    }

    #[cfg(windows)]
    fn write_all_at(&self, mut buf: &[u8], mut offset: u64) -> io::Result<()> {
        use std::os::windows::fs::FileExt;

        while !buf.is_empty() {
            match self.seek_write(buf, offset) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "failed to write whole buffer",
                    ))
                }
                Ok(n) => {
                    buf = &buf[n..];
                    offset += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn set_len(&self, len: u64) -> io::Result<()> {
        File::set_len(self, len)
    }

    fn sync(&self) -> io::Result<()> {
        self.sync_all()
    }
}
