//! Store configuration.

/// Default write buffer capacity (64 KiB).
pub const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;

/// Configuration for constructing or opening a store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Bytes the write buffer holds before spilling to the file.
    ///
    /// A record larger than this is written straight through.
    pub buffer_capacity: usize,

    /// Whether to sync the file after every flush (safer but slower).
    pub sync_on_flush: bool,

    /// Whether to sync the file when the store is closed.
    pub sync_on_close: bool,

    /// Whether `Store::open` takes an exclusive lock on the file.
    pub lock_file: bool,

    /// Whether `Store::open` creates missing parent directories.
    pub create_dirs: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            sync_on_flush: false,
            sync_on_close: true,
            lock_file: true,
            create_dirs: false,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the write buffer capacity.
    #[must_use]
    pub const fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Sets whether to sync after every flush.
    #[must_use]
    pub const fn sync_on_flush(mut self, value: bool) -> Self {
        self.sync_on_flush = value;
        self
    }

    /// Sets whether to sync on close.
    #[must_use]
    pub const fn sync_on_close(mut self, value: bool) -> Self {
        self.sync_on_close = value;
        self
    }

    /// Sets whether to lock the file when opening by path.
    #[must_use]
    pub const fn lock_file(mut self, value: bool) -> Self {
        self.lock_file = value;
        self
    }

    /// Sets whether to create parent directories when opening by path.
    #[must_use]
    pub const fn create_dirs(mut self, value: bool) -> Self {
        self.create_dirs = value;
        self
    }
}
