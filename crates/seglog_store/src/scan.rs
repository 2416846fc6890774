//! Sequential scanning of store records.
//!
//! Positions are normally kept by a higher layer's index. When that index
//! is gone, framing can still be recovered by walking the records from
//! offset 0, since each length prefix says where the next record starts.

use crate::error::StoreResult;
use crate::record::Record;
use crate::store::Store;

/// An iterator over the records of a store.
///
/// Yields `Ok(record)` for every complete record up to the end offset
/// captured at creation. A damaged record yields a single `Err` and ends
/// the iteration.
///
/// # Example
///
/// ```rust
/// use seglog_store::{MemoryFile, Store};
///
/// let store = Store::new(MemoryFile::new()).unwrap();
/// store.append(b"a").unwrap();
/// store.append(b"bc").unwrap();
///
/// let payloads: Vec<Vec<u8>> = store
///     .records()
///     .map(|r| r.map(|record| record.payload))
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(payloads, vec![b"a".to_vec(), b"bc".to_vec()]);
/// ```
#[derive(Debug)]
pub struct Records<'a> {
    store: &'a Store,
    position: u64,
    end: u64,
    finished: bool,
}

impl<'a> Records<'a> {
    pub(crate) fn new(store: &'a Store, position: u64, end: u64) -> Self {
        Self {
            store,
            position,
            end,
            finished: false,
        }
    }

    /// Returns the position of the next record to be read.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl Iterator for Records<'_> {
    type Item = StoreResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.position >= self.end {
            return None;
        }

        match self.store.read(self.position) {
            Ok(payload) => {
                let record = Record {
                    position: self.position,
                    payload,
                };
                self.position = record.end();
                Some(Ok(record))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Outcome of [`Store::verify`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Number of complete records.
    pub records: u64,
    /// Offset just past the last complete record.
    pub valid_len: u64,
    /// Bytes after `valid_len` that do not form a complete record.
    pub torn_tail: u64,
}

impl ScanReport {
    /// Returns `true` if every byte belongs to a complete record.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.torn_tail == 0
    }
}

#[cfg(test)]
mod tests {
    use crate::error::StoreError;
    use crate::memory::MemoryFile;
    use crate::store::Store;

    #[test]
    fn scan_empty_store() {
        let store = Store::new(MemoryFile::new()).unwrap();
        assert_eq!(store.records().count(), 0);
    }

    #[test]
    fn scan_yields_positions_in_order() {
        let store = Store::new(MemoryFile::new()).unwrap();
        let a = store.append(b"first").unwrap().position;
        let b = store.append(b"").unwrap().position;
        let c = store.append(b"third").unwrap().position;

        let records: Vec<_> = store.records().map(Result::unwrap).collect();
        let positions: Vec<u64> = records.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![a, b, c]);
        assert_eq!(records[2].payload, b"third");
    }

    #[test]
    fn scan_from_middle() {
        let store = Store::new(MemoryFile::new()).unwrap();
        store.append(b"skip").unwrap();
        let second = store.append(b"keep").unwrap().position;

        let mut iter = store.records_from(second);
        assert_eq!(iter.position(), second);
        assert_eq!(iter.next().unwrap().unwrap().payload, b"keep");
        assert!(iter.next().is_none());
    }

    #[test]
    fn scan_ignores_appends_after_creation() {
        let store = Store::new(MemoryFile::new()).unwrap();
        store.append(b"before").unwrap();

        let iter = store.records();
        store.append(b"after").unwrap();
        assert_eq!(iter.count(), 1);
    }

    #[test]
    fn scan_stops_after_torn_record() {
        let mut data = 2u64.to_be_bytes().to_vec();
        data.extend_from_slice(b"ok");
        data.extend_from_slice(&9u64.to_be_bytes());
        data.push(1);
        let store = Store::new(MemoryFile::with_data(data)).unwrap();

        let mut iter = store.records();
        assert_eq!(iter.next().unwrap().unwrap().payload, b"ok");
        assert!(matches!(
            iter.next(),
            Some(Err(StoreError::ReadPastEnd { offset: 10, .. }))
        ));
        assert!(iter.next().is_none());
    }
}
