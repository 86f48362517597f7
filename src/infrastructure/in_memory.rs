use super::{Record, RecordStore};
use crate::error::{LedgerError, Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A thread-safe in-memory record store.
///
/// Clones share the same records, so a test can keep a handle, drop the session
/// and load a fresh one from the same data.
#[derive(Default, Clone)]
pub struct InMemoryRepository {
    records: Arc<RwLock<HashMap<Record, Vec<u8>>>>,
}

impl InMemoryRepository {
    /// Creates a new, empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores raw bytes for a record, bypassing serialization.
    pub fn put_raw(&self, record: Record, bytes: impl Into<Vec<u8>>) -> Result<()> {
        self.write(record, &bytes.into())
    }

    /// Returns the raw bytes last written for a record.
    pub fn raw(&self, record: Record) -> Option<Vec<u8>> {
        self.read(record).ok().flatten()
    }
}

fn poisoned() -> LedgerError {
    LedgerError::Storage(Box::new(std::io::Error::other("record lock poisoned")))
}

impl RecordStore for InMemoryRepository {
    fn read(&self, record: Record) -> Result<Option<Vec<u8>>> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.get(&record).cloned())
    }

    fn write(&self, record: Record, bytes: &[u8]) -> Result<()> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        records.insert(record, bytes.to_vec());
        Ok(())
    }
}
