use super::{Record, RecordStore};
use crate::error::Result;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Keeps each record in its own JSON file inside a data directory.
///
/// Writes go to a temporary file in the same directory which is then renamed over
/// the target, so a crash mid-write leaves the previous version intact.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    dir: PathBuf,
}

impl JsonFileRepository {
    /// Opens (creating if needed) the data directory at `dir`.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, record: Record) -> PathBuf {
        self.dir.join(format!("{}.json", record.key()))
    }
}

impl RecordStore for JsonFileRepository {
    fn read(&self, record: Record) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path(record)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, record: Record, bytes: &[u8]) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path(record)).map_err(|e| e.error)?;
        Ok(())
    }
}
