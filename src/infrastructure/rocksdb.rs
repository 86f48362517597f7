use super::{Record, RecordStore};
use crate::error::{LedgerError, Result};
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family holding the session records.
pub const CF_SESSION: &str = "session";

/// A persistent store implementation using RocksDB.
///
/// All three records live in the `session` column family under their record key.
/// Single puts are atomic in RocksDB, which is all a record write needs.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbRepository {
    db: Arc<DB>,
}

impl RocksDbRepository {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the `session` column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_session = ColumnFamilyDescriptor::new(CF_SESSION, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_session])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn session_cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(CF_SESSION).ok_or_else(|| {
            LedgerError::Storage(Box::new(std::io::Error::other(
                "Session column family not found",
            )))
        })
    }
}

impl RecordStore for RocksDbRepository {
    fn read(&self, record: Record) -> Result<Option<Vec<u8>>> {
        let cf = self.session_cf()?;
        Ok(self.db.get_cf(&cf, record.key())?)
    }

    fn write(&self, record: Record, bytes: &[u8]) -> Result<()> {
        let cf = self.session_cf()?;
        self.db.put_cf(&cf, record.key(), bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::player::{Balance, Player, PlayerBook};
    use crate::domain::ports::SessionRepository;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDbRepository::open(dir.path()).expect("Failed to open RocksDB");
        assert!(store.db.cf_handle(CF_SESSION).is_some());
    }

    #[tokio::test]
    async fn test_rocksdb_session_round_trip() {
        let dir = tempdir().unwrap();
        let players: PlayerBook = vec![Player::with_balance("Ana", Balance(dec!(100.0)))]
            .into_iter()
            .collect();

        {
            let store = RocksDbRepository::open(dir.path()).unwrap();
            store.save_players(&players).await.unwrap();
            store.save_sound(false).await.unwrap();
        }

        let store = RocksDbRepository::open(dir.path()).unwrap();
        assert_eq!(store.load_players().await.unwrap(), Some(players));
        assert_eq!(store.load_sound().await.unwrap(), Some(false));
        assert!(store.load_history().await.unwrap().is_none());
    }
}
