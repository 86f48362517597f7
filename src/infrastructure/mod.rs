//! Adapters for [`SessionRepository`](crate::domain::ports::SessionRepository).
//!
//! Every backend stores the same three JSON records under the same keys; they only
//! differ in where the bytes go. Backends implement [`RecordStore`] and get the
//! repository for free.

pub mod in_memory;
pub mod json_file;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;

use crate::domain::player::PlayerBook;
use crate::domain::ports::SessionRepository;
use crate::domain::transaction::Transaction;
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// The persisted records of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Record {
    Players,
    History,
    Sound,
}

impl Record {
    pub const ALL: [Record; 3] = [Record::Players, Record::History, Record::Sound];

    pub fn key(self) -> &'static str {
        match self {
            Record::Players => "players",
            Record::History => "history",
            Record::Sound => "sound",
        }
    }
}

/// Raw byte storage keyed by [`Record`]. Writes must replace a record atomically.
pub trait RecordStore: Send + Sync {
    fn read(&self, record: Record) -> Result<Option<Vec<u8>>>;
    fn write(&self, record: Record, bytes: &[u8]) -> Result<()>;
}

fn decode<T: DeserializeOwned>(bytes: Option<Vec<u8>>) -> Result<Option<T>> {
    match bytes {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

#[async_trait]
impl<S: RecordStore> SessionRepository for S {
    async fn load_players(&self) -> Result<Option<PlayerBook>> {
        decode(self.read(Record::Players)?)
    }

    async fn load_history(&self) -> Result<Option<Vec<Transaction>>> {
        decode(self.read(Record::History)?)
    }

    async fn load_sound(&self) -> Result<Option<bool>> {
        decode(self.read(Record::Sound)?)
    }

    async fn save_players(&self, players: &PlayerBook) -> Result<()> {
        self.write(Record::Players, &encode(players)?)
    }

    async fn save_history(&self, history: &[Transaction]) -> Result<()> {
        self.write(Record::History, &encode(history)?)
    }

    async fn save_sound(&self, enabled: bool) -> Result<()> {
        self.write(Record::Sound, &encode(&enabled)?)
    }
}
