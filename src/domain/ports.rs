use super::player::PlayerBook;
use super::transaction::Transaction;
use crate::error::Result;
use async_trait::async_trait;

/// Key-value persistence for a session.
///
/// Each record is independent: `Ok(None)` means it was never written, an `Err`
/// means it exists but could not be read or decoded.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn load_players(&self) -> Result<Option<PlayerBook>>;
    async fn load_history(&self) -> Result<Option<Vec<Transaction>>>;
    async fn load_sound(&self) -> Result<Option<bool>>;

    async fn save_players(&self, players: &PlayerBook) -> Result<()>;
    async fn save_history(&self, history: &[Transaction]) -> Result<()>;
    async fn save_sound(&self, enabled: bool) -> Result<()>;
}

pub type SessionRepositoryBox = Box<dyn SessionRepository>;
