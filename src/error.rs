use thiserror::Error;

/// Everything that can go wrong while operating the bank.
///
/// The first group are operator mistakes: they are reported back to the caller
/// and never change the ledger. The rest come from the storage or export layers.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("player name must not be empty")]
    InvalidName,
    #[error("player '{0}' already exists")]
    DuplicateName(String),
    #[error("no player selected")]
    PlayerNotSelected,
    #[error("player '{0}' is not registered")]
    UnknownPlayer(String),
    #[error("invalid amount '{0}': expected a finite, nonzero number within the supported range")]
    InvalidAmount(String),
    #[error("balance of '{player}' would overflow after applying {amount}")]
    BalanceOverflow { player: String, amount: String },
    #[error("no players registered")]
    NoPlayers,
    #[error("no transactions to export")]
    NothingToExport,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl LedgerError {
    /// True for failures caused by operator input rather than the environment.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LedgerError::InvalidName
                | LedgerError::DuplicateName(_)
                | LedgerError::PlayerNotSelected
                | LedgerError::UnknownPlayer(_)
                | LedgerError::InvalidAmount(_)
                | LedgerError::BalanceOverflow { .. }
                | LedgerError::NoPlayers
                | LedgerError::NothingToExport
        )
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for LedgerError {
    fn from(e: rocksdb::Error) -> Self {
        LedgerError::Storage(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
