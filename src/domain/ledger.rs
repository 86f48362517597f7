use super::player::{Balance, Player, PlayerBook};
use super::transaction::{Delta, Transaction, TransactionKind, now_millis};
use crate::error::{LedgerError, Result};
use rust_decimal_macros::dec;
use tracing::debug;

/// Names used by [`Ledger::seed_sample_players`], in seeding order.
pub const SAMPLE_PLAYERS: [&str; 4] = ["Ana", "Bruno", "Caio", "Diana"];

/// Multiplier for the sample balances: the n-th sample player gets n units.
pub const SAMPLE_UNIT: Balance = Balance(dec!(1000));

/// How a finished game ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameOutcome {
    Winner { name: String, balance: Balance },
    /// Every player sharing the top balance, in registration order.
    Tie { names: Vec<String>, balance: Balance },
}

impl GameOutcome {
    pub fn balance(&self) -> Balance {
        match self {
            GameOutcome::Winner { balance, .. } | GameOutcome::Tie { balance, .. } => *balance,
        }
    }
}

/// The single source of truth for players and their transactions.
///
/// Every mutation validates first and only then touches state, so a failed call
/// leaves the ledger exactly as it was.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    players: PlayerBook,
    history: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from previously persisted records.
    pub fn from_parts(players: PlayerBook, history: Vec<Transaction>) -> Self {
        Self { players, history }
    }

    /// Registers a new player with a zero balance.
    pub fn register_player(&mut self, name: &str) -> Result<&Player> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::InvalidName);
        }
        if self.players.contains(name) {
            return Err(LedgerError::DuplicateName(name.to_string()));
        }

        debug!(player = name, "registering player");
        self.players.upsert(Player::new(name));
        self.players
            .get(name)
            .ok_or_else(|| LedgerError::UnknownPlayer(name.to_string()))
    }

    /// Fills the table with the sample players and their preset balances.
    ///
    /// A sample name that is already registered is overwritten in place: it keeps
    /// its ranking position and takes the preset balance.
    pub fn seed_sample_players(&mut self) -> Vec<&Player> {
        for (i, name) in SAMPLE_PLAYERS.iter().enumerate() {
            let balance = Balance(SAMPLE_UNIT.0 * rust_decimal::Decimal::from(i + 1));
            if self
                .players
                .upsert(Player::with_balance(*name, balance))
                .is_some()
            {
                debug!(player = *name, "sample player overwrote existing entry");
            }
        }
        SAMPLE_PLAYERS
            .iter()
            .filter_map(|name| self.players.get(name))
            .collect()
    }

    /// Adds `amount` to the player's balance and logs it. Returns the new balance.
    pub fn credit<A>(&mut self, name: &str, amount: A) -> Result<Balance>
    where
        A: TryInto<Delta, Error = LedgerError>,
    {
        self.apply(name, amount, TransactionKind::Credit)
    }

    /// Subtracts `amount` from the player's balance and logs it. The balance may go
    /// negative. Returns the new balance.
    pub fn debit<A>(&mut self, name: &str, amount: A) -> Result<Balance>
    where
        A: TryInto<Delta, Error = LedgerError>,
    {
        self.apply(name, amount, TransactionKind::Debit)
    }

    fn apply<A>(&mut self, name: &str, amount: A, requested: TransactionKind) -> Result<Balance>
    where
        A: TryInto<Delta, Error = LedgerError>,
    {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::PlayerNotSelected);
        }
        let delta: Delta = amount.try_into()?;
        let signed = match requested {
            TransactionKind::Credit => delta.value(),
            TransactionKind::Debit => -delta.value(),
        };

        let player = self
            .players
            .get_mut(name)
            .ok_or_else(|| LedgerError::UnknownPlayer(name.to_string()))?;
        let balance = player.balance.checked_add(signed).ok_or_else(|| {
            LedgerError::BalanceOverflow {
                player: name.to_string(),
                amount: signed.to_string(),
            }
        })?;
        player.balance = balance;

        let (kind, amount) = delta.split(requested);
        let mut timestamp = now_millis();
        if let Some(last) = self.history.last()
            && last.timestamp > timestamp
        {
            timestamp = last.timestamp;
        }
        self.history.push(Transaction {
            timestamp,
            player_name: name.to_string(),
            kind,
            amount,
        });

        debug!(player = name, %kind, %amount, %balance, "applied transaction");
        Ok(balance)
    }

    /// Players with their balances, richest first. Equal balances keep
    /// registration order.
    pub fn ranking(&self) -> Vec<(&str, Balance)> {
        let mut standings: Vec<(&str, Balance)> = self
            .players
            .iter()
            .map(|p| (p.name.as_str(), p.balance))
            .collect();
        standings.sort_by(|a, b| b.1.cmp(&a.1));
        standings
    }

    /// Finds the player, or every player, holding the highest balance.
    pub fn determine_winner(&self) -> Result<GameOutcome> {
        let top = self
            .players
            .iter()
            .map(|p| p.balance)
            .max()
            .ok_or(LedgerError::NoPlayers)?;

        let mut names: Vec<String> = self
            .players
            .iter()
            .filter(|p| p.balance == top)
            .map(|p| p.name.clone())
            .collect();

        if names.len() == 1 {
            Ok(GameOutcome::Winner {
                name: names.remove(0),
                balance: top,
            })
        } else {
            Ok(GameOutcome::Tie {
                names,
                balance: top,
            })
        }
    }

    /// Drops every player and transaction. Irreversible.
    pub fn reset(&mut self) {
        debug!(
            players = self.players.len(),
            transactions = self.history.len(),
            "resetting ledger"
        );
        self.players.clear();
        self.history.clear();
    }

    /// The log in the order entries were made.
    pub fn history(&self) -> &[Transaction] {
        &self.history
    }

    pub fn players(&self) -> &PlayerBook {
        &self.players
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn has_history(&self) -> bool {
        !self.history.is_empty()
    }
}
