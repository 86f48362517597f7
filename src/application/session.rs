use crate::domain::ledger::{GameOutcome, Ledger};
use crate::domain::player::{Balance, Player, PlayerBook};
use crate::domain::ports::SessionRepositoryBox;
use crate::domain::transaction::{Delta, Transaction};
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use tracing::{debug, error, warn};

/// Order in which [`SessionController::history`] returns the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryOrder {
    Chronological,
    #[default]
    NewestFirst,
}

/// Audible feedback hint for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Click,
    Cash,
    Error,
}

/// What a successful intent did. Presentation renders it, then re-queries the
/// controller for the state it wants to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    PlayerRegistered { name: String },
    SamplesSeeded { names: Vec<String> },
    Credited { name: String, amount: Decimal, balance: Balance },
    Debited { name: String, amount: Decimal, balance: Balance },
    GameFinished(GameOutcome),
    SessionReset,
    SoundChanged { enabled: bool },
}

impl SessionEvent {
    pub fn cue(&self) -> Cue {
        match self {
            SessionEvent::Credited { .. } => Cue::Cash,
            SessionEvent::GameFinished(GameOutcome::Winner { .. }) => Cue::Cash,
            _ => Cue::Click,
        }
    }
}

/// Turns operator intents into ledger calls and keeps storage in step.
///
/// The controller never holds its own copy of players or transactions: every
/// read goes through the ledger, and every successful mutation is written to the
/// repository before the call returns.
pub struct SessionController {
    ledger: Ledger,
    repository: SessionRepositoryBox,
    sound: bool,
}

impl SessionController {
    /// Restores the last saved session.
    ///
    /// Missing records start empty. Unreadable ones are logged and also start
    /// empty: a damaged save never prevents the bank from opening.
    pub async fn load(repository: SessionRepositoryBox) -> Self {
        let players: PlayerBook = or_default("players", repository.load_players().await);
        let history: Vec<Transaction> = or_default("history", repository.load_history().await);
        let sound = match repository.load_sound().await {
            Ok(Some(enabled)) => enabled,
            Ok(None) => true,
            Err(e) => {
                warn!(error = %e, "sound setting unreadable, defaulting to on");
                true
            }
        };

        debug!(
            players = players.len(),
            transactions = history.len(),
            sound,
            "session loaded"
        );
        Self {
            ledger: Ledger::from_parts(players, history),
            repository,
            sound,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub async fn register_player(&mut self, name: &str) -> Result<SessionEvent> {
        let name = self.ledger.register_player(name)?.name.clone();
        self.persist().await;
        Ok(SessionEvent::PlayerRegistered { name })
    }

    pub async fn seed_sample_players(&mut self) -> SessionEvent {
        let names = self
            .ledger
            .seed_sample_players()
            .into_iter()
            .map(|p| p.name.clone())
            .collect();
        self.persist().await;
        SessionEvent::SamplesSeeded { names }
    }

    /// Credits a player. `amount` may be raw operator text, a float or a decimal.
    pub async fn credit<A>(&mut self, name: &str, amount: A) -> Result<SessionEvent>
    where
        A: TryInto<Delta, Error = LedgerError>,
    {
        let balance = self.ledger.credit(name, amount)?;
        self.persist().await;
        Ok(SessionEvent::Credited {
            name: name.trim().to_string(),
            amount: self.last_signed_amount(),
            balance,
        })
    }

    /// Debits a player. `amount` may be raw operator text, a float or a decimal.
    pub async fn debit<A>(&mut self, name: &str, amount: A) -> Result<SessionEvent>
    where
        A: TryInto<Delta, Error = LedgerError>,
    {
        let balance = self.ledger.debit(name, amount)?;
        self.persist().await;
        Ok(SessionEvent::Debited {
            name: name.trim().to_string(),
            amount: -self.last_signed_amount(),
            balance,
        })
    }

    /// Declares the result of the game. Does not change any state.
    pub fn finish_game(&self) -> Result<SessionEvent> {
        Ok(SessionEvent::GameFinished(self.ledger.determine_winner()?))
    }

    /// Wipes players and history. The caller must have confirmed the intent.
    pub async fn reset(&mut self) -> SessionEvent {
        self.ledger.reset();
        self.persist().await;
        SessionEvent::SessionReset
    }

    pub async fn set_sound(&mut self, enabled: bool) -> SessionEvent {
        self.sound = enabled;
        if let Err(e) = self.repository.save_sound(enabled).await {
            error!(error = %e, "failed to save sound setting");
        }
        SessionEvent::SoundChanged { enabled }
    }

    pub async fn toggle_sound(&mut self) -> SessionEvent {
        self.set_sound(!self.sound).await
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound
    }

    /// The cue to play for the outcome of an intent, if sound is on.
    ///
    /// Rejected input gets the error cue. Asking for a result there is nothing
    /// to compute from (no players, no transactions) is only reported, silently.
    pub fn cue_for(&self, outcome: &Result<SessionEvent>) -> Option<Cue> {
        if !self.sound {
            return None;
        }
        match outcome {
            Ok(event) => Some(event.cue()),
            Err(LedgerError::NoPlayers | LedgerError::NothingToExport) => None,
            Err(e) if e.is_validation() => Some(Cue::Error),
            Err(_) => None,
        }
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.ledger.players().iter()
    }

    pub fn ranking(&self) -> Vec<(&str, Balance)> {
        self.ledger.ranking()
    }

    pub fn history(&self, order: HistoryOrder) -> Vec<&Transaction> {
        let entries = self.ledger.history().iter();
        match order {
            HistoryOrder::Chronological => entries.collect(),
            HistoryOrder::NewestFirst => entries.rev().collect(),
        }
    }

    /// Effect of the entry just appended by a credit or debit.
    fn last_signed_amount(&self) -> Decimal {
        self.ledger
            .history()
            .last()
            .map(Transaction::signed_amount)
            .unwrap_or_default()
    }

    /// Writes players, then history. They are separate records, so a failure
    /// between the two leaves storage with balances ahead of the saved log until
    /// the next successful save.
    async fn persist(&self) {
        if let Err(e) = self.repository.save_players(self.ledger.players()).await {
            error!(error = %e, "failed to save players, continuing in memory");
        }
        if let Err(e) = self.repository.save_history(self.ledger.history()).await {
            error!(error = %e, "failed to save history, continuing in memory");
        }
    }
}

fn or_default<T: Default>(record: &str, loaded: Result<Option<T>>) -> T {
    match loaded {
        Ok(value) => value.unwrap_or_default(),
        Err(e) => {
            warn!(record, error = %e, "stored record unreadable, starting empty");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::player::PlayerBook;
    use crate::domain::ports::SessionRepository;
    use crate::domain::transaction::TransactionKind;
    use crate::infrastructure::Record;
    use crate::infrastructure::in_memory::InMemoryRepository;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    async fn fresh() -> (SessionController, InMemoryRepository) {
        let repo = InMemoryRepository::new();
        let session = SessionController::load(Box::new(repo.clone())).await;
        (session, repo)
    }

    /// A repository whose writes always fail.
    struct BrokenRepository;

    #[async_trait]
    impl SessionRepository for BrokenRepository {
        async fn load_players(&self) -> Result<Option<PlayerBook>> {
            Err(LedgerError::Io(std::io::Error::other("offline")))
        }
        async fn load_history(&self) -> Result<Option<Vec<Transaction>>> {
            Ok(None)
        }
        async fn load_sound(&self) -> Result<Option<bool>> {
            Ok(None)
        }
        async fn save_players(&self, _players: &PlayerBook) -> Result<()> {
            Err(LedgerError::Io(std::io::Error::other("offline")))
        }
        async fn save_history(&self, _history: &[Transaction]) -> Result<()> {
            Err(LedgerError::Io(std::io::Error::other("offline")))
        }
        async fn save_sound(&self, _enabled: bool) -> Result<()> {
            Err(LedgerError::Io(std::io::Error::other("offline")))
        }
    }

    #[tokio::test]
    async fn test_scenario_register_credit_debit() {
        let (mut session, _) = fresh().await;
        session.register_player("Ana").await.unwrap();
        session.credit("Ana", "1000").await.unwrap();
        let event = session.debit("Ana", dec!(300)).await.unwrap();

        assert_eq!(
            event,
            SessionEvent::Debited {
                name: "Ana".to_string(),
                amount: dec!(300),
                balance: Balance(dec!(700)),
            }
        );
        assert_eq!(session.ranking(), vec![("Ana", Balance(dec!(700)))]);

        let chronological = session.history(HistoryOrder::Chronological);
        assert_eq!(chronological.len(), 2);
        assert_eq!(chronological[0].kind, TransactionKind::Credit);

        let newest = session.history(HistoryOrder::NewestFirst);
        assert_eq!(newest[0].kind, TransactionKind::Debit);
    }

    #[tokio::test]
    async fn test_every_mutation_is_persisted() {
        let (mut session, repo) = fresh().await;
        session.seed_sample_players().await;
        session.credit("Bruno", 250.0).await.unwrap();

        let reloaded = SessionController::load(Box::new(repo.clone())).await;
        assert_eq!(reloaded.ledger(), session.ledger());
        assert_eq!(
            reloaded.ledger().player("Bruno").unwrap().balance,
            Balance(dec!(2250))
        );
    }

    #[tokio::test]
    async fn test_failed_intent_changes_nothing() {
        let (mut session, repo) = fresh().await;
        session.register_player("Ana").await.unwrap();
        let saved = repo.raw(Record::Players);

        assert!(matches!(
            session.register_player("Ana").await,
            Err(LedgerError::DuplicateName(_))
        ));
        assert!(matches!(
            session.credit("Ana", "").await,
            Err(LedgerError::InvalidAmount(_))
        ));
        assert!(matches!(
            session.debit("", "10").await,
            Err(LedgerError::PlayerNotSelected)
        ));

        assert_eq!(repo.raw(Record::Players), saved);
        assert!(repo.raw(Record::History).is_some());
        assert!(session.history(HistoryOrder::Chronological).is_empty());
    }

    #[tokio::test]
    async fn test_finish_game_outcomes() {
        let (mut session, _) = fresh().await;
        assert!(matches!(session.finish_game(), Err(LedgerError::NoPlayers)));

        session.seed_sample_players().await;
        let event = session.finish_game().unwrap();
        assert_eq!(
            event,
            SessionEvent::GameFinished(GameOutcome::Winner {
                name: "Diana".to_string(),
                balance: Balance(dec!(4000)),
            })
        );
        assert_eq!(event.cue(), Cue::Cash);

        session.credit("Caio", dec!(1000)).await.unwrap();
        let event = session.finish_game().unwrap();
        assert!(matches!(
            event,
            SessionEvent::GameFinished(GameOutcome::Tie { ref names, .. })
                if names == &["Caio".to_string(), "Diana".to_string()]
        ));
        assert_eq!(event.cue(), Cue::Click);
    }

    #[tokio::test]
    async fn test_reset_is_persisted() {
        let (mut session, repo) = fresh().await;
        session.seed_sample_players().await;
        session.debit("Ana", 10.0).await.unwrap();

        assert_eq!(session.reset().await, SessionEvent::SessionReset);
        assert_eq!(session.players().count(), 0);
        assert!(session.ranking().is_empty());

        let reloaded = SessionController::load(Box::new(repo)).await;
        assert!(reloaded.ledger().is_empty());
        assert!(!reloaded.ledger().has_history());
    }

    #[tokio::test]
    async fn test_malformed_records_load_empty() {
        let repo = InMemoryRepository::new();
        repo.put_raw(Record::Players, "not json").unwrap();
        repo.put_raw(Record::History, r#"[{"timestamp":"soon"}]"#).unwrap();
        repo.put_raw(Record::Sound, "42").unwrap();

        let session = SessionController::load(Box::new(repo)).await;
        assert!(session.ledger().is_empty());
        assert!(!session.ledger().has_history());
        assert!(session.sound_enabled());
    }

    #[tokio::test]
    async fn test_sound_flag() {
        let (mut session, repo) = fresh().await;
        assert!(session.sound_enabled());

        assert_eq!(
            session.toggle_sound().await,
            SessionEvent::SoundChanged { enabled: false }
        );
        assert_eq!(repo.raw(Record::Sound), Some(b"false".to_vec()));
        assert_eq!(session.cue_for(&Ok(SessionEvent::SessionReset)), None);

        session.set_sound(true).await;
        let reloaded = SessionController::load(Box::new(repo)).await;
        assert!(reloaded.sound_enabled());
    }

    #[tokio::test]
    async fn test_cues() {
        let (mut session, _) = fresh().await;
        session.register_player("Ana").await.unwrap();

        let credited = session.credit("Ana", 5.0).await;
        assert_eq!(session.cue_for(&credited), Some(Cue::Cash));

        let debited = session.debit("Ana", 5.0).await;
        assert_eq!(session.cue_for(&debited), Some(Cue::Click));

        let failed = session.credit("Ana", 0.0).await;
        assert_eq!(session.cue_for(&failed), Some(Cue::Error));

        let overflowed = session.credit("Ana", rust_decimal::Decimal::MAX).await;
        assert!(overflowed.is_ok());
        let overflowed = session.credit("Ana", rust_decimal::Decimal::MAX).await;
        assert_eq!(session.cue_for(&overflowed), Some(Cue::Error));
    }

    #[tokio::test]
    async fn test_empty_results_play_no_cue() {
        let (session, _) = fresh().await;
        let finished = session.finish_game();
        assert!(matches!(finished, Err(LedgerError::NoPlayers)));
        assert_eq!(session.cue_for(&finished), None);
        assert_eq!(session.cue_for(&Err(LedgerError::NothingToExport)), None);
    }

    #[tokio::test]
    async fn test_trade_with_padded_name_reports_stored_name() {
        let (mut session, _) = fresh().await;
        session.register_player(" Ana ").await.unwrap();
        let event = session.credit(" Ana ", "5").await.unwrap();
        assert_eq!(
            event,
            SessionEvent::Credited {
                name: "Ana".to_string(),
                amount: dec!(5),
                balance: Balance(dec!(5)),
            }
        );
    }

    #[tokio::test]
    async fn test_storage_failure_keeps_session_running() {
        let mut session = SessionController::load(Box::new(BrokenRepository)).await;
        assert!(session.ledger().is_empty());

        session.register_player("Ana").await.unwrap();
        session.credit("Ana", "42").await.unwrap();
        session.toggle_sound().await;

        assert_eq!(
            session.ledger().player("Ana").unwrap().balance,
            Balance(dec!(42))
        );
        assert!(!session.sound_enabled());
    }
}
