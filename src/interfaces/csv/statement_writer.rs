use crate::domain::player::Player;
use crate::domain::transaction::{Transaction, TransactionKind};
use crate::error::{LedgerError, Result};
use serde::Serialize;
use std::io::Write;

/// One line of an exported statement.
///
/// Balance rows leave the transaction columns empty and vice versa, so the whole
/// statement fits in a single table with one header.
#[derive(Debug, Serialize)]
struct StatementRow<'a> {
    section: &'static str,
    player: &'a str,
    kind: Option<TransactionKind>,
    amount: Option<String>,
    balance: Option<String>,
    timestamp: Option<String>,
}

/// Writes the printable statement: every balance, then every transaction in the
/// order it happened.
pub struct StatementWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> StatementWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Fails with [`LedgerError::NothingToExport`] when the log is empty.
    pub fn write_statement<'a, P>(&mut self, players: P, history: &[Transaction]) -> Result<()>
    where
        P: IntoIterator<Item = &'a Player>,
    {
        if history.is_empty() {
            return Err(LedgerError::NothingToExport);
        }

        for player in players {
            self.writer.serialize(StatementRow {
                section: "balance",
                player: &player.name,
                kind: None,
                amount: None,
                balance: Some(player.balance.to_string()),
                timestamp: None,
            })?;
        }
        for tx in history {
            self.writer.serialize(StatementRow {
                section: "transaction",
                player: &tx.player_name,
                kind: Some(tx.kind),
                amount: Some(tx.amount.to_string()),
                balance: None,
                timestamp: Some(tx.timestamp.to_rfc3339()),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
