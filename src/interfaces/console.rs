//! Plain-text rendering of events and ledger views.

use crate::application::session::{Cue, SessionEvent};
use crate::domain::ledger::GameOutcome;
use crate::domain::player::{Balance, Player};
use crate::domain::transaction::{Transaction, TransactionKind};
use rust_decimal::Decimal;
use std::io::{self, Write};

/// Formats an amount the way balances are shown on the table.
pub fn money(value: Decimal) -> String {
    format!("R$ {}", Balance(value))
}

pub fn render_event<W: Write>(out: &mut W, event: &SessionEvent) -> io::Result<()> {
    match event {
        SessionEvent::PlayerRegistered { name } => writeln!(out, "Registered {name}"),
        SessionEvent::SamplesSeeded { names } => {
            writeln!(out, "Seeded sample players: {}", names.join(", "))
        }
        SessionEvent::Credited {
            name,
            amount,
            balance,
        } => writeln!(
            out,
            "{name} received a credit of {}, balance {}",
            money(*amount),
            money(balance.value())
        ),
        SessionEvent::Debited {
            name,
            amount,
            balance,
        } => writeln!(
            out,
            "{name} was debited {}, balance {}",
            money(*amount),
            money(balance.value())
        ),
        SessionEvent::GameFinished(GameOutcome::Winner { name, balance }) => writeln!(
            out,
            "Game over! {name} wins with {}",
            money(balance.value())
        ),
        SessionEvent::GameFinished(GameOutcome::Tie { names, balance }) => writeln!(
            out,
            "Game over! Tie at {} between: {}",
            money(balance.value()),
            names.join(", ")
        ),
        SessionEvent::SessionReset => writeln!(out, "Session reset"),
        SessionEvent::SoundChanged { enabled } => {
            writeln!(out, "Sound {}", if *enabled { "on" } else { "off" })
        }
    }
}

pub fn render_players<'a, W, I>(out: &mut W, players: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Player>,
{
    let mut any = false;
    for player in players {
        any = true;
        writeln!(out, "{}: {}", player.name, money(player.balance.value()))?;
    }
    if !any {
        writeln!(out, "No players registered.")?;
    }
    Ok(())
}

pub fn render_ranking<W: Write>(out: &mut W, ranking: &[(&str, Balance)]) -> io::Result<()> {
    if ranking.is_empty() {
        return writeln!(out, "No players registered.");
    }
    for (i, (name, balance)) in ranking.iter().enumerate() {
        writeln!(out, "{}. {name} {}", i + 1, money(balance.value()))?;
    }
    Ok(())
}

pub fn render_history<W: Write>(out: &mut W, history: &[&Transaction]) -> io::Result<()> {
    if history.is_empty() {
        return writeln!(out, "No transactions yet.");
    }
    for tx in history {
        let kind = match tx.kind {
            TransactionKind::Credit => "credit",
            TransactionKind::Debit => "debit ",
        };
        writeln!(
            out,
            "{}  {kind}  {}  {}",
            tx.timestamp.format("%Y-%m-%d %H:%M:%S"),
            money(tx.amount.value()),
            tx.player_name
        )?;
    }
    Ok(())
}

/// Rings the terminal bell: once for a click, twice for cash, three times for
/// an error.
pub fn play_cue<W: Write>(out: &mut W, cue: Cue) -> io::Result<()> {
    let rings = match cue {
        Cue::Click => 1,
        Cue::Cash => 2,
        Cue::Error => 3,
    };
    out.write_all(&[0x07; 3][..rings])?;
    out.flush()
}
