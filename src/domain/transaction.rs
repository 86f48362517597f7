use super::player::round_cents;
use crate::error::LedgerError;
use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Strictly positive magnitude of a logged transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, LedgerError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(LedgerError::InvalidAmount(value.to_string()))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", round_cents(self.0))
    }
}

/// A validated change requested by the operator: finite and nonzero, either sign.
///
/// This is the only gate amounts pass through before they touch a balance, so
/// text, floats and decimals all convert into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delta(Decimal);

impl Delta {
    pub fn new(value: Decimal) -> Result<Self, LedgerError> {
        if value.is_zero() {
            Err(LedgerError::InvalidAmount(value.to_string()))
        } else {
            Ok(Self(value))
        }
    }

    /// Parses operator input. Accepts `12`, `-3.5`, `1e3`; rejects empty text,
    /// zero, `NaN`, infinities and anything non-numeric.
    pub fn parse(text: &str) -> Result<Self, LedgerError> {
        let trimmed = text.trim();
        let value = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| LedgerError::InvalidAmount(text.to_string()))?;
        Self::new(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Splits the delta into the logged kind and magnitude. A negative credit is
    /// recorded as a debit and vice versa, so the log always sums to the balance.
    pub fn split(self, requested: TransactionKind) -> (TransactionKind, Amount) {
        let kind = if self.0.is_sign_negative() {
            requested.opposite()
        } else {
            requested
        };
        (kind, Amount(self.0.abs()))
    }
}

impl TryFrom<Decimal> for Delta {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<f64> for Delta {
    type Error = LedgerError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(LedgerError::InvalidAmount(value.to_string()));
        }
        let decimal =
            Decimal::from_f64(value).ok_or_else(|| LedgerError::InvalidAmount(value.to_string()))?;
        Self::new(decimal)
    }
}

impl TryFrom<&str> for Delta {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl FromStr for Delta {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Credit,
    Debit,
}

impl TransactionKind {
    pub fn opposite(self) -> Self {
        match self {
            TransactionKind::Credit => TransactionKind::Debit,
            TransactionKind::Debit => TransactionKind::Credit,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Credit => f.write_str("credit"),
            TransactionKind::Debit => f.write_str("debit"),
        }
    }
}

/// One entry of the append-only log.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Transaction {
    /// Stored as epoch milliseconds, the precision we keep in memory too.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub player_name: String,
    pub kind: TransactionKind,
    pub amount: Amount,
}

impl Transaction {
    /// The effect this entry had on its player's balance.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Credit => self.amount.value(),
            TransactionKind::Debit => -self.amount.value(),
        }
    }
}

/// Wall-clock time truncated to what the log can persist.
pub(crate) fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
