//! Domain model of the bank: players, the transaction log and the ledger that
//! keeps them consistent, plus the persistence port the application layer uses.

pub mod ledger;
pub mod player;
pub mod ports;
pub mod transaction;
