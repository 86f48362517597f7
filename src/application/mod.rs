//! Application layer: the session controller that turns operator intents into
//! ledger operations and keeps the repository up to date after each one.

pub mod session;
