//! Presentation adapters: the command line, console rendering and statement
//! export. They only read from and send intents to the session controller.

pub mod cli;
pub mod console;
pub mod csv;
