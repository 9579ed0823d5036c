//! App module - shared application state and commands
//!
//! Command parsing and dispatch used by both the REPL and auto mode.

mod commands;
mod state;

pub use commands::*;
pub use state::*;
