//! UI module - terminal interface
//!
//! Reedline-based REPL plus the board renderer.

pub mod cli;
pub mod display;
