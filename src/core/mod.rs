//! Core module - debugger session and the introspection/control loop
//!
//! Everything that talks to the GDB subprocess lives here: the prompt-framed
//! session, the pattern scanner, the board validator, snapshot reads, and the
//! pause-driven control loop that ties them together.

pub mod board;
pub mod controller;
pub mod scanner;
pub mod session;
pub mod validator;
