//! Decision policies
//!
//! The control loop feeds every pause's snapshot to a policy and injects
//! whatever it picks. Strategy is pluggable; the loop depends only on this
//! interface.

mod greedy;

pub use greedy::GreedyPolicy;

use crate::core::board::Snapshot;

/// One move on the board, or the admission that none is legal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    /// No direction can shift or merge anything
    NoMove,
}

impl Action {
    /// Key code injected as the input routine's return value
    pub fn key_code(self) -> u32 {
        match self {
            Action::Up => b'w' as u32,
            Action::Down => b's' as u32,
            Action::Left => b'a' as u32,
            Action::Right => b'd' as u32,
            Action::NoMove => b'q' as u32,
        }
    }
}

/// Picks a move for each pause
pub trait Policy {
    fn choose(&mut self, snapshot: &Snapshot) -> Action;
}
