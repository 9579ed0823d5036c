//! Greedy fallback policy - corner-hugging move preference

use crate::core::board::{Snapshot, BOARD_SIDE};

use super::{Action, Policy};

/// Picks the first direction that can shift or merge anything, preferring
/// down, right, left, up - large tiles drift toward the bottom edge. A
/// placeholder strategy, not a tuned one.
#[derive(Debug, Default)]
pub struct GreedyPolicy;

impl GreedyPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl Policy for GreedyPolicy {
    fn choose(&mut self, snapshot: &Snapshot) -> Action {
        const PREFERENCE: [Action; 4] = [Action::Down, Action::Right, Action::Left, Action::Up];
        PREFERENCE
            .into_iter()
            .find(|&direction| can_shift(snapshot, direction))
            .unwrap_or(Action::NoMove)
    }
}

/// Whether any tile can move or merge one cell in `direction`
fn can_shift(snapshot: &Snapshot, direction: Action) -> bool {
    let (dr, dc): (isize, isize) = match direction {
        Action::Up => (-1, 0),
        Action::Down => (1, 0),
        Action::Left => (0, -1),
        Action::Right => (0, 1),
        Action::NoMove => return false,
    };
    for row in 0..BOARD_SIDE {
        for col in 0..BOARD_SIDE {
            let current = snapshot.at(row, col);
            if current == 0 {
                continue;
            }
            let next_row = row as isize + dr;
            let next_col = col as isize + dc;
            if next_row < 0
                || next_col < 0
                || next_row >= BOARD_SIDE as isize
                || next_col >= BOARD_SIDE as isize
            {
                continue;
            }
            let neighbor = snapshot.at(next_row as usize, next_col as usize);
            if neighbor == 0 || neighbor == current {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::board::BOARD_CELLS;

    fn snapshot(cells: [u32; BOARD_CELLS]) -> Snapshot {
        Snapshot::from_cells(cells)
    }

    #[test]
    fn fresh_board_goes_down() {
        let mut cells = [0u32; BOARD_CELLS];
        cells[0] = 2;
        let mut policy = GreedyPolicy::new();
        assert_eq!(policy.choose(&snapshot(cells)), Action::Down);
    }

    #[test]
    fn up_when_nothing_else_moves() {
        // strictly increasing along rows and columns except the empty
        // top-left corner: only the tile below it can move, and only up
        let cells = [
            0, 2, 4, 8, //
            2, 4, 8, 16, //
            4, 8, 16, 32, //
            8, 16, 32, 64,
        ];
        let mut policy = GreedyPolicy::new();
        assert_eq!(policy.choose(&snapshot(cells)), Action::Up);
    }

    #[test]
    fn gridlocked_board_has_no_move() {
        let cells = [
            2, 4, 2, 4, //
            4, 2, 4, 2, //
            2, 4, 2, 4, //
            4, 2, 4, 2,
        ];
        let mut policy = GreedyPolicy::new();
        assert_eq!(policy.choose(&snapshot(cells)), Action::NoMove);
    }

    #[test]
    fn vertical_merge_prefers_down() {
        let mut cells = [0u32; BOARD_CELLS];
        cells[0] = 4;
        cells[4] = 4;
        let mut policy = GreedyPolicy::new();
        assert_eq!(policy.choose(&snapshot(cells)), Action::Down);
    }
}
