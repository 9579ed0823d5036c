//! Board renderer

use crate::core::board::{Snapshot, BOARD_SIDE};

const CELL_WIDTH: usize = 5;

/// Draw the 4x4 grid the way the game itself does: empty cells blank,
/// tiles right-aligned.
pub fn render_board(snapshot: &Snapshot) -> String {
    let border = format!("  {}\n", "-".repeat((CELL_WIDTH + 1) * BOARD_SIDE + 1));
    let mut out = border.clone();
    for row in snapshot.rows() {
        out.push_str("  |");
        for &value in row {
            if value == 0 {
                out.push_str(&" ".repeat(CELL_WIDTH));
            } else {
                out.push_str(&format!("{value:width$}", width = CELL_WIDTH));
            }
            out.push('|');
        }
        out.push('\n');
    }
    out.push_str(&border);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::board::BOARD_CELLS;

    #[test]
    fn renders_tiles_and_blanks() {
        let mut cells = [0u32; BOARD_CELLS];
        cells[3] = 2;
        cells[5] = 1024;
        let text = render_board(&Snapshot::from_cells(cells));

        assert!(text.contains("    2|"));
        assert!(text.contains(" 1024|"));
        assert!(text.contains("|     |"));
    }

    #[test]
    fn renders_four_rows_inside_borders() {
        let text = render_board(&Snapshot::from_cells([2u32; BOARD_CELLS]));
        let rows = text.lines().filter(|l| l.contains('|')).count();
        assert_eq!(rows, BOARD_SIDE);
    }
}
