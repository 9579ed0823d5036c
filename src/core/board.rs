//! Board handle and snapshots
//!
//! `BoardHandle` is the confirmed location of the board; `Snapshot` is one
//! point-in-time copy of its contents with the derived fields the policy and
//! the renderer consume.

use super::scanner::{self, MemoryWindow, ScanError};
use super::session::GdbSession;

/// Cells in the board
pub const BOARD_CELLS: usize = 16;
/// Cells per row/column
pub const BOARD_SIDE: usize = 4;
/// Bytes per cell
pub const CELL_BYTES: u64 = 4;

/// Confirmed location of the board in target memory.
///
/// The address never changes once validation has confirmed it; only the cell
/// contents move as the target runs. A handle is only meaningful while the
/// session that produced it is alive - reads against a handle after session
/// teardown are a caller error, not a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardHandle {
    pub base: u64,
    pub cells: usize,
    pub cell_bytes: u64,
}

impl BoardHandle {
    pub fn new(base: u64) -> Self {
        Self {
            base,
            cells: BOARD_CELLS,
            cell_bytes: CELL_BYTES,
        }
    }
}

/// Immutable point-in-time copy of the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Cell values, row-major
    pub cells: [u32; BOARD_CELLS],
    /// How many cells are empty
    pub empty: usize,
    /// Largest tile on the board
    pub max_tile: u32,
}

impl Snapshot {
    pub fn from_cells(cells: [u32; BOARD_CELLS]) -> Self {
        let empty = cells.iter().filter(|&&v| v == 0).count();
        let max_tile = cells.iter().copied().max().unwrap_or(0);
        Self {
            cells,
            empty,
            max_tile,
        }
    }

    pub fn from_window(window: &MemoryWindow) -> Option<Self> {
        let cells: [u32; BOARD_CELLS] = window.values.as_slice().try_into().ok()?;
        Some(Self::from_cells(cells))
    }

    /// Cell at (row, col), row-major
    pub fn at(&self, row: usize, col: usize) -> u32 {
        self.cells[row * BOARD_SIDE + col]
    }

    /// The four rows in read order
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.cells.chunks(BOARD_SIDE)
    }
}

/// Read the board's current contents into a snapshot.
///
/// Uses the scanner's examine path; a `Parse` failure here can be a read
/// racing a mid-update target, so the caller may retry once before
/// surfacing it.
pub fn read_snapshot(session: &mut GdbSession, handle: &BoardHandle) -> Result<Snapshot, ScanError> {
    let window = scanner::read_window(session, handle.base, handle.cells)?;
    Snapshot::from_window(&window).ok_or(ScanError::Parse {
        address: handle.base,
        expected: handle.cells,
        parsed: window.values.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_empty_count_and_max_tile() {
        let mut cells = [0u32; BOARD_CELLS];
        cells[3] = 2;
        let snapshot = Snapshot::from_cells(cells);
        assert_eq!(snapshot.empty, 15);
        assert_eq!(snapshot.max_tile, 2);
    }

    #[test]
    fn indexing_is_row_major() {
        let mut cells = [0u32; BOARD_CELLS];
        cells[6] = 64;
        let snapshot = Snapshot::from_cells(cells);
        assert_eq!(snapshot.at(1, 2), 64);
    }

    #[test]
    fn rows_reconstruct_read_order() {
        let mut cells = [0u32; BOARD_CELLS];
        for (i, cell) in cells.iter_mut().enumerate() {
            *cell = 1 << i;
        }
        let snapshot = Snapshot::from_cells(cells);

        let flattened: Vec<u32> = snapshot.rows().flatten().copied().collect();
        assert_eq!(flattened, cells.to_vec());
        assert_eq!(snapshot.rows().count(), BOARD_SIDE);
    }
}
