//! Board validator - value-shape test for candidate memory windows

use super::board::BOARD_CELLS;
use super::scanner::MemoryWindow;

/// Largest tile value considered plausible (2^16)
const MAX_TILE: u32 = 65_536;

/// Decide whether `window` plausibly holds the 4x4 board.
///
/// Accepts exactly 16 values where every value is at most 65536, every
/// nonzero value is a power of two, and the window mixes empty and occupied
/// cells. All-zero and all-occupied windows are rejected: zero-filled and
/// saturated regions match the seed patterns far too often.
///
/// Pure and deterministic; windows shorter than 16 values are a scanner
/// parse failure and never reach this point.
pub fn validate(window: &MemoryWindow) -> bool {
    if window.values.len() != BOARD_CELLS {
        return false;
    }

    let mut zeros = 0;
    for &value in &window.values {
        if value > MAX_TILE {
            return false;
        }
        if value == 0 {
            zeros += 1;
        } else if !value.is_power_of_two() {
            return false;
        }
    }

    zeros > 0 && zeros < BOARD_CELLS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(values: &[u32]) -> MemoryWindow {
        MemoryWindow {
            base: 0x605000,
            width: 4,
            values: values.to_vec(),
        }
    }

    #[test]
    fn accepts_mixed_powers_of_two() {
        let mut values = [0u32; 16];
        values[3] = 2;
        values[7] = 4;
        values[12] = 1024;
        assert!(validate(&window(&values)));
    }

    #[test]
    fn accepts_single_tile_board() {
        let mut values = [0u32; 16];
        values[3] = 2;
        let w = window(&values);
        assert!(validate(&w));
    }

    #[test]
    fn rejects_non_power_of_two() {
        let mut values = [0u32; 16];
        values[0] = 2;
        values[5] = 3;
        assert!(!validate(&window(&values)));
    }

    #[test]
    fn rejects_value_above_max_tile() {
        let mut values = [0u32; 16];
        values[0] = 2;
        values[5] = 131_072; // 2^17: a power of two, but past the cap
        assert!(!validate(&window(&values)));
    }

    #[test]
    fn accepts_max_tile_itself() {
        let mut values = [0u32; 16];
        values[0] = 65_536;
        assert!(validate(&window(&values)));
    }

    #[test]
    fn rejects_all_zero_window() {
        assert!(!validate(&window(&[0u32; 16])));
    }

    #[test]
    fn rejects_all_occupied_window() {
        assert!(!validate(&window(&[2u32; 16])));
        assert!(!validate(&window(&[65_536u32; 16])));
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(!validate(&window(&[0, 0, 2, 0])));
        assert!(!validate(&window(&[0u32; 17])));
    }
}
