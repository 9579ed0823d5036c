//! Memory scanner - pattern search and memory examine over the session
//!
//! No symbol information is available for the board, so location is a
//! two-step heuristic: `find /w` for a plausible seed pattern, then `x/Nwx`
//! to pull a candidate window for validation. This module is the single
//! parsing boundary for the debugger's free-form output: a token that does
//! not have the expected hex shape is dropped, never coerced to a number.

use thiserror::Error;

use super::session::{GdbSession, SessionError};

/// Scanner-level errors
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("expected {expected} words at {address:#x}, parsed {parsed}")]
    Parse {
        address: u64,
        expected: usize,
        parsed: usize,
    },

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Seed patterns a fresh board plausibly starts with, in priority order:
/// one or two starting tiles among empty cells.
pub const SEED_PATTERNS: &[&[u32]] = &[
    &[0, 0, 0, 2],
    &[2, 0, 0, 0],
    &[0, 2, 0, 0],
    &[2, 2, 0, 0],
];

/// An address produced by a pattern search, not yet validated
#[derive(Debug, Clone)]
pub struct Candidate {
    pub address: u64,
    /// Seed pattern that produced the match
    pub pattern: Vec<u32>,
}

/// Fixed-width words read starting at a base address
#[derive(Debug, Clone)]
pub struct MemoryWindow {
    pub base: u64,
    /// Bytes per element
    pub width: usize,
    pub values: Vec<u32>,
}

/// Search `[low, high)` for consecutive words matching `pattern`.
///
/// Zero matches is a normal outcome and yields an empty vector.
pub fn search_pattern(
    session: &mut GdbSession,
    pattern: &[u32],
    low: u64,
    high: u64,
) -> Result<Vec<Candidate>, ScanError> {
    let needle = pattern
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let command = format!("find /w {low:#x}, {high:#x}, {needle}");
    let output = request_retry(session, &command)?;

    let addresses = parse_addresses(&output);
    log::debug!("pattern {:?}: {} match(es)", pattern, addresses.len());

    Ok(addresses
        .into_iter()
        .map(|address| Candidate {
            address,
            pattern: pattern.to_vec(),
        })
        .collect())
}

/// Read `count` 4-byte words starting at `address`.
///
/// Fails with `Parse` when the response does not contain `count` well-formed
/// values - truncated or malformed debugger output, or an unreadable address.
pub fn read_window(
    session: &mut GdbSession,
    address: u64,
    count: usize,
) -> Result<MemoryWindow, ScanError> {
    let command = format!("x/{count}wx {address:#x}");
    let output = request_retry(session, &command)?;

    let mut values = parse_window_values(&output);
    if values.len() < count {
        return Err(ScanError::Parse {
            address,
            expected: count,
            parsed: values.len(),
        });
    }
    values.truncate(count);

    Ok(MemoryWindow {
        base: address,
        width: 4,
        values,
    })
}

/// One retry on a missing prompt; both scan commands are idempotent reads.
fn request_retry(session: &mut GdbSession, command: &str) -> Result<String, ScanError> {
    match session.request(command) {
        Err(SessionError::PromptTimeout { .. }) => {
            log::warn!("prompt timeout on `{command}`, retrying once");
            Ok(session.request(command)?)
        }
        other => Ok(other?),
    }
}

/// Every `0x`-prefixed hex token in the response, in order.
///
/// `find` output mixes match addresses with symbol annotations and a final
/// "N patterns found." line; only well-formed hex tokens survive.
fn parse_addresses(output: &str) -> Vec<u64> {
    let mut addresses = Vec::new();
    for line in output.lines() {
        for token in line.split_whitespace() {
            let token = token.trim_end_matches(|c: char| !c.is_ascii_hexdigit());
            let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) else {
                continue;
            };
            if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                continue;
            }
            if let Ok(address) = u64::from_str_radix(hex, 16) {
                addresses.push(address);
            }
        }
    }
    addresses
}

/// Hex word values from `x/Nwx` output: only tokens after the `0xADDR:` label
/// of each dump line count as values.
fn parse_window_values(output: &str) -> Vec<u32> {
    let mut values = Vec::new();
    for line in output.lines() {
        let Some((label, rest)) = line.split_once(':') else {
            continue;
        };
        if !label.trim_start().starts_with("0x") {
            continue;
        }
        for token in rest.split_whitespace() {
            let Some(hex) = token.strip_prefix("0x") else {
                continue;
            };
            if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                continue;
            }
            if let Ok(value) = u32::from_str_radix(hex, 16) {
                values.push(value);
            }
        }
    }
    values
}
