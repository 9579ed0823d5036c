//! Control loop - locate, arm, and drive the target one pause at a time
//!
//! State machine: Unattached -> Located -> Armed -> Paused -> (Armed |
//! Terminated). Each pause gets exactly one read-decide-inject cycle before
//! the target is resumed, so the target never advances on stale or missing
//! input.

use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use super::board::{self, BoardHandle, Snapshot, BOARD_CELLS};
use super::scanner::{self, ScanError, SEED_PATTERNS};
use super::session::{GdbSession, SessionConfig, SessionError};
use super::validator;
use crate::policy::{Action, Policy};

/// Control-loop errors
#[derive(Error, Debug)]
pub enum ControlError {
    #[error("operation needs state {needed}, control loop is {actual:?}")]
    InvalidState {
        needed: &'static str,
        actual: LoopState,
    },

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Where the loop currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// No validated board yet
    Unattached,
    /// Board found, pause point not installed
    Located,
    /// Pause point installed, target free to run
    Armed,
    /// Target suspended at the pause point
    Paused,
    /// Session torn down or target gone
    Terminated,
}

/// Tunables for locating and driving the target
#[derive(Debug, Clone)]
pub struct ControlConfig {
    /// Function whose return value carries one keypress
    pub input_symbol: String,
    /// Pattern-scan range
    pub scan_low: u64,
    pub scan_high: u64,
    /// How long `run` may stay silent before the target counts as running
    pub start_timeout: Duration,
    /// How long a resume may take to reach the next pause
    pub pause_timeout: Duration,
    /// Candidates examined per seed pattern
    pub max_candidates: usize,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            input_symbol: "wgetch".into(),
            scan_low: 0x40_0000,
            scan_high: 0x70_0000,
            start_timeout: Duration::from_secs(2),
            pause_timeout: Duration::from_secs(30),
            max_candidates: 5,
        }
    }
}

/// One completed pause event: what was read, what was injected
#[derive(Debug, Clone)]
pub struct StepReport {
    pub snapshot: Snapshot,
    pub action: Action,
}

/// Owns the session and the board handle for their whole lifetime
pub struct Controller {
    session: GdbSession,
    config: ControlConfig,
    board: Option<BoardHandle>,
    state: LoopState,
    started: bool,
}

impl Controller {
    /// Launch the debugger on `target`; the loop starts `Unattached`.
    pub fn open(
        target: &Path,
        session_config: SessionConfig,
        config: ControlConfig,
    ) -> Result<Self, SessionError> {
        let session = GdbSession::open(target, session_config)?;
        Ok(Self {
            session,
            config,
            board: None,
            state: LoopState::Unattached,
            started: false,
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn board(&self) -> Option<BoardHandle> {
        self.board
    }

    /// Start the target and leave it suspended.
    ///
    /// A live target blocks on input and never prompts, so a prompt timeout
    /// on `run` is the expected outcome; the interrupt then stops it inside
    /// the input routine. A prompt within the bound means the target stopped
    /// on its own (early breakpoint or instant exit), which is fine too.
    fn start_target(&mut self) -> Result<(), ControlError> {
        if self.started {
            return Ok(());
        }
        log::info!("starting target");
        match self
            .session
            .request_with_timeout("run", self.config.start_timeout)
        {
            Ok(output) => {
                log::debug!("run stopped immediately: {}", output.trim_end());
            }
            Err(SessionError::PromptTimeout { .. }) => {
                self.session.interrupt()?;
                self.session.resync()?;
            }
            Err(e) => return Err(e.into()),
        }
        self.started = true;
        Ok(())
    }

    /// Scan-then-validate cycle over the seed-pattern library.
    ///
    /// Stops at the first validated candidate. `Ok(None)` means every
    /// pattern came up empty or unvalidated - a normal outcome when the
    /// board has moved past all seed shapes, not an error; retry after the
    /// target has drawn a fresh tile.
    pub fn locate(&mut self) -> Result<Option<BoardHandle>, ControlError> {
        if self.state != LoopState::Unattached {
            return Err(ControlError::InvalidState {
                needed: "Unattached",
                actual: self.state,
            });
        }
        self.start_target()?;

        for pattern in SEED_PATTERNS {
            let candidates = scanner::search_pattern(
                &mut self.session,
                pattern,
                self.config.scan_low,
                self.config.scan_high,
            )?;
            for candidate in candidates.iter().take(self.config.max_candidates) {
                let window =
                    match scanner::read_window(&mut self.session, candidate.address, BOARD_CELLS) {
                        Ok(window) => window,
                        Err(ScanError::Parse { .. }) => {
                            // unreadable candidate, same as failing validation
                            log::debug!("candidate {:#x}: unreadable", candidate.address);
                            continue;
                        }
                        Err(e) => return Err(e.into()),
                    };
                if validator::validate(&window) {
                    let handle = BoardHandle::new(candidate.address);
                    log::info!(
                        "board located at {:#x} (pattern {:?})",
                        handle.base,
                        candidate.pattern
                    );
                    self.board = Some(handle);
                    self.state = LoopState::Located;
                    return Ok(Some(handle));
                }
                log::debug!("candidate {:#x}: rejected", candidate.address);
            }
        }

        log::warn!("no validated candidate in any seed pattern");
        Ok(None)
    }

    /// Install the pause point on the input routine.
    ///
    /// The target is already suspended inside that routine from the locate
    /// interrupt (an idle target sits in its input read), so the current
    /// suspension doubles as the first pause event.
    pub fn arm(&mut self) -> Result<(), ControlError> {
        if self.state != LoopState::Located {
            return Err(ControlError::InvalidState {
                needed: "Located",
                actual: self.state,
            });
        }
        self.session
            .request(&format!("break {}", self.config.input_symbol))?;
        self.session.request("commands\nsilent\nend")?;
        self.state = LoopState::Armed;
        log::info!("pause point armed on {}", self.config.input_symbol);
        Ok(())
    }

    /// Handle the current pause: read, decide, inject, resume.
    ///
    /// Returns once the target reaches the next pause or exits. Exactly one
    /// snapshot is produced and one decision injected per call, in pause
    /// order; the target is never resumed before both have happened.
    pub fn step(&mut self, policy: &mut dyn Policy) -> Result<StepReport, ControlError> {
        if self.state != LoopState::Armed && self.state != LoopState::Paused {
            return Err(ControlError::InvalidState {
                needed: "Armed or Paused",
                actual: self.state,
            });
        }

        let snapshot = self.snapshot()?;
        let action = policy.choose(&snapshot);
        log::debug!(
            "pause: empty={} max={} -> {:?}",
            snapshot.empty,
            snapshot.max_tile,
            action
        );

        self.session
            .request(&format!("return {}", action.key_code()))?;
        self.resume()?;

        Ok(StepReport { snapshot, action })
    }

    fn resume(&mut self) -> Result<(), ControlError> {
        self.state = LoopState::Armed;
        let output = self
            .session
            .request_with_timeout("continue", self.config.pause_timeout)?;
        if output.contains("exited") {
            log::info!("target exited");
            self.state = LoopState::Terminated;
        } else {
            self.state = LoopState::Paused;
        }
        Ok(())
    }

    /// Drive up to `max_steps` pauses; stops early when the policy gives up
    /// or the target exits. Reports come back in pause order.
    pub fn play(
        &mut self,
        policy: &mut dyn Policy,
        max_steps: usize,
    ) -> Result<Vec<StepReport>, ControlError> {
        let mut reports = Vec::new();
        for _ in 0..max_steps {
            let report = self.step(policy)?;
            let done = report.action == Action::NoMove || self.state == LoopState::Terminated;
            reports.push(report);
            if done {
                break;
            }
        }
        Ok(reports)
    }

    /// Read the board while the target is suspended.
    ///
    /// Retries exactly once on a parse failure: a read can race a mid-update
    /// target. A second failure surfaces.
    pub fn snapshot(&mut self) -> Result<Snapshot, ControlError> {
        let handle = match (self.state, self.board) {
            (LoopState::Terminated, _) | (_, None) => {
                return Err(ControlError::InvalidState {
                    needed: "Located, Armed or Paused",
                    actual: self.state,
                })
            }
            (_, Some(handle)) => handle,
        };
        match board::read_snapshot(&mut self.session, &handle) {
            Err(ScanError::Parse { .. }) => {
                log::warn!("snapshot parse failed, retrying once");
                Ok(board::read_snapshot(&mut self.session, &handle)?)
            }
            other => Ok(other?),
        }
    }

    /// Tear the session down from any state.
    pub fn stop(&mut self) {
        self.session.close();
        self.board = None;
        self.state = LoopState::Terminated;
    }
}
