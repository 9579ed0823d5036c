//! Shared application state
//!
//! `App` owns the controller and the policy, dispatches parsed commands
//! against them, and renders results. The REPL and auto mode both drive the
//! loop exclusively through `execute`.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use colored::Colorize;

use crate::core::controller::{ControlConfig, Controller, LoopState, StepReport};
use crate::core::session::SessionConfig;
use crate::policy::{Action, GreedyPolicy, Policy};
use crate::ui::display;

use super::commands::AppCommand;

pub struct App {
    session_config: SessionConfig,
    control_config: ControlConfig,
    /// Target binary; `open` without an argument falls back to this
    target: Option<PathBuf>,
    controller: Option<Controller>,
    policy: Box<dyn Policy>,
}

impl App {
    pub fn new(
        target: Option<PathBuf>,
        session_config: SessionConfig,
        control_config: ControlConfig,
    ) -> Self {
        Self {
            session_config,
            control_config,
            target,
            controller: None,
            policy: Box::new(GreedyPolicy::new()),
        }
    }

    /// Loop state label for the prompt
    pub fn state_label(&self) -> &'static str {
        match self.controller.as_ref().map(Controller::state) {
            None => "---",
            Some(LoopState::Unattached) => "unattached",
            Some(LoopState::Located) => "located",
            Some(LoopState::Armed) => "armed",
            Some(LoopState::Paused) => "paused",
            Some(LoopState::Terminated) => "terminated",
        }
    }

    pub fn board_base(&self) -> Option<u64> {
        self.controller.as_ref().and_then(|c| c.board()).map(|b| b.base)
    }

    /// Tear down the session if one is open. Safe to call twice.
    pub fn shutdown(&mut self) {
        if let Some(mut controller) = self.controller.take() {
            controller.stop();
            println!("[*] session closed");
        }
    }

    /// Execute one command. `Ok(false)` means quit; errors are the caller's
    /// to render so auto mode can abort where the REPL keeps going.
    pub fn execute(&mut self, command: AppCommand) -> Result<bool> {
        match command {
            AppCommand::Open(path) => self.open(path)?,
            AppCommand::Locate => self.locate()?,
            AppCommand::ShowBoard => self.show_board()?,
            AppCommand::Arm => self.arm()?,
            AppCommand::Step(n) => self.step(n)?,
            AppCommand::Play(n) => self.play(n)?,
            AppCommand::Stop => self.shutdown(),
            AppCommand::Help => print_help(),
            AppCommand::Quit => {
                self.shutdown();
                println!("[*] Shutting down...");
                return Ok(false);
            }
            AppCommand::Unknown(input) => {
                println!("{} Unknown command: '{}'", "[!]".red(), input);
                println!("    Type '?' for help");
            }
        }
        Ok(true)
    }

    fn controller(&mut self) -> Result<&mut Controller> {
        self.controller
            .as_mut()
            .context("no open session; use `open <path>`")
    }

    fn open(&mut self, path: Option<String>) -> Result<()> {
        if self.controller.is_some() {
            bail!("session already open; `stop` it first");
        }
        let target = path
            .map(PathBuf::from)
            .or_else(|| self.target.clone())
            .context("no target binary; `open <path>` or pass --target")?;

        let controller = Controller::open(
            &target,
            self.session_config.clone(),
            self.control_config.clone(),
        )?;
        println!("[*] session open on {}", target.display());
        self.target = Some(target);
        self.controller = Some(controller);
        Ok(())
    }

    fn locate(&mut self) -> Result<()> {
        println!("[*] scanning for the board...");
        match self.controller()?.locate()? {
            Some(handle) => {
                println!("[*] board located at {:#x}", handle.base);
                self.show_board()
            }
            None => {
                println!(
                    "{} board not located; let the game draw a tile and retry",
                    "[!]".red()
                );
                Ok(())
            }
        }
    }

    fn show_board(&mut self) -> Result<()> {
        let snapshot = self.controller()?.snapshot()?;
        print!("{}", display::render_board(&snapshot));
        println!(
            "    empty: {}  max tile: {}",
            snapshot.empty, snapshot.max_tile
        );
        Ok(())
    }

    fn arm(&mut self) -> Result<()> {
        let symbol = self.control_config.input_symbol.clone();
        self.controller()?.arm()?;
        println!("[*] pause point armed on {}", symbol.green());
        Ok(())
    }

    fn step(&mut self, count: usize) -> Result<()> {
        for _ in 0..count {
            let controller = self
                .controller
                .as_mut()
                .context("no open session; use `open <path>`")?;
            let report = controller.step(self.policy.as_mut())?;
            render_report(&report);
            if report.action == Action::NoMove {
                println!("{} no legal move left", "[!]".red());
                break;
            }
            if controller.state() == LoopState::Terminated {
                println!("[*] target exited");
                break;
            }
        }
        Ok(())
    }

    fn play(&mut self, moves: usize) -> Result<()> {
        println!("[*] playing up to {} moves...", moves);
        let controller = self.controller.as_mut().context("no open session")?;
        let reports = controller.play(self.policy.as_mut(), moves)?;
        for report in &reports {
            render_report(report);
        }
        let best = reports.iter().map(|r| r.snapshot.max_tile).max().unwrap_or(0);
        println!("[*] played {} move(s), best tile {}", reports.len(), best);
        if controller.state() == LoopState::Terminated {
            println!("[*] target exited");
        }
        Ok(())
    }
}

fn render_report(report: &StepReport) {
    print!("{}", display::render_board(&report.snapshot));
    println!("    -> {:?}", report.action);
}

fn print_help() {
    println!("{}", "Gambit Commands".bold().cyan());
    println!("{}", "═".repeat(50).cyan());

    println!("\n{}", "Session:".bold().yellow());
    println!("  {}    Launch GDB on the target", "open <path>".green());
    println!("  {}           Kill the session", "stop".green());

    println!("\n{}", "Board:".bold().yellow());
    println!("  {}         Scan memory for the board", "locate".green());
    println!("  {}          Show the current board", "board".green());

    println!("\n{}", "Control:".bold().yellow());
    println!("  {}            Arm the input breakpoint", "arm".green());
    println!("  {}       Drive N pauses (default 1)", "step [n]".green());
    println!("  {}       Auto-play up to N moves", "play [n]".green());

    println!("\n{}", "Other:".bold().yellow());
    println!("  {}              Show this help", "?".green());
    println!("  {}              Quit", "q".green());
}
