//! Gambit - GDB-mediated game introspection and control
//!
//! Entry point that handles CLI argument parsing and mode switching
//! between the interactive REPL and one-shot auto mode.

use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;

use gambit::app::{App, AppCommand};
use gambit::core::controller::ControlConfig;
use gambit::core::session::SessionConfig;
use gambit::ui::cli::run_cli;

/// Gambit: play a running game from outside, through its debugger
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Target game binary to control
    #[arg(short, long)]
    target: Option<PathBuf>,

    /// Debugger executable
    #[arg(long, default_value = "gdb")]
    gdb: String,

    /// Function whose return value carries one keypress
    #[arg(long, default_value = "wgetch")]
    input_symbol: String,

    /// Append the raw debugger conversation to this file
    #[arg(long)]
    transcript: Option<PathBuf>,

    /// Locate, arm and play in one shot instead of the REPL
    #[arg(long, default_value_t = false)]
    auto: bool,

    /// Move budget for auto mode
    #[arg(long, default_value_t = 500)]
    moves: usize,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    // 1. Parse command line arguments
    let args = Args::parse();

    // 2. Initialize logger with verbosity level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(
        match args.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        },
    ))
    .init();

    log::debug!("target: {:?}", args.target);
    log::debug!("debugger: {}", args.gdb);

    let session_config = SessionConfig {
        program: args.gdb,
        transcript: args.transcript,
        ..Default::default()
    };
    let control_config = ControlConfig {
        input_symbol: args.input_symbol,
        ..Default::default()
    };
    let mut app = App::new(args.target, session_config, control_config);

    // 3. Branch based on execution mode
    if args.auto {
        println!("[*] gambit v{} - auto mode", env!("CARGO_PKG_VERSION"));
        run_auto(&mut app, args.moves)
    } else {
        println!("[*] gambit v{} - interactive mode", env!("CARGO_PKG_VERSION"));
        run_cli(&mut app)
    }
}

/// One-shot open -> locate -> arm -> play sequence.
fn run_auto(app: &mut App, moves: usize) -> anyhow::Result<()> {
    let outcome: anyhow::Result<()> = (|| {
        app.execute(AppCommand::Open(None))?;
        app.execute(AppCommand::Locate)?;
        if app.board_base().is_none() {
            bail!("board not located; start a fresh game and retry");
        }
        app.execute(AppCommand::Arm)?;
        app.execute(AppCommand::Play(moves))?;
        Ok(())
    })();
    app.shutdown();
    outcome
}
