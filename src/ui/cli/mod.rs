//! CLI - reedline-based REPL interface
//!
//! Interactive driver for the control loop: command history, a prompt that
//! tracks loop state, colored status output.

use anyhow::Result;
use colored::Colorize;
use reedline::{
    Prompt, PromptHistorySearch, PromptHistorySearchStatus, Reedline, Signal,
};
use std::borrow::Cow;

use crate::app::{parse_command, App};

/// Prompt showing where the control loop stands
pub struct GambitPrompt {
    /// Loop state label (`---` before a session opens)
    state: String,
    /// Confirmed board address, once located
    board: Option<u64>,
}

impl GambitPrompt {
    fn from_app(app: &App) -> Self {
        Self {
            state: app.state_label().to_string(),
            board: app.board_base(),
        }
    }
}

impl Prompt for GambitPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        match self.board {
            Some(base) => Cow::Owned(format!("[{}:{:#x}]", self.state, base)),
            None => Cow::Owned(format!("[{}]", self.state)),
        }
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _prompt_mode: reedline::PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("> ")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("... ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "(failed) ",
        };
        Cow::Owned(format!("(search: {}{}) ", prefix, history_search.term))
    }
}

/// Run the CLI REPL
pub fn run_cli(app: &mut App) -> Result<()> {
    let mut line_editor = Reedline::create();

    println!(
        "{}",
        "╔══════════════════════════════════════════════════════════════╗".cyan()
    );
    println!(
        "{}",
        "║  Gambit - Type '?' for help, 'q' to quit                     ║".cyan()
    );
    println!(
        "{}",
        "╚══════════════════════════════════════════════════════════════╝".cyan()
    );

    loop {
        let prompt = GambitPrompt::from_app(app);
        let sig = line_editor.read_line(&prompt)?;
        match sig {
            Signal::Success(buffer) => {
                let input = buffer.trim();
                if input.is_empty() {
                    continue;
                }

                match app.execute(parse_command(input)) {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => println!("{} {e:#}", "[!]".red()),
                }
            }
            Signal::CtrlD | Signal::CtrlC => {
                println!("\n[*] Interrupted");
                app.shutdown();
                break;
            }
        }
    }

    Ok(())
}
