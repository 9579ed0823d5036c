//! Command processing
//!
//! Shared command definitions used by both the REPL and auto mode.

/// Application commands that can be executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Open a debugger session on the target binary
    Open(Option<String>),
    /// Scan memory for the board and validate it
    Locate,
    /// Show the current board
    ShowBoard,
    /// Install the pause point on the input routine
    Arm,
    /// Drive N pause events (default 1)
    Step(usize),
    /// Let the policy play up to N moves
    Play(usize),
    /// Tear the session down
    Stop,
    /// Show help
    Help,
    /// Quit application
    Quit,
    /// Unknown command
    Unknown(String),
}

/// Default move budget for a bare `play`
pub const DEFAULT_PLAY_MOVES: usize = 500;

/// Parse a command string into AppCommand
pub fn parse_command(input: &str) -> AppCommand {
    let input = input.trim();
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts.first().unwrap_or(&"");
    let arg = parts.get(1).map(|s| s.trim());

    match *cmd {
        "open" | "o" => AppCommand::Open(arg.map(|s| s.to_string())),
        "locate" | "find" => AppCommand::Locate,
        "board" | "show" | "b" => AppCommand::ShowBoard,
        "arm" => AppCommand::Arm,
        "step" | "s" => match arg {
            None => AppCommand::Step(1),
            Some(n) => match n.parse() {
                Ok(n) => AppCommand::Step(n),
                Err(_) => AppCommand::Unknown(input.to_string()),
            },
        },
        "play" | "p" => match arg {
            None => AppCommand::Play(DEFAULT_PLAY_MOVES),
            Some(n) => match n.parse() {
                Ok(n) => AppCommand::Play(n),
                Err(_) => AppCommand::Unknown(input.to_string()),
            },
        },
        "stop" => AppCommand::Stop,
        "help" | "?" => AppCommand::Help,
        "quit" | "exit" | "q" => AppCommand::Quit,
        _ => AppCommand::Unknown(input.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lifecycle_commands() {
        assert_eq!(parse_command("locate"), AppCommand::Locate);
        assert_eq!(parse_command("arm"), AppCommand::Arm);
        assert_eq!(parse_command("stop"), AppCommand::Stop);
        assert_eq!(parse_command("  board  "), AppCommand::ShowBoard);
    }

    #[test]
    fn open_takes_an_optional_path() {
        assert_eq!(parse_command("open"), AppCommand::Open(None));
        assert_eq!(
            parse_command("open /usr/local/bin/2048"),
            AppCommand::Open(Some("/usr/local/bin/2048".into()))
        );
    }

    #[test]
    fn step_and_play_take_counts() {
        assert_eq!(parse_command("step"), AppCommand::Step(1));
        assert_eq!(parse_command("step 12"), AppCommand::Step(12));
        assert_eq!(parse_command("play"), AppCommand::Play(DEFAULT_PLAY_MOVES));
        assert_eq!(parse_command("p 30"), AppCommand::Play(30));
        assert!(matches!(parse_command("step four"), AppCommand::Unknown(_)));
    }

    #[test]
    fn unknown_input_is_preserved() {
        assert_eq!(
            parse_command("frobnicate now"),
            AppCommand::Unknown("frobnicate now".into())
        );
    }
}
