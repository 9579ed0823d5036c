//! Debugger session - GDB subprocess ownership and prompt-framed I/O
//!
//! All interaction with the debugger goes through one `GdbSession`: a command
//! line goes in, everything up to the next prompt sentinel comes back. The
//! subprocess pipes are drained by background reader threads so a full pipe
//! buffer can never deadlock the control thread; decoded lines are handed
//! over an ordered channel so command/response pairing is preserved.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

/// Session-level errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("failed to launch `{program}`: {reason}")]
    Launch { program: String, reason: String },

    #[error("no `{prompt}` within {timeout_ms} ms after `{command}`")]
    PromptTimeout {
        command: String,
        prompt: String,
        timeout_ms: u64,
    },

    #[error("session closed")]
    Closed,

    #[error("debugger i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to interrupt target: {0}")]
    Interrupt(String),
}

/// How to launch and talk to the debugger
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Debugger executable
    pub program: String,
    /// Literal string the debugger prints when ready for the next command
    pub prompt: String,
    /// Upper bound on waiting for the prompt after a command
    pub request_timeout: Duration,
    /// Append the raw conversation to this file
    pub transcript: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            program: "gdb".into(),
            prompt: "(gdb) ".into(),
            request_timeout: Duration::from_secs(5),
            transcript: None,
        }
    }
}

/// Output token handed from a reader thread to the control thread
#[derive(Debug, PartialEq, Eq)]
enum Token {
    Line(String),
    Prompt,
}

/// Splits a raw byte stream into lines and prompt sightings.
///
/// The sentinel is only recognized when the bytes accumulated since the last
/// line boundary are exactly the sentinel text. GDB prints its prompt at the
/// start of a line with no trailing newline; sentinel-shaped text embedded in
/// program output stays part of its surrounding line.
struct TokenScanner {
    prompt: Vec<u8>,
    line: Vec<u8>,
}

impl TokenScanner {
    fn new(prompt: &str) -> Self {
        Self {
            prompt: prompt.as_bytes().to_vec(),
            line: Vec::new(),
        }
    }

    /// Scanner that never emits `Prompt` (used for stderr).
    fn lines_only() -> Self {
        Self {
            prompt: Vec::new(),
            line: Vec::new(),
        }
    }

    fn feed(&mut self, byte: u8) -> Option<Token> {
        if byte == b'\n' {
            let text = String::from_utf8_lossy(&self.line).into_owned();
            self.line.clear();
            return Some(Token::Line(text));
        }
        self.line.push(byte);
        if !self.prompt.is_empty() && self.line == self.prompt {
            self.line.clear();
            return Some(Token::Prompt);
        }
        None
    }

    /// Unterminated tail, emitted when the stream ends mid-line.
    fn take_tail(&mut self) -> Option<Token> {
        if self.line.is_empty() {
            return None;
        }
        let text = String::from_utf8_lossy(&self.line).into_owned();
        self.line.clear();
        Some(Token::Line(text))
    }
}

fn spawn_reader<R: Read + Send + 'static>(stream: R, tx: Sender<Token>, prompt: Option<String>) {
    thread::spawn(move || {
        let mut scanner = match prompt {
            Some(p) => TokenScanner::new(&p),
            None => TokenScanner::lines_only(),
        };
        let mut stream = stream;
        let mut buf = [0u8; 4096];
        loop {
            match stream.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    for &byte in &buf[..n] {
                        if let Some(token) = scanner.feed(byte) {
                            if tx.send(token).is_err() {
                                return;
                            }
                        }
                    }
                }
            }
        }
        if let Some(token) = scanner.take_tail() {
            let _ = tx.send(token);
        }
    });
}

/// A live debugger subprocess and its prompt-framed command channel.
///
/// Exclusively owned by whoever drives the control loop; no other component
/// may write to the subprocess or read its output directly.
pub struct GdbSession {
    child: Child,
    stdin: ChildStdin,
    tokens: Receiver<Token>,
    transcript: Option<File>,
    config: SessionConfig,
    closed: bool,
}

impl GdbSession {
    /// Launch the debugger attached to `target` and wait for the first prompt.
    pub fn open(target: &Path, config: SessionConfig) -> Result<Self, SessionError> {
        log::info!("launching {} for {}", config.program, target.display());

        let mut child = Command::new(&config.program)
            .arg("-q")
            .arg("-nx")
            .arg(target)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SessionError::Launch {
                program: config.program.clone(),
                reason: e.to_string(),
            })?;

        let stdin = child.stdin.take().ok_or_else(|| SessionError::Launch {
            program: config.program.clone(),
            reason: "stdin pipe unavailable".into(),
        })?;
        let stdout = child.stdout.take().ok_or_else(|| SessionError::Launch {
            program: config.program.clone(),
            reason: "stdout pipe unavailable".into(),
        })?;
        let stderr = child.stderr.take().ok_or_else(|| SessionError::Launch {
            program: config.program.clone(),
            reason: "stderr pipe unavailable".into(),
        })?;

        let (tx, tokens) = mpsc::channel();
        spawn_reader(stdout, tx.clone(), Some(config.prompt.clone()));
        // stderr lines join the same ordered stream but can never frame a prompt
        spawn_reader(stderr, tx, None);

        let transcript = match &config.transcript {
            Some(path) => {
                if let Some(dir) = path.parent() {
                    fs::create_dir_all(dir)?;
                }
                Some(OpenOptions::new().create(true).append(true).open(path)?)
            }
            None => None,
        };

        let mut session = Self {
            child,
            stdin,
            tokens,
            transcript,
            config,
            closed: false,
        };

        session.resync()?;
        for command in ["set pagination off", "set confirm off", "set height 0"] {
            session.request(command)?;
        }

        Ok(session)
    }

    /// Send one command and collect output until the prompt sentinel.
    ///
    /// `command` may contain embedded newlines for GDB command-list blocks
    /// (`commands` .. `end`), which produce a single prompt after the block.
    pub fn request(&mut self, command: &str) -> Result<String, SessionError> {
        self.request_with_timeout(command, self.config.request_timeout)
    }

    /// `request` with an explicit per-call bound, for commands that resume
    /// the target and only prompt again at the next stop.
    pub fn request_with_timeout(
        &mut self,
        command: &str,
        timeout: Duration,
    ) -> Result<String, SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        self.log_transcript(&format!(">>> {command}\n"));
        writeln!(self.stdin, "{command}")?;
        self.stdin.flush()?;
        self.collect(command, timeout)
    }

    /// Read until the next prompt without sending anything.
    ///
    /// Used for the initial banner and to resynchronize after `interrupt`.
    pub fn resync(&mut self) -> Result<String, SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        self.collect("<resync>", self.config.request_timeout)
    }

    fn collect(&mut self, command: &str, timeout: Duration) -> Result<String, SessionError> {
        let deadline = Instant::now() + timeout;
        let mut output = String::new();
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.tokens.recv_timeout(remaining) {
                Ok(Token::Line(line)) => {
                    output.push_str(&line);
                    output.push('\n');
                }
                Ok(Token::Prompt) => {
                    self.log_transcript(&output);
                    return Ok(output);
                }
                Err(RecvTimeoutError::Timeout) => {
                    self.log_transcript(&output);
                    return Err(SessionError::PromptTimeout {
                        command: command.to_string(),
                        prompt: self.config.prompt.clone(),
                        timeout_ms: timeout.as_millis() as u64,
                    });
                }
                Err(RecvTimeoutError::Disconnected) => return Err(SessionError::Closed),
            }
        }
    }

    /// Deliver SIGINT to the debugger, stopping a running target.
    ///
    /// Does not wait for the prompt: the caller must `resync` before the next
    /// `request`.
    pub fn interrupt(&mut self) -> Result<(), SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        log::debug!("interrupting target (SIGINT to pid {})", self.child.id());
        self.log_transcript(">>> <SIGINT>\n");

        #[cfg(unix)]
        {
            use nix::sys::signal::{self, Signal};
            use nix::unistd::Pid;

            signal::kill(Pid::from_raw(self.child.id() as i32), Signal::SIGINT)
                .map_err(|e| SessionError::Interrupt(e.to_string()))
        }

        #[cfg(not(unix))]
        {
            Err(SessionError::Interrupt(
                "no signal delivery on this platform".into(),
            ))
        }
    }

    /// Kill and reap the subprocess. Idempotent; later requests fail with
    /// `Closed` instead of hanging.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        log::info!("closing debugger session");
        let _ = self.child.kill();
        let _ = self.child.wait();
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn log_transcript(&mut self, text: &str) {
        if let Some(file) = &mut self.transcript {
            let _ = file.write_all(text.as_bytes());
        }
    }
}

impl Drop for GdbSession {
    fn drop(&mut self) {
        self.close();
    }
}
