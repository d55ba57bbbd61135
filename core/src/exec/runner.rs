//! Command runner abstraction for spawning external processes.
//!
//! `CommandRunner` is the trait the orchestrators use to execute commands.
//! `ShellRunner` is the production implementation that spawns the program
//! directly with an argument vector. `MockRunner` is the test double that
//! records calls and replays preset responses.
//!
//! Programs are spawned without an intermediate shell, so arguments that
//! contain spaces (passwords, the fan command) never need local quoting.
//! A non-zero exit is not an `Err`: callers get the full `CommandOutput`
//! and decide what each status means. `Err` is reserved for commands that
//! could not be spawned at all.

use std::cell::RefCell;
use std::process::Command;

// ---------------------------------------------------------------------------
// CommandOutput
// ---------------------------------------------------------------------------

/// Captured result of one child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit status; -1 when the process was killed by a signal.
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// A successful output with the given stdout.
    pub fn ok(stdout: &str) -> Self {
        CommandOutput {
            status: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    /// A non-zero exit with the given stderr.
    pub fn exit(status: i32, stderr: &str) -> Self {
        CommandOutput {
            status,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// One-line failure description: the exit status plus the tail of stderr.
    pub fn failure_detail(&self) -> String {
        let err = self.stderr.trim();
        if err.is_empty() {
            return format!("exit status {}", self.status);
        }
        let mut tail: Vec<&str> = err.lines().rev().take(3).collect();
        tail.reverse();
        format!("exit status {}: {}", self.status, tail.join("; "))
    }
}

// ---------------------------------------------------------------------------
// CommandRunner
// ---------------------------------------------------------------------------

/// Trait for executing external programs with an argument vector.
pub trait CommandRunner: Send {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, String>;
}

/// Production runner that spawns the program and captures its output.
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, String> {
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| format!("failed to execute {}: {}", program, e))?;
        Ok(CommandOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// MockRunner
// ---------------------------------------------------------------------------

/// Test-double runner that records command lines and returns pre-configured
/// responses. When the response queue runs dry it returns success, so happy
/// paths need no scripting.
pub struct MockRunner {
    responses: RefCell<Vec<Result<CommandOutput, String>>>,
    commands: RefCell<Vec<String>>,
}

unsafe impl Send for MockRunner {}

impl MockRunner {
    pub fn new() -> Self {
        MockRunner {
            responses: RefCell::new(Vec::new()),
            commands: RefCell::new(Vec::new()),
        }
    }

    pub fn with_responses(responses: Vec<Result<CommandOutput, String>>) -> Self {
        let mut reversed = responses;
        reversed.reverse();
        MockRunner {
            responses: RefCell::new(reversed),
            commands: RefCell::new(Vec::new()),
        }
    }

    /// The full command lines executed so far, program first.
    pub fn executed_commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, String> {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.commands.borrow_mut().push(line);
        let mut responses = self.responses.borrow_mut();
        if let Some(response) = responses.pop() {
            response
        } else {
            Ok(CommandOutput::ok(""))
        }
    }
}
