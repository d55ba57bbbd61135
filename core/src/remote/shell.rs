//! Structured remote command execution.
//!
//! `RemoteShell` runs one command per SSH invocation and hands back the
//! captured `CommandOutput`. There is no interactive session and no prompt
//! matching: every remote step is its own child process whose exit status
//! the caller inspects.
//!
//! SSH reserves exit 255 for its own failures (connection refused, auth,
//! DNS), so a 255 here is classified as a transport error rather than a
//! remote command failure.

use crate::error::SweepError;
use crate::exec::{CommandOutput, CommandRunner};

use super::host::HostConfig;

/// Exit status ssh uses for its own errors.
pub const SSH_TRANSPORT_EXIT: i32 = 255;

// ---------------------------------------------------------------------------
// RemoteShell
// ---------------------------------------------------------------------------

/// One host plus the runner to reach it with.
pub struct RemoteShell<'a> {
    host: &'a HostConfig,
    runner: &'a dyn CommandRunner,
}

impl<'a> RemoteShell<'a> {
    pub fn new(host: &'a HostConfig, runner: &'a dyn CommandRunner) -> Self {
        RemoteShell { host, runner }
    }

    /// Run one remote command and return its captured output.
    ///
    /// Spawn failures and ssh transport errors (exit 255) come back as
    /// `SweepError::Transport` tagged with `op`; any other exit status is
    /// returned for the caller to interpret.
    pub fn run(&self, op: &str, command: &str) -> Result<CommandOutput, SweepError> {
        let (program, args) = self.host.ssh_invocation(command);
        let output =
            self.runner
                .run(&program, &args)
                .map_err(|detail| SweepError::Transport {
                    host: self.host.name.clone(),
                    op: op.to_string(),
                    detail,
                })?;
        if output.status == SSH_TRANSPORT_EXIT {
            return Err(SweepError::Transport {
                host: self.host.name.clone(),
                op: op.to_string(),
                detail: output.failure_detail(),
            });
        }
        Ok(output)
    }
}
