//! File transfer via rsync.
//!
//! Builds rsync argument vectors and executes them through the runner seam.
//! The project tree is pushed as a full mirror (`--delete`: local deletions
//! propagate, attributes are preserved, re-running is idempotent); artifacts
//! and result files move as single-file copies.

use crate::error::SweepError;
use crate::exec::CommandRunner;

use super::host::HostConfig;

/// Ensure a directory path ends with a slash so rsync copies its contents
/// rather than the directory itself.
fn ensure_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

// ---------------------------------------------------------------------------
// Argument builders
// ---------------------------------------------------------------------------

/// rsync arguments for mirroring a local directory onto the host.
pub fn mirror_push_args(
    host: &HostConfig,
    local_dir: &str,
    remote_dir: &str,
    excludes: &[String],
) -> Vec<String> {
    let mut args = vec!["-av".to_string(), "--delete".to_string()];
    args.push("-e".to_string());
    args.push(host.rsync_transport());
    for pattern in excludes {
        args.push("--exclude".to_string());
        args.push(pattern.clone());
    }
    args.push(ensure_trailing_slash(local_dir));
    args.push(host.remote_spec(remote_dir));
    args
}

/// rsync arguments for copying one local file onto the host.
pub fn push_file_args(host: &HostConfig, local_path: &str, remote_path: &str) -> Vec<String> {
    vec![
        "-av".to_string(),
        "-e".to_string(),
        host.rsync_transport(),
        local_path.to_string(),
        host.remote_spec(remote_path),
    ]
}

/// rsync arguments for copying one remote file to a local path.
pub fn pull_file_args(host: &HostConfig, remote_path: &str, local_path: &str) -> Vec<String> {
    vec![
        "-av".to_string(),
        "-e".to_string(),
        host.rsync_transport(),
        host.remote_spec(remote_path),
        local_path.to_string(),
    ]
}

// ---------------------------------------------------------------------------
// Mirror
// ---------------------------------------------------------------------------

/// rsync operations against one host, run through the command runner.
pub struct Mirror<'a> {
    host: &'a HostConfig,
    runner: &'a dyn CommandRunner,
}

impl<'a> Mirror<'a> {
    pub fn new(host: &'a HostConfig, runner: &'a dyn CommandRunner) -> Self {
        Mirror { host, runner }
    }

    fn execute(&self, op: &str, rsync_args: Vec<String>) -> Result<(), SweepError> {
        let (program, args) = self.host.rsync_invocation(rsync_args);
        let output = self
            .runner
            .run(&program, &args)
            .map_err(|detail| SweepError::Transport {
                host: self.host.name.clone(),
                op: op.to_string(),
                detail,
            })?;
        if !output.success() {
            return Err(SweepError::Transport {
                host: self.host.name.clone(),
                op: op.to_string(),
                detail: output.failure_detail(),
            });
        }
        Ok(())
    }

    /// Mirror a local directory onto the host (`--delete` semantics).
    pub fn push_tree(
        &self,
        local_dir: &str,
        remote_dir: &str,
        excludes: &[String],
    ) -> Result<(), SweepError> {
        self.execute(
            "rsync push",
            mirror_push_args(self.host, local_dir, remote_dir, excludes),
        )
    }

    /// Copy one local file onto the host.
    pub fn push_file(&self, local_path: &str, remote_path: &str) -> Result<(), SweepError> {
        self.execute(
            "rsync push",
            push_file_args(self.host, local_path, remote_path),
        )
    }

    /// Copy one remote file to a local path.
    pub fn pull_file(&self, remote_path: &str, local_path: &str) -> Result<(), SweepError> {
        self.execute(
            "rsync pull",
            pull_file_args(self.host, remote_path, local_path),
        )
    }
}
