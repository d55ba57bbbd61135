//! Remote run orchestration.
//!
//! One run: print the timestamp line, push the freshly built artifact to
//! the device, invoke the monitoring wrapper over SSH, classify its exit,
//! and pull the result CSV back. The wrapper owns the thermal wait and the
//! run time budget; this side only passes both through and interprets the
//! exit status.

use std::path::{Path, PathBuf};

use crate::config::{SweepConfig, TargetConfig};
use crate::error::SweepError;
use crate::exec::CommandRunner;
use crate::grid::GridPoint;
use crate::journal;
use crate::remote::{remote_join, Mirror, RemoteShell};

/// sysexits EX_TEMPFAIL: the wrapper's exit when the thermal precondition
/// is not reached within the wait budget.
pub const EX_TEMPFAIL: i32 = 75;

/// Result CSV name for one point: `<artifact>-<global>-<local>.csv`.
pub fn result_file_name(artifact: &str, point: GridPoint) -> String {
    format!("{}-{}.csv", artifact, point.suffix())
}

/// Quote a string for a remote POSIX shell. Plain words pass through
/// unchanged so commands stay readable in logs.
fn sh_quote(s: &str) -> String {
    let plain = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./=@:".contains(c));
    if plain {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', "'\\''"))
    }
}

// ---------------------------------------------------------------------------
// Wrapper command
// ---------------------------------------------------------------------------

/// The full monitoring-wrapper invocation for one grid point, as one remote
/// shell command.
pub fn wrapper_command(config: &SweepConfig, target: &TargetConfig, point: GridPoint) -> String {
    let thermal = &config.thermal;
    let artifact = target.artifact();
    let workspace = &config.device.workspace;

    let mut cmd = String::new();
    if !workspace.is_empty() && workspace != "." {
        cmd.push_str(&format!("cd {} && ", sh_quote(workspace)));
    }
    cmd.push_str(&sh_quote(&thermal.monitor_cmd));
    cmd.push_str(&format!(" --sensors={}", sh_quote(&thermal.sensors_file)));
    cmd.push_str(&format!(" --output={}", result_file_name(artifact, point)));
    cmd.push_str(&format!(" --time={}", target.run_timeout_s));
    cmd.push_str(&format!(" --column={}", sh_quote(&thermal.progress_column)));
    cmd.push_str(&format!(" --wait={}", thermal.wait_temp_c));
    cmd.push_str(&format!(" --wait-timeout={}", thermal.wait_timeout_s));
    if let Some(ref fan_cmd) = thermal.fan_cmd {
        cmd.push_str(&format!(" {}", sh_quote(&format!("--fan-cmd={}", fan_cmd))));
        if thermal.fan_on {
            cmd.push_str(" --fan-on");
        }
    }
    cmd.push_str(&format!(" -- ./{}", artifact));
    cmd
}

// ---------------------------------------------------------------------------
// RunOrchestrator
// ---------------------------------------------------------------------------

/// Deploys artifacts to the device and drives monitored runs.
pub struct RunOrchestrator<'a> {
    config: &'a SweepConfig,
    runner: &'a dyn CommandRunner,
}

impl<'a> RunOrchestrator<'a> {
    pub fn new(config: &'a SweepConfig, runner: &'a dyn CommandRunner) -> Self {
        RunOrchestrator { config, runner }
    }

    /// Run one grid point. On success the result CSV exists under the local
    /// results directory and its path is returned.
    pub fn run(
        &self,
        target: &TargetConfig,
        artifact_path: &Path,
        point: GridPoint,
    ) -> Result<PathBuf, SweepError> {
        let device = &self.config.device;
        let artifact = target.artifact();

        if !artifact_path.exists() {
            return Err(SweepError::Run {
                point: point.to_string(),
                detail: format!(
                    "artifact {} not found (build it first)",
                    artifact_path.display()
                ),
            });
        }

        // Timestamp line for correlating terminal history with the journal.
        println!("@@@@ {}", journal::now_stamp());

        let mirror = Mirror::new(device, self.runner);
        mirror.push_file(
            &artifact_path.to_string_lossy(),
            &remote_join(&device.workspace, artifact),
        )?;

        let shell = RemoteShell::new(device, self.runner);
        let command = wrapper_command(self.config, target, point);
        let output = shell.run("monitored run", &command)?;
        match output.status {
            0 => {}
            EX_TEMPFAIL => {
                return Err(SweepError::ThermalWait {
                    point: point.to_string(),
                    detail: output.failure_detail(),
                })
            }
            _ => {
                return Err(SweepError::Run {
                    point: point.to_string(),
                    detail: output.failure_detail(),
                })
            }
        }

        std::fs::create_dir_all(&self.config.results_dir)?;
        let result_name = result_file_name(artifact, point);
        let local = Path::new(&self.config.results_dir).join(&result_name);
        mirror.pull_file(
            &remote_join(&device.workspace, &result_name),
            &local.to_string_lossy(),
        )?;
        if !local.exists() {
            return Err(SweepError::Run {
                point: point.to_string(),
                detail: format!("result file {} missing after pull", local.display()),
            });
        }
        Ok(local)
    }
}
