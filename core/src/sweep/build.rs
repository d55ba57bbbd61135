//! Remote build orchestration.
//!
//! Each grid point gets a full rebuild on the build host: remove the stale
//! remote copy, mirror the project tree over, `make clean`, source the
//! environment script, build with the point's variables as `NAME=value`
//! make arguments, and pull the artifact back. Every step's exit status is
//! checked; a failing step stops the sequence with the step name and the
//! captured stderr.

use std::path::{Path, PathBuf};

use crate::config::{SweepConfig, TargetConfig};
use crate::error::SweepError;
use crate::exec::CommandRunner;
use crate::grid::GridPoint;
use crate::remote::{remote_join, Mirror, RemoteShell};

// ---------------------------------------------------------------------------
// BuildSpec
// ---------------------------------------------------------------------------

/// The build variables for one grid point, in the order they reach make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSpec {
    /// Binary the build produces.
    pub artifact: String,
    /// `(name, value)` pairs: the work-group sizes first, then the target's
    /// fixed variables in name order.
    pub vars: Vec<(String, String)>,
}

impl BuildSpec {
    pub fn for_point(target: &TargetConfig, point: GridPoint) -> Self {
        let mut vars = vec![
            ("GLOBAL_WS".to_string(), point.global_ws.to_string()),
            ("LOCAL_WS".to_string(), point.local_ws.to_string()),
        ];
        for (name, value) in &target.build_vars {
            if name != "GLOBAL_WS" && name != "LOCAL_WS" {
                vars.push((name.clone(), value.clone()));
            }
        }
        BuildSpec {
            artifact: target.artifact().to_string(),
            vars,
        }
    }

    /// The `NAME=value` arguments passed to make.
    pub fn make_args(&self) -> String {
        self.vars
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ---------------------------------------------------------------------------
// BuildOrchestrator
// ---------------------------------------------------------------------------

/// Drives the fixed build sequence against the configured build host.
pub struct BuildOrchestrator<'a> {
    config: &'a SweepConfig,
    runner: &'a dyn CommandRunner,
}

impl<'a> BuildOrchestrator<'a> {
    pub fn new(config: &'a SweepConfig, runner: &'a dyn CommandRunner) -> Self {
        BuildOrchestrator { config, runner }
    }

    /// Run the full remote build for one spec. On success the artifact
    /// exists under the local artifacts directory and its path is returned.
    pub fn build(&self, spec: &BuildSpec) -> Result<PathBuf, SweepError> {
        let host = &self.config.build_host;
        let shell = RemoteShell::new(host, self.runner);
        let mirror = Mirror::new(host, self.runner);
        let workspace = &host.workspace;

        self.checked(
            &shell,
            spec,
            "remove stale copy",
            &format!("rm -rf {}", workspace),
        )?;

        mirror.push_tree(
            &self.config.project_dir,
            workspace,
            &self.config.mirror_excludes(),
        )?;

        self.checked(
            &shell,
            spec,
            "clean",
            &format!("cd {} && make clean", workspace),
        )?;

        self.checked(
            &shell,
            spec,
            "environment setup",
            &format!("cd {} && . ./{}", workspace, self.config.env_script),
        )?;

        // Each ssh command is a fresh shell, so the environment script is
        // sourced again in the same shell as make.
        let output_path = format!("{}/{}", self.config.build_output_dir, spec.artifact);
        self.checked(
            &shell,
            spec,
            "build",
            &format!(
                "cd {} && . ./{} && make {} {}",
                workspace,
                self.config.env_script,
                spec.make_args(),
                output_path
            ),
        )?;

        std::fs::create_dir_all(&self.config.artifacts_dir)?;
        let local = Path::new(&self.config.artifacts_dir).join(&spec.artifact);
        mirror.pull_file(
            &remote_join(workspace, &output_path),
            &local.to_string_lossy(),
        )?;
        if !local.exists() {
            return Err(SweepError::Build {
                target: spec.artifact.clone(),
                step: "collect artifact".into(),
                detail: format!("{} missing after pull", local.display()),
            });
        }
        Ok(local)
    }

    fn checked(
        &self,
        shell: &RemoteShell,
        spec: &BuildSpec,
        step: &str,
        command: &str,
    ) -> Result<(), SweepError> {
        let output = shell.run(step, command)?;
        if !output.success() {
            return Err(SweepError::Build {
                target: spec.artifact.clone(),
                step: step.to_string(),
                detail: output.failure_detail(),
            });
        }
        Ok(())
    }
}
