use std::path::Path;

use crate::command::Command;
use crate::config::{FailurePolicy, SweepConfig};
use crate::error::SweepError;
use crate::exec::{CommandRunner, ShellRunner};
use crate::grid::{build_grid, GridPoint};
use crate::journal::Journal;
use crate::lock::SweepLock;
use crate::sweep::{BuildOrchestrator, BuildSpec, RunOrchestrator, SweepDriver};


/// Central runtime for the sweep driver. Owns the configuration and
/// dispatches commands.
///
/// `App` wraps a validated `SweepConfig` plus the command runner everything
/// remote goes through. The runner is boxed so tests can substitute a
/// `MockRunner` and drive full command flows without touching any host.
pub struct App {
    config: SweepConfig,
    runner: Box<dyn CommandRunner>,
}

impl App {
    /// Create a new App around a loaded config, executing for real.
    pub fn new(config: SweepConfig) -> App {
        App {
            config,
            runner: Box::new(ShellRunner),
        }
    }

    /// Create an App with a custom runner. Useful for testing.
    pub fn with_runner(config: SweepConfig, runner: Box<dyn CommandRunner>) -> App {
        App { config, runner }
    }

    /// Borrow the configuration (for inspection in tests / external code).
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Execute a command and return its printable output.
    pub fn execute(&self, cmd: Command) -> Result<String, SweepError> {
        match cmd {
            Command::Grid { target } => self.cmd_grid(target),
            Command::Targets => self.cmd_targets(),
            Command::Build {
                target,
                local_ws,
                global_ws,
            } => self.cmd_build(target, local_ws, global_ws),
            Command::Run {
                target,
                local_ws,
                global_ws,
            } => self.cmd_run(target, local_ws, global_ws),
            Command::Sweep {
                target,
                keep_going,
                skip_existing,
            } => self.cmd_sweep(target, keep_going, skip_existing),
            Command::Journal { tail } => self.cmd_journal(tail),
            Command::ConfigShow => self.cmd_config_show(),
            // Init, Help and Version need no loaded config, so the binary
            // answers them before an App exists.
            Command::Init { .. } | Command::Help { .. } | Command::Version => {
                Err(SweepError::Config(
                    "command is handled by the binary, not dispatched to App".into(),
                ))
            }
        }
    }

    // -----------------------------------------------------------------
    // Command handlers
    // -----------------------------------------------------------------

    fn cmd_grid(&self, target: Option<String>) -> Result<String, SweepError> {
        let target = self
            .config
            .resolve_target(target.as_deref())
            .map_err(SweepError::Config)?;
        let grid = build_grid(target.local_ws, target.global_ws);
        let mut out = format!(
            "sweep grid for '{}' ({} point{}):",
            target.name,
            grid.len(),
            if grid.len() == 1 { "" } else { "s" }
        );
        for (i, point) in grid.iter().enumerate() {
            out.push_str(&format!("\n{:>4}  {}", i + 1, point));
        }
        Ok(out)
    }

    fn cmd_targets(&self) -> Result<String, SweepError> {
        let default_name = self
            .config
            .resolve_target(None)
            .ok()
            .map(|t| t.name.clone());
        let mut lines = Vec::new();
        for target in &self.config.targets {
            let marker = if Some(&target.name) == default_name.as_ref() {
                "*"
            } else {
                " "
            };
            let points = build_grid(target.local_ws, target.global_ws).len();
            lines.push(format!(
                "{} {:<16} artifact {:<16} local {}..{}  global {}..{}  {} points  timeout {}s",
                marker,
                target.name,
                target.artifact(),
                target.local_ws.low,
                target.local_ws.high,
                target.global_ws.low,
                target.global_ws.high,
                points,
                target.run_timeout_s,
            ));
        }
        Ok(lines.join("\n"))
    }

    fn cmd_build(
        &self,
        target: Option<String>,
        local_ws: u64,
        global_ws: u64,
    ) -> Result<String, SweepError> {
        let target = self
            .config
            .resolve_target(target.as_deref())
            .map_err(SweepError::Config)?;
        let point = GridPoint::new(local_ws, global_ws);
        let spec = BuildSpec::for_point(target, point);
        let builder = BuildOrchestrator::new(&self.config, self.runner.as_ref());
        let artifact = builder.build(&spec)?;
        Ok(format!(
            "built {} {} -> {}",
            target.name,
            point,
            artifact.display()
        ))
    }

    fn cmd_run(
        &self,
        target: Option<String>,
        local_ws: u64,
        global_ws: u64,
    ) -> Result<String, SweepError> {
        let target = self
            .config
            .resolve_target(target.as_deref())
            .map_err(SweepError::Config)?;
        let point = GridPoint::new(local_ws, global_ws);
        let artifact = Path::new(&self.config.artifacts_dir).join(target.artifact());
        let orchestrator = RunOrchestrator::new(&self.config, self.runner.as_ref());
        let result = orchestrator.run(target, &artifact, point)?;
        Ok(format!(
            "ran {} {} -> {}",
            target.name,
            point,
            result.display()
        ))
    }

    fn cmd_sweep(
        &self,
        target: Option<String>,
        keep_going: bool,
        skip_existing: bool,
    ) -> Result<String, SweepError> {
        let target = self
            .config
            .resolve_target(target.as_deref())
            .map_err(SweepError::Config)?;

        // The lock and the journal both live in the results directory.
        std::fs::create_dir_all(&self.config.results_dir)?;
        let results_dir = Path::new(&self.config.results_dir);
        let _lock = SweepLock::acquire(&SweepLock::path_in(results_dir))?;
        let journal = Journal::in_results_dir(results_dir);

        let policy = if keep_going {
            FailurePolicy::Continue
        } else {
            self.config.sweep.on_failure
        };
        let driver = SweepDriver::new(&self.config, self.runner.as_ref())
            .with_journal(&journal)
            .with_policy(policy)
            .with_skip_existing(skip_existing || self.config.sweep.skip_existing);

        let summary = driver.sweep(target)?;
        Ok(format!("sweep of '{}' finished: {}", target.name, summary))
    }

    fn cmd_journal(&self, tail: Option<usize>) -> Result<String, SweepError> {
        let journal = Journal::in_results_dir(Path::new(&self.config.results_dir));
        let records = match tail {
            Some(n) => journal.tail(n)?,
            None => journal.load()?,
        };
        if records.is_empty() {
            return Ok(format!("no journal records in {}", journal.path().display()));
        }
        let lines: Vec<String> = records
            .iter()
            .map(|r| format!("{}  {}", r.stamp, r.event))
            .collect();
        Ok(lines.join("\n"))
    }

    fn cmd_config_show(&self) -> Result<String, SweepError> {
        let c = &self.config;
        let mut out = String::new();
        out.push_str(&format!("project dir:    {}\n", c.project_dir));
        out.push_str(&format!("artifacts dir:  {}\n", c.artifacts_dir));
        out.push_str(&format!("results dir:    {}\n", c.results_dir));
        out.push_str(&format!("env script:     {}\n", c.env_script));
        out.push_str(&format!("build output:   {}\n", c.build_output_dir));
        out.push_str(&format!(
            "build host:     {} ({}@{}:{}, workspace {})\n",
            c.build_host.name, c.build_host.user, c.build_host.host, c.build_host.port,
            c.build_host.workspace
        ));
        out.push_str(&format!(
            "device:         {} ({}@{}:{}, workspace {})\n",
            c.device.name, c.device.user, c.device.host, c.device.port, c.device.workspace
        ));
        out.push_str(&format!(
            "thermal:        wait below {} C (timeout {}s), sensors {}\n",
            c.thermal.wait_temp_c, c.thermal.wait_timeout_s, c.thermal.sensors_file
        ));
        if let Some(fan_cmd) = &c.thermal.fan_cmd {
            out.push_str(&format!(
                "fan:            {}{}\n",
                fan_cmd,
                if c.thermal.fan_on { " (fan on)" } else { "" }
            ));
        }
        out.push_str(&format!(
            "on failure:     {}\n",
            c.sweep.on_failure
        ));
        out.push_str(&format!("skip existing:  {}\n", c.sweep.skip_existing));
        let target_names: Vec<&str> = c.targets.iter().map(|t| t.name.as_str()).collect();
        out.push_str(&format!("targets:        {}", target_names.join(", ")));
        if let Some(default) = &c.default_target {
            out.push_str(&format!(" (default {})", default));
        }
        Ok(out)
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
