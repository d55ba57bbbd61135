//! The sweep loop.
//!
//! Walks a target's grid in order, rebuilding and running each point, with
//! the progress marker, journal records, optional skip-existing resumption,
//! and the failure policy. Per-point failures (build, thermal-wait, run)
//! respect the policy; transport, configuration, and local I/O failures end
//! the sweep under either policy.

use std::fmt;
use std::path::Path;

use crate::config::{FailurePolicy, SweepConfig, TargetConfig};
use crate::error::SweepError;
use crate::exec::CommandRunner;
use crate::grid::{build_grid, GridPoint};
use crate::journal::{now_ms, Journal, SweepEvent};

use super::build::{BuildOrchestrator, BuildSpec};
use super::run::{result_file_name, RunOrchestrator};

// ---------------------------------------------------------------------------
// SweepSummary
// ---------------------------------------------------------------------------

/// Point counts for one finished (or aborted) sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub aborted: bool,
}

impl fmt::Display for SweepSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} points: {} completed, {} failed, {} skipped",
            self.total, self.completed, self.failed, self.skipped
        )?;
        if self.aborted {
            write!(f, " (aborted)")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SweepDriver
// ---------------------------------------------------------------------------

/// Drives a full sweep of one target.
pub struct SweepDriver<'a> {
    config: &'a SweepConfig,
    runner: &'a dyn CommandRunner,
    journal: Option<&'a Journal>,
    policy: FailurePolicy,
    skip_existing: bool,
}

impl<'a> SweepDriver<'a> {
    pub fn new(config: &'a SweepConfig, runner: &'a dyn CommandRunner) -> Self {
        SweepDriver {
            config,
            runner,
            journal: None,
            policy: config.sweep.on_failure,
            skip_existing: config.sweep.skip_existing,
        }
    }

    pub fn with_journal(mut self, journal: &'a Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_skip_existing(mut self, skip_existing: bool) -> Self {
        self.skip_existing = skip_existing;
        self
    }

    fn record(&self, event: SweepEvent) -> Result<(), SweepError> {
        match self.journal {
            Some(journal) => journal.record(event),
            None => Ok(()),
        }
    }

    /// Sweep the whole grid of one target.
    pub fn sweep(&self, target: &TargetConfig) -> Result<SweepSummary, SweepError> {
        let grid = build_grid(target.local_ws, target.global_ws);
        let total = grid.len();
        let mut summary = SweepSummary {
            total,
            completed: 0,
            failed: 0,
            skipped: 0,
            aborted: false,
        };

        if grid.is_empty() {
            println!("grid for '{}' is empty, nothing to do", target.name);
            return Ok(summary);
        }

        self.record(SweepEvent::SweepStarted {
            target: target.name.clone(),
            total_points: total,
        })?;

        let builder = BuildOrchestrator::new(self.config, self.runner);
        let run_orchestrator = RunOrchestrator::new(self.config, self.runner);

        for (i, point) in grid.iter().enumerate() {
            let index = i + 1;
            println!("######## BENCH {}/{} :: {} ########", index, total, point);

            let result_name = result_file_name(target.artifact(), *point);
            let result_path = Path::new(&self.config.results_dir).join(&result_name);
            if self.skip_existing && result_path.exists() {
                println!("result {} exists, skipping", result_path.display());
                summary.skipped += 1;
                self.record(SweepEvent::PointSkipped {
                    index,
                    result_file: result_path.display().to_string(),
                })?;
                continue;
            }

            self.record(SweepEvent::PointStarted {
                index,
                total,
                local_ws: point.local_ws,
                global_ws: point.global_ws,
            })?;

            let point_started = now_ms();
            let outcome = self.run_point(&builder, &run_orchestrator, target, index, *point);
            match outcome {
                Ok(result_file) => {
                    summary.completed += 1;
                    self.record(SweepEvent::PointCompleted {
                        index,
                        result_file,
                        duration_ms: now_ms().saturating_sub(point_started),
                    })?;
                }
                Err(e) => {
                    summary.failed += 1;
                    self.record(SweepEvent::PointFailed {
                        index,
                        phase: e.phase().to_string(),
                        detail: e.to_string(),
                    })?;
                    if e.aborts_sweep() || self.policy == FailurePolicy::Abort {
                        summary.aborted = true;
                        self.record(SweepEvent::SweepFinished {
                            target: target.name.clone(),
                            completed: summary.completed,
                            failed: summary.failed,
                            skipped: summary.skipped,
                            aborted: true,
                        })?;
                        return Err(e);
                    }
                    eprintln!("point {} failed, continuing: {}", point, e);
                }
            }
        }

        self.record(SweepEvent::SweepFinished {
            target: target.name.clone(),
            completed: summary.completed,
            failed: summary.failed,
            skipped: summary.skipped,
            aborted: false,
        })?;
        Ok(summary)
    }

    fn run_point(
        &self,
        builder: &BuildOrchestrator,
        run_orchestrator: &RunOrchestrator,
        target: &TargetConfig,
        index: usize,
        point: GridPoint,
    ) -> Result<String, SweepError> {
        let build_started = now_ms();
        let spec = BuildSpec::for_point(target, point);
        let artifact_path = builder.build(&spec)?;
        self.record(SweepEvent::BuildFinished {
            index,
            artifact: spec.artifact.clone(),
            duration_ms: now_ms().saturating_sub(build_started),
        })?;
        let result_path = run_orchestrator.run(target, &artifact_path, point)?;
        Ok(result_path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use crate::exec::{CommandOutput, MockRunner};
    use crate::sweep::run::EX_TEMPFAIL;
    use std::path::PathBuf;

    fn test_dir(name: &str) -> PathBuf {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir()
            .join("tsw_driver_test")
            .join(format!("{}_{}", name, id));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Example config shrunk to the six-point 32..128 grid, with local
    /// directories under `root`.
    fn test_config(root: &Path) -> SweepConfig {
        let mut cfg = config::parse(config::SweepConfig::example()).unwrap();
        cfg.project_dir = root.join("proj").to_string_lossy().to_string();
        cfg.artifacts_dir = root.join("artifacts").to_string_lossy().to_string();
        cfg.results_dir = root.join("results").to_string_lossy().to_string();
        cfg.targets[0].global_ws = crate::grid::AxisBounds::new(32, 128);
        cfg.targets[0].local_ws = crate::grid::AxisBounds::new(32, 128);
        cfg
    }

    const SIX_SUFFIXES: &[&str] = &["32-32", "64-32", "64-64", "128-32", "128-64", "128-128"];

    fn seed_artifact(cfg: &SweepConfig) {
        std::fs::create_dir_all(&cfg.artifacts_dir).unwrap();
        std::fs::write(Path::new(&cfg.artifacts_dir).join("cl-mem"), b"elf").unwrap();
    }

    fn seed_results(cfg: &SweepConfig, suffixes: &[&str]) {
        std::fs::create_dir_all(&cfg.results_dir).unwrap();
        for suffix in suffixes {
            std::fs::write(
                Path::new(&cfg.results_dir).join(format!("cl-mem-{}.csv", suffix)),
                b"time,work_done\n",
            )
            .unwrap();
        }
    }

    #[test]
    fn full_sweep_covers_every_grid_point() {
        let dir = test_dir("full");
        let cfg = test_config(&dir);
        seed_artifact(&cfg);
        seed_results(&cfg, SIX_SUFFIXES);
        let journal = Journal::in_results_dir(Path::new(&cfg.results_dir));

        let runner = MockRunner::new();
        let target = cfg.resolve_target(Some("cl-mem")).unwrap();
        let driver = SweepDriver::new(&cfg, &runner).with_journal(&journal);
        let summary = driver.sweep(target).unwrap();

        assert_eq!(summary.total, 6);
        assert_eq!(summary.completed, 6);
        assert_eq!(summary.failed, 0);
        assert!(!summary.aborted);
        // Nine commands per point: six build steps, then push, run, pull.
        assert_eq!(runner.executed_commands().len(), 54);

        let records = journal.load().unwrap();
        // started + 6 * (point_started, build_finished, point_completed) + finished
        assert_eq!(records.len(), 20);
        assert!(matches!(
            records[0].event,
            SweepEvent::SweepStarted { total_points: 6, .. }
        ));
        assert!(matches!(
            records[19].event,
            SweepEvent::SweepFinished {
                completed: 6,
                aborted: false,
                ..
            }
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_grid_finishes_without_commands() {
        let dir = test_dir("empty");
        let mut cfg = test_config(&dir);
        cfg.targets[0].local_ws = crate::grid::AxisBounds::new(128, 32);
        let runner = MockRunner::new();
        let target = cfg.resolve_target(Some("cl-mem")).unwrap();
        let driver = SweepDriver::new(&cfg, &runner);
        let summary = driver.sweep(target).unwrap();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.completed, 0);
        assert!(runner.executed_commands().is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn failed_copy_aborts_before_any_run() {
        let dir = test_dir("copy_abort");
        let cfg = test_config(&dir);
        seed_artifact(&cfg);
        let journal = Journal::in_results_dir(Path::new(&cfg.results_dir));
        let runner = MockRunner::with_responses(vec![
            Ok(CommandOutput::ok("")),
            Ok(CommandOutput::exit(12, "rsync: connection unexpectedly closed")),
        ]);
        let target = cfg.resolve_target(Some("cl-mem")).unwrap();
        let driver = SweepDriver::new(&cfg, &runner).with_journal(&journal);
        let err = driver.sweep(target).unwrap_err();
        assert!(matches!(err, SweepError::Transport { .. }));
        // rm + failed push on point one, nothing else on any point.
        assert_eq!(runner.executed_commands().len(), 2);

        let records = journal.load().unwrap();
        let last = &records[records.len() - 1].event;
        assert!(matches!(
            last,
            SweepEvent::SweepFinished {
                aborted: true,
                completed: 0,
                ..
            }
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn thermal_timeout_aborts_under_default_policy() {
        let dir = test_dir("thermal_abort");
        let cfg = test_config(&dir);
        seed_artifact(&cfg);
        seed_results(&cfg, SIX_SUFFIXES);
        let mut responses: Vec<Result<CommandOutput, String>> =
            (0..7).map(|_| Ok(CommandOutput::ok(""))).collect();
        responses.push(Ok(CommandOutput::exit(
            EX_TEMPFAIL,
            "thermobench: timeout waiting for temperature",
        )));
        let runner = MockRunner::with_responses(responses);
        let target = cfg.resolve_target(Some("cl-mem")).unwrap();
        let driver = SweepDriver::new(&cfg, &runner);
        let err = driver.sweep(target).unwrap_err();
        assert!(matches!(err, SweepError::ThermalWait { .. }));
        // Point one only: six build steps, push, failed run.
        assert_eq!(runner.executed_commands().len(), 8);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn thermal_timeout_continues_under_continue_policy() {
        let dir = test_dir("thermal_continue");
        let cfg = test_config(&dir);
        seed_artifact(&cfg);
        seed_results(&cfg, SIX_SUFFIXES);
        let journal = Journal::in_results_dir(Path::new(&cfg.results_dir));
        let mut responses: Vec<Result<CommandOutput, String>> =
            (0..7).map(|_| Ok(CommandOutput::ok(""))).collect();
        responses.push(Ok(CommandOutput::exit(
            EX_TEMPFAIL,
            "thermobench: timeout waiting for temperature",
        )));
        let runner = MockRunner::with_responses(responses);
        let target = cfg.resolve_target(Some("cl-mem")).unwrap();
        let driver = SweepDriver::new(&cfg, &runner)
            .with_journal(&journal)
            .with_policy(FailurePolicy::Continue);
        let summary = driver.sweep(target).unwrap();
        assert_eq!(summary.completed, 5);
        assert_eq!(summary.failed, 1);
        assert!(!summary.aborted);
        // Point one stops after its failed run; the other five run fully.
        assert_eq!(runner.executed_commands().len(), 8 + 5 * 9);

        let records = journal.load().unwrap();
        let failed: Vec<_> = records
            .iter()
            .filter(|r| matches!(r.event, SweepEvent::PointFailed { .. }))
            .collect();
        assert_eq!(failed.len(), 1);
        match &failed[0].event {
            SweepEvent::PointFailed { index, phase, .. } => {
                assert_eq!(*index, 1);
                assert_eq!(phase, "thermal-wait");
            }
            _ => unreachable!(),
        }
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn transport_failure_aborts_even_under_continue_policy() {
        let dir = test_dir("transport_continue");
        let cfg = test_config(&dir);
        seed_artifact(&cfg);
        let runner = MockRunner::with_responses(vec![Ok(CommandOutput::exit(
            255,
            "ssh: connect to host vm port 22: Connection refused",
        ))]);
        let target = cfg.resolve_target(Some("cl-mem")).unwrap();
        let driver = SweepDriver::new(&cfg, &runner).with_policy(FailurePolicy::Continue);
        let err = driver.sweep(target).unwrap_err();
        assert!(matches!(err, SweepError::Transport { .. }));
        assert_eq!(runner.executed_commands().len(), 1);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn skip_existing_skips_points_with_results() {
        let dir = test_dir("skip");
        let cfg = test_config(&dir);
        seed_artifact(&cfg);
        seed_results(&cfg, SIX_SUFFIXES);
        let journal = Journal::in_results_dir(Path::new(&cfg.results_dir));
        let runner = MockRunner::new();
        let target = cfg.resolve_target(Some("cl-mem")).unwrap();
        let driver = SweepDriver::new(&cfg, &runner)
            .with_journal(&journal)
            .with_skip_existing(true);
        let summary = driver.sweep(target).unwrap();
        assert_eq!(summary.skipped, 6);
        assert_eq!(summary.completed, 0);
        assert!(runner.executed_commands().is_empty());

        let records = journal.load().unwrap();
        let skipped = records
            .iter()
            .filter(|r| matches!(r.event, SweepEvent::PointSkipped { .. }))
            .count();
        assert_eq!(skipped, 6);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn summary_display_reads_naturally() {
        let summary = SweepSummary {
            total: 6,
            completed: 4,
            failed: 1,
            skipped: 1,
            aborted: true,
        };
        assert_eq!(
            summary.to_string(),
            "6 points: 4 completed, 1 failed, 1 skipped (aborted)"
        );
    }
}
