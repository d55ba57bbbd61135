//! Parser for `thermosweep.yaml` sweep configuration files.
//!
//! One file describes everything a sweep needs: the build host and device
//! coordinates, thermal-wait settings for the monitoring wrapper, the
//! failure policy, and the named sweep targets with their axis bounds and
//! build variables. Targets are selected by name on the command line; the
//! two benchmark variants that used to be toggled by editing the driver are
//! just two entries in the `targets` list.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::grid::AxisBounds;
use crate::remote::HostConfig;

fn default_project_dir() -> String {
    ".".into()
}

fn default_artifacts_dir() -> String {
    "artifacts".into()
}

fn default_results_dir() -> String {
    "results".into()
}

fn default_build_output_dir() -> String {
    "target".into()
}

fn default_wait_temp() -> f64 {
    32.0
}

fn default_wait_timeout() -> u64 {
    300
}

fn default_progress_column() -> String {
    "work_done".into()
}

fn default_monitor_cmd() -> String {
    "./thermobench".into()
}

fn default_run_timeout() -> u64 {
    600
}

// ---------------------------------------------------------------------------
// FailurePolicy
// ---------------------------------------------------------------------------

/// What the sweep loop does when one grid point fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop at the first failed point.
    #[default]
    Abort,
    /// Record the failure and move on to the next point.
    Continue,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Abort => write!(f, "abort"),
            FailurePolicy::Continue => write!(f, "continue"),
        }
    }
}

// ---------------------------------------------------------------------------
// ThermalConfig
// ---------------------------------------------------------------------------

/// Settings passed to the monitoring wrapper on the device.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThermalConfig {
    /// Sensor definition file on the device.
    pub sensors_file: String,

    /// Temperature the device must cool to before a run starts.
    #[serde(default = "default_wait_temp")]
    pub wait_temp_c: f64,

    /// How long the wrapper waits for the temperature, independent of the
    /// run time budget.
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout_s: u64,

    /// Benchmark stdout column the wrapper tracks for progress.
    #[serde(default = "default_progress_column")]
    pub progress_column: String,

    /// Path of the monitoring wrapper on the device.
    #[serde(default = "default_monitor_cmd")]
    pub monitor_cmd: String,

    /// Command the wrapper uses to switch the cooling fan.
    #[serde(default)]
    pub fan_cmd: Option<String>,

    /// Turn the fan on while waiting for the temperature.
    #[serde(default)]
    pub fan_on: bool,
}

// ---------------------------------------------------------------------------
// SweepOptions / TargetConfig
// ---------------------------------------------------------------------------

/// Loop-level options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SweepOptions {
    #[serde(default)]
    pub on_failure: FailurePolicy,

    /// Skip grid points whose result file already exists locally.
    #[serde(default)]
    pub skip_existing: bool,
}

/// One named benchmark with its grid and build variables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetConfig {
    pub name: String,

    /// Built binary name; defaults to the target name.
    #[serde(default)]
    pub artifact: Option<String>,

    pub global_ws: AxisBounds,
    pub local_ws: AxisBounds,

    /// Time budget for one run, passed to the wrapper as `--time`.
    #[serde(default = "default_run_timeout")]
    pub run_timeout_s: u64,

    /// Fixed build variables baked into every build of this target.
    /// `GLOBAL_WS` and `LOCAL_WS` come from the grid point, not from here.
    #[serde(default)]
    pub build_vars: BTreeMap<String, String>,
}

impl TargetConfig {
    pub fn artifact(&self) -> &str {
        self.artifact.as_deref().unwrap_or(&self.name)
    }
}

// ---------------------------------------------------------------------------
// SweepConfig
// ---------------------------------------------------------------------------

/// Top-level sweep configuration from a `thermosweep.yaml` file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepConfig {
    /// Local project tree mirrored to the build host.
    #[serde(default = "default_project_dir")]
    pub project_dir: String,

    /// Where pulled binaries land locally.
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: String,

    /// Where pulled result CSVs, the journal, and the lock live.
    #[serde(default = "default_results_dir")]
    pub results_dir: String,

    /// Script sourced on the build host before building.
    pub env_script: String,

    /// Directory make places binaries in, relative to the build workspace.
    #[serde(default = "default_build_output_dir")]
    pub build_output_dir: String,

    /// Target used when the command line names none.
    #[serde(default)]
    pub default_target: Option<String>,

    /// Extra rsync exclude patterns for the mirror push.
    #[serde(default)]
    pub sync_excludes: Vec<String>,

    pub build_host: HostConfig,
    pub device: HostConfig,
    pub thermal: ThermalConfig,

    #[serde(default)]
    pub sweep: SweepOptions,

    pub targets: Vec<TargetConfig>,
}

impl SweepConfig {
    /// Check cross-field consistency after parsing.
    pub fn validate(&self) -> Result<(), String> {
        if self.targets.is_empty() {
            return Err("no targets configured".into());
        }
        for target in &self.targets {
            if target.name.is_empty() {
                return Err("target with empty name".into());
            }
        }
        for (i, target) in self.targets.iter().enumerate() {
            if self.targets[..i].iter().any(|t| t.name == target.name) {
                return Err(format!("duplicate target '{}'", target.name));
            }
        }
        if let Some(ref name) = self.default_target {
            if !self.targets.iter().any(|t| &t.name == name) {
                return Err(format!(
                    "default_target '{}' is not in the targets list",
                    name
                ));
            }
        }
        if self.thermal.fan_on && self.thermal.fan_cmd.is_none() {
            return Err("thermal.fan_on is set but thermal.fan_cmd is not".into());
        }
        // The build removes its workspace before mirroring; refuse to aim
        // that at the login home.
        let ws = self.build_host.workspace.trim_end_matches('/');
        if ws.is_empty() || ws == "." || ws == "~" {
            return Err("build_host.workspace must name a directory".into());
        }
        Ok(())
    }

    /// Select a target: by name, or the default, or the sole entry.
    pub fn resolve_target(&self, name: Option<&str>) -> Result<&TargetConfig, String> {
        let available = || {
            self.targets
                .iter()
                .map(|t| t.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        match name {
            Some(n) => self
                .targets
                .iter()
                .find(|t| t.name == n)
                .ok_or_else(|| format!("unknown target '{}' (available: {})", n, available())),
            None => {
                if let Some(ref default) = self.default_target {
                    return self
                        .targets
                        .iter()
                        .find(|t| &t.name == default)
                        .ok_or_else(|| format!("default_target '{}' not found", default));
                }
                if self.targets.len() == 1 {
                    return Ok(&self.targets[0]);
                }
                Err(format!(
                    "no target given and no default_target set (available: {})",
                    available()
                ))
            }
        }
    }

    /// Exclude patterns for the mirror push: version control plus the local
    /// artifact and result directories, plus any configured extras. The
    /// directories go in by basename so the patterns stay meaningful when
    /// the config uses absolute paths.
    pub fn mirror_excludes(&self) -> Vec<String> {
        let mut excludes = vec![".git/".to_string()];
        for pattern in &self.sync_excludes {
            if !excludes.contains(pattern) {
                excludes.push(pattern.clone());
            }
        }
        for dir in [&self.artifacts_dir, &self.results_dir] {
            let name = Path::new(dir)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(dir);
            let pattern = format!("{}/", name);
            if !excludes.contains(&pattern) {
                excludes.push(pattern);
            }
        }
        excludes
    }

    /// A commented starter configuration, written by `tsw init`.
    pub fn example() -> &'static str {
        EXAMPLE_CONFIG
    }
}

/// Load a sweep config from a YAML file and validate it.
pub fn load(path: &Path) -> Result<SweepConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
    let config = parse(&content)?;
    config.validate()?;
    Ok(config)
}

/// Parse a sweep config from a YAML string.
pub fn parse(content: &str) -> Result<SweepConfig, String> {
    serde_yaml::from_str(content).map_err(|e| format!("invalid sweep config: {}", e))
}

const EXAMPLE_CONFIG: &str = r#"# thermosweep configuration.
#
# `project_dir` is mirrored onto the build host workspace before every
# build; pulled binaries land in `artifacts_dir`, result CSVs in
# `results_dir`.

project_dir: .
artifacts_dir: artifacts
results_dir: results

# Sourced on the build host before every build (toolchain setup).
env_script: yocto_env.sh
# Where make places binaries, relative to the build workspace.
build_output_dir: target

default_target: cl-mem

build_host:
  name: buildvm
  host: vm
  user: user
  password: asdf
  workspace: cl-bench

device:
  name: imx8
  host: imx8
  user: root
  password: asdf

thermal:
  sensors_file: sensors.imx8
  wait_temp_c: 32
  wait_timeout_s: 300
  progress_column: work_done
  monitor_cmd: ./thermobench
  fan_cmd: ssh imx8fan@c2c1
  fan_on: true

sweep:
  on_failure: abort      # abort | continue
  skip_existing: false

targets:
  - name: cl-mem
    global_ws: { low: 32, high: 16384 }
    local_ws: { low: 32, high: 1024 }
    run_timeout_s: 600
    build_vars: { REPS: "1024", MEMSIZE: "8388608", BLOCKSIZE: "64", KERNEL: "read" }
  - name: cl-mandelbrot
    global_ws: { low: 32, high: 16384 }
    local_ws: { low: 32, high: 1024 }
    run_timeout_s: 600
    build_vars: { REPS: "1", MEMSIZE: "2048", BLOCKSIZE: "1", KERNEL: "read" }
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_yaml() -> &'static str {
        "env_script: env.sh\n\
         build_host: { name: vm, host: vm, user: user, workspace: cl-bench }\n\
         device: { name: dev, host: dev, user: root }\n\
         thermal: { sensors_file: sensors.txt }\n\
         targets:\n\
         \x20 - name: bench\n\
         \x20   global_ws: { low: 32, high: 128 }\n\
         \x20   local_ws: { low: 32, high: 128 }\n"
    }

    // -- Parsing --

    #[test]
    fn parse_minimal_config_applies_defaults() {
        let cfg = parse(minimal_yaml()).unwrap();
        assert_eq!(cfg.project_dir, ".");
        assert_eq!(cfg.artifacts_dir, "artifacts");
        assert_eq!(cfg.results_dir, "results");
        assert_eq!(cfg.build_output_dir, "target");
        assert_eq!(cfg.thermal.wait_temp_c, 32.0);
        assert_eq!(cfg.thermal.wait_timeout_s, 300);
        assert_eq!(cfg.thermal.progress_column, "work_done");
        assert_eq!(cfg.thermal.monitor_cmd, "./thermobench");
        assert!(!cfg.thermal.fan_on);
        assert_eq!(cfg.sweep.on_failure, FailurePolicy::Abort);
        assert!(!cfg.sweep.skip_existing);
        assert_eq!(cfg.targets[0].run_timeout_s, 600);
        assert!(cfg.targets[0].build_vars.is_empty());
        assert_eq!(cfg.targets[0].artifact(), "bench");
    }

    #[test]
    fn parse_missing_env_script_fails() {
        let yaml = "build_host: { name: vm, host: vm, user: u }\n\
                    device: { name: d, host: d, user: r }\n\
                    thermal: { sensors_file: s }\n\
                    targets: []\n";
        let result = parse(yaml);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("invalid"));
    }

    #[test]
    fn example_config_parses_and_validates() {
        let cfg = parse(SweepConfig::example()).unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.targets.len(), 2);
        assert_eq!(cfg.default_target.as_deref(), Some("cl-mem"));
        let mem = cfg.resolve_target(Some("cl-mem")).unwrap();
        assert_eq!(mem.build_vars.get("KERNEL").map(|s| s.as_str()), Some("read"));
        assert_eq!(mem.build_vars.get("MEMSIZE").map(|s| s.as_str()), Some("8388608"));
        let mandelbrot = cfg.resolve_target(Some("cl-mandelbrot")).unwrap();
        assert_eq!(mandelbrot.build_vars.get("REPS").map(|s| s.as_str()), Some("1"));
        assert_eq!(mandelbrot.build_vars.get("BLOCKSIZE").map(|s| s.as_str()), Some("1"));
        assert_eq!(mandelbrot.build_vars.get("KERNEL").map(|s| s.as_str()), Some("read"));
    }

    #[test]
    fn failure_policy_parses_both_values() {
        let mut yaml = minimal_yaml().to_string();
        yaml.push_str("sweep: { on_failure: continue }\n");
        let cfg = parse(&yaml).unwrap();
        assert_eq!(cfg.sweep.on_failure, FailurePolicy::Continue);
    }

    // -- Validation --

    #[test]
    fn validate_rejects_empty_targets() {
        let yaml = "env_script: env.sh\n\
                    build_host: { name: vm, host: vm, user: u }\n\
                    device: { name: d, host: d, user: r }\n\
                    thermal: { sensors_file: s }\n\
                    targets: []\n";
        let cfg = parse(yaml).unwrap();
        assert!(cfg.validate().unwrap_err().contains("no targets"));
    }

    #[test]
    fn validate_rejects_duplicate_target_names() {
        let mut cfg = parse(minimal_yaml()).unwrap();
        let dup = cfg.targets[0].clone();
        cfg.targets.push(dup);
        assert!(cfg.validate().unwrap_err().contains("duplicate"));
    }

    #[test]
    fn validate_rejects_unknown_default_target() {
        let mut cfg = parse(minimal_yaml()).unwrap();
        cfg.default_target = Some("nope".into());
        assert!(cfg.validate().unwrap_err().contains("default_target"));
    }

    #[test]
    fn validate_rejects_fan_on_without_fan_cmd() {
        let mut cfg = parse(minimal_yaml()).unwrap();
        cfg.thermal.fan_on = true;
        assert!(cfg.validate().unwrap_err().contains("fan_cmd"));
    }

    #[test]
    fn validate_rejects_home_as_build_workspace() {
        let mut cfg = parse(minimal_yaml()).unwrap();
        cfg.build_host.workspace = ".".into();
        assert!(cfg.validate().unwrap_err().contains("workspace"));
    }

    // -- Target resolution --

    #[test]
    fn resolve_by_name() {
        let cfg = parse(minimal_yaml()).unwrap();
        assert_eq!(cfg.resolve_target(Some("bench")).unwrap().name, "bench");
    }

    #[test]
    fn resolve_unknown_name_lists_available() {
        let cfg = parse(SweepConfig::example()).unwrap();
        let err = cfg.resolve_target(Some("nope")).unwrap_err();
        assert!(err.contains("unknown target 'nope'"));
        assert!(err.contains("cl-mem"));
        assert!(err.contains("cl-mandelbrot"));
    }

    #[test]
    fn resolve_falls_back_to_default_then_sole_target() {
        let cfg = parse(SweepConfig::example()).unwrap();
        assert_eq!(cfg.resolve_target(None).unwrap().name, "cl-mem");
        let sole = parse(minimal_yaml()).unwrap();
        assert_eq!(sole.resolve_target(None).unwrap().name, "bench");
    }

    #[test]
    fn resolve_without_default_among_many_fails() {
        let mut cfg = parse(SweepConfig::example()).unwrap();
        cfg.default_target = None;
        let err = cfg.resolve_target(None).unwrap_err();
        assert!(err.contains("no default_target"));
    }

    // -- Excludes --

    #[test]
    fn mirror_excludes_cover_local_output_dirs() {
        let mut cfg = parse(minimal_yaml()).unwrap();
        cfg.sync_excludes = vec!["*.o".into()];
        let excludes = cfg.mirror_excludes();
        assert!(excludes.contains(&".git/".to_string()));
        assert!(excludes.contains(&"*.o".to_string()));
        assert!(excludes.contains(&"artifacts/".to_string()));
        assert!(excludes.contains(&"results/".to_string()));
    }

    // -- File loading --

    #[test]
    fn load_from_file() {
        let dir = std::env::temp_dir().join("tsw_test_config_load");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("thermosweep.yaml");
        std::fs::write(&path, minimal_yaml()).unwrap();

        let cfg = load(&path).unwrap();
        assert_eq!(cfg.targets[0].name, "bench");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_missing_file_errors() {
        let result = load(Path::new("/tmp/nonexistent_thermosweep_xyz.yaml"));
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("cannot read"));
    }
}
