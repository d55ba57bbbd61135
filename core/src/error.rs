use std::fmt;

// ---------------------------------------------------------------------------
// Sweep errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum SweepError {
    /// Configuration file missing, unparseable, or invalid.
    Config(String),
    /// Local filesystem I/O error.
    Io(std::io::Error),
    /// A transfer or connection to a remote host failed (rsync non-zero,
    /// ssh exit 255, or a child process that could not be spawned).
    Transport {
        host: String,
        op: String,
        detail: String,
    },
    /// A checked remote build step exited non-zero.
    Build {
        target: String,
        step: String,
        detail: String,
    },
    /// The monitoring wrapper gave up waiting for the thermal precondition.
    ThermalWait { point: String, detail: String },
    /// The monitoring wrapper exited non-zero for any other reason.
    Run { point: String, detail: String },
    /// Another sweep process holds the lock.
    Lock(String),
}

impl SweepError {
    /// Whether this failure ends the sweep regardless of the failure policy.
    ///
    /// Build, thermal-wait, and run failures are scoped to a single grid
    /// point; everything else indicates broken infrastructure or a bad
    /// invocation and always aborts.
    pub fn aborts_sweep(&self) -> bool {
        !matches!(
            self,
            SweepError::Build { .. } | SweepError::ThermalWait { .. } | SweepError::Run { .. }
        )
    }

    /// Short phase label used in journal records.
    pub fn phase(&self) -> &'static str {
        match self {
            SweepError::Config(_) => "config",
            SweepError::Io(_) => "io",
            SweepError::Transport { .. } => "transport",
            SweepError::Build { .. } => "build",
            SweepError::ThermalWait { .. } => "thermal-wait",
            SweepError::Run { .. } => "run",
            SweepError::Lock(_) => "lock",
        }
    }
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepError::Config(msg) => write!(f, "config error: {}", msg),
            SweepError::Io(e) => write!(f, "I/O error: {}", e),
            SweepError::Transport { host, op, detail } => {
                write!(f, "transport failure ({} on {}): {}", op, host, detail)
            }
            SweepError::Build {
                target,
                step,
                detail,
            } => {
                write!(f, "build of '{}' failed at {}: {}", target, step, detail)
            }
            SweepError::ThermalWait { point, detail } => {
                write!(
                    f,
                    "thermal precondition not reached for {}: {}",
                    point, detail
                )
            }
            SweepError::Run { point, detail } => {
                write!(f, "run failed for {}: {}", point, detail)
            }
            SweepError::Lock(msg) => write!(f, "lock error: {}", msg),
        }
    }
}

impl std::error::Error for SweepError {}

impl From<std::io::Error> for SweepError {
    fn from(e: std::io::Error) -> Self {
        SweepError::Io(e)
    }
}
