//! Command — the typed interface for all sweep driver operations.
//!
//! Every operation the `tsw` binary can perform is a variant of the
//! `Command` enum. Parsing lives in `cli::parse_args`; execution lives in
//! `App::execute()`. Keeping the enum free of parsing concerns lets tests
//! drive the driver with constructed commands directly.
//!
//! # Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `grid` | Print the sweep grid for a target, no remote contact |
//! | `targets` | List configured sweep targets |
//! | `build` | Build one grid point on the build host |
//! | `run` | Run one already-built grid point on the device |
//! | `sweep` | Build and run every grid point in order |
//! | `journal` | Show recent sweep journal records |
//! | `config` | Print the resolved configuration |
//! | `init` | Write a starter configuration file |
//! | `help`, `version` | Usual CLI plumbing |


/// A typed command for the sweep driver.
///
/// Each variant corresponds to exactly one operation in `App::execute()`.
/// Required fields are non-optional; a missing `target` means "use the
/// configured default target".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print every grid point the sweep would visit, in sweep order.
    Grid {
        /// Target name; `None` selects the configured default.
        target: Option<String>,
    },

    /// List the targets defined in the configuration.
    Targets,

    /// Build the artifact for a single grid point on the build host.
    Build {
        target: Option<String>,
        /// Local work-group size. Must be a power of two.
        local_ws: u64,
        /// Global work size. Must be a power of two, >= `local_ws`.
        global_ws: u64,
    },

    /// Run a previously built grid point on the device and collect its CSV.
    Run {
        target: Option<String>,
        local_ws: u64,
        global_ws: u64,
    },

    /// Build and run the full grid, point by point.
    Sweep {
        target: Option<String>,
        /// Keep sweeping past benchmark-level failures instead of aborting.
        keep_going: bool,
        /// Skip points whose result file already exists.
        skip_existing: bool,
    },

    /// Print journal records from the current results directory.
    Journal {
        /// Show only the last N records. `None` shows everything.
        tail: Option<usize>,
    },

    /// Print the resolved configuration as a summary.
    ConfigShow,

    /// Write a starter configuration file.
    Init {
        /// Destination path; defaults to `thermosweep.yaml`.
        path: Option<String>,
    },

    /// Show help text.
    Help { topic: Option<String> },

    /// Print the version.
    Version,
}
