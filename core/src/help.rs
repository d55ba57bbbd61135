//! Help system — generates usage text for all tsw commands.
//!
//! The help module provides structured help text for the CLI. It supports
//! two levels of detail:
//!
//! 1. **Overview** (`tsw help`) — lists all commands with summaries
//! 2. **Command help** (`tsw help sweep`) — detailed usage for one command


/// Generate help text for a given topic.
///
/// - `None` → overview of all commands
/// - `Some("sweep")` → detailed help for sweep
pub fn help_text(topic: Option<&str>) -> String {
    match topic {
        None => overview(),
        Some(t) => match command_help(t) {
            Some(text) => text,
            None => format!(
                "Unknown help topic: '{}'. Run 'tsw help' for a list of commands.",
                t
            ),
        },
    }
}


/// Top-level overview of all commands.
fn overview() -> String {
    "\
tsw — thermal benchmark sweep driver

Usage: tsw <command> [args...]

Commands:
  grid [--target <t>]          Print the sweep grid, no remote contact
  targets                      List configured sweep targets
  build --local-ws <n> --global-ws <n> [--target <t>]
                               Build one grid point on the build host
  run --local-ws <n> --global-ws <n> [--target <t>]
                               Run one built grid point on the device
  sweep [--target <t>] [--keep-going] [--skip-existing]
                               Build and run every grid point in order
  journal [--tail <n>]         Show recent sweep journal records
  config                       Print the resolved configuration
  init [path]                  Write a starter configuration file
  help [topic]                 Show help (this message, or help on a command)
  version                      Print the version

Configuration is read from ./thermosweep.yaml, or from the file named by
the TSW_CONFIG environment variable.

Run 'tsw help <command>' for detailed help on a specific command."
        .into()
}


/// Detailed help for a single command.
fn command_help(command: &str) -> Option<String> {
    let text = match command {
        "grid" => "\
tsw grid — print the sweep grid

Usage: tsw grid [--target <name>]

Lists every (local, global) work-size pair the sweep would visit, in
sweep order, without contacting the build host or the device. Sizes are
the powers of two inside the target's configured ranges; pairs where the
local size exceeds the global size are excluded.

Useful for checking how many benchmarks a sweep will run before
committing to one.",

        "targets" => "\
tsw targets — list configured sweep targets

Usage: tsw targets

Shows each target from the configuration with its artifact name, work
size ranges, grid point count, and run timeout. The default target is
marked with an asterisk.",

        "build" => "\
tsw build — build one grid point

Usage: tsw build --local-ws <n> --global-ws <n> [--target <name>]

Mirrors the project tree to the build host, then runs the clean,
environment setup, and make steps over SSH with GLOBAL_WS and LOCAL_WS
set to the given sizes. The finished binary is copied back into the
local artifacts directory. The sizes are baked into the binary, so a
later build of another point overwrites it.

Both sizes must be powers of two, and --local-ws must not exceed
--global-ws. Build failures report the step that failed and the tail of
its stderr.",

        "run" => "\
tsw run — run one built grid point

Usage: tsw run --local-ws <n> --global-ws <n> [--target <name>]

Pushes the artifact produced by 'tsw build' to the device, launches it
under the monitor with the configured sensors file and timeout, and
pulls the size-suffixed result CSV into the local results directory.
Run it right after building the same point; building a different point
replaces the artifact.

The monitor first waits for the device to cool below the configured
temperature; if that wait times out, the run fails before the benchmark
starts and is reported as a thermal-wait failure.",

        "sweep" => "\
tsw sweep — build and run the full grid

Usage: tsw sweep [--target <name>] [--keep-going] [--skip-existing]

Walks the target's grid in order, building and then running each point.
Progress markers and a timestamp line are printed before each run so the
console log can be correlated with result files. A journal of events is
appended in the results directory, and a lock file prevents two sweeps
from sharing it.

By default the sweep aborts on the first failure. With --keep-going,
benchmark-level failures (build, thermal wait, run) are recorded and the
sweep moves on; configuration and transport failures always abort. With
--skip-existing, points whose result file is already present are skipped,
which makes re-running an interrupted sweep cheap.",

        "journal" => "\
tsw journal — show sweep journal records

Usage: tsw journal [--tail <n>]

Prints the journal from the current results directory, one record per
line with its timestamp. Use --tail to show only the last N records.",

        "config" => "\
tsw config — print the resolved configuration

Usage: tsw config

Loads the configuration file, applies defaults, validates it, and prints
a summary of hosts, directories, thermal settings, and targets. A
validation failure is reported the same way it would be for any other
command.",

        "init" => "\
tsw init — write a starter configuration file

Usage: tsw init [path]

Writes an example configuration to the given path (default
thermosweep.yaml). Refuses to overwrite an existing file. Edit the
hosts, environment script, and targets before the first sweep.",

        "help" => "\
tsw help — show help information

Usage: tsw help [topic]

With no topic, shows an overview of all available commands.
With a topic, shows detailed help:

  tsw help          # overview
  tsw help sweep    # detailed help for sweep",

        "version" => "\
tsw version — print the version

Usage: tsw version",

        _ => return None,
    };
    Some(text.into())
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
