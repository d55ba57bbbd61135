use crate::command::Command;


/// Parse CLI arguments into a typed Command enum.
///
/// The first argument is expected to be the subcommand (e.g., "grid",
/// "sweep", "build").
///
/// Arguments are expected WITHOUT the program name (i.e., `args` should
/// be `["sweep"]`, not `["tsw", "sweep"]`).
pub fn parse_args(args: &[&str]) -> Result<Command, String> {
    if args.is_empty() {
        return Err("No command specified. Run 'tsw help' for usage.".into());
    }

    match args[0] {
        "grid" => parse_grid(args),
        "targets" => parse_targets(args),
        "build" => parse_point(args, "build"),
        "run" => parse_point(args, "run"),
        "sweep" => parse_sweep(args),
        "journal" => parse_journal(args),
        "config" => parse_config(args),
        "init" => parse_init(args),
        "help" => parse_help(args),
        "version" | "--version" | "-V" => Ok(Command::Version),
        _ => Err(format!("Unknown command: '{}'", args[0])),
    }
}


// ---------------------------------------------------------------------------
// Sub-parsers
// ---------------------------------------------------------------------------

/// `tsw grid [--target <name>]`
fn parse_grid(args: &[&str]) -> Result<Command, String> {
    let rest = &args[1..];
    let mut target = None;
    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            "--target" => {
                i += 1;
                target = Some(take_arg(rest, i, "--target")?);
            }
            other => return Err(format!("Unknown grid flag: '{}'", other)),
        }
        i += 1;
    }
    Ok(Command::Grid { target })
}

/// `tsw targets`
fn parse_targets(args: &[&str]) -> Result<Command, String> {
    if args.len() > 1 {
        return Err("Usage: tsw targets".into());
    }
    Ok(Command::Targets)
}

/// `tsw build|run --local-ws <n> --global-ws <n> [--target <name>]`
///
/// Both size flags are required and must be powers of two, since only
/// power-of-two points exist on the grid.
fn parse_point(args: &[&str], verb: &str) -> Result<Command, String> {
    let rest = &args[1..];
    let mut target = None;
    let mut local_ws = None;
    let mut global_ws = None;
    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            "--target" => {
                i += 1;
                target = Some(take_arg(rest, i, "--target")?);
            }
            "--local-ws" => {
                i += 1;
                local_ws = Some(parse_size(&take_arg(rest, i, "--local-ws")?, "--local-ws")?);
            }
            "--global-ws" => {
                i += 1;
                global_ws = Some(parse_size(&take_arg(rest, i, "--global-ws")?, "--global-ws")?);
            }
            other => return Err(format!("Unknown {} flag: '{}'", verb, other)),
        }
        i += 1;
    }
    let usage = format!(
        "Usage: tsw {} --local-ws <n> --global-ws <n> [--target <name>]",
        verb
    );
    let local_ws = local_ws.ok_or_else(|| usage.clone())?;
    let global_ws = global_ws.ok_or(usage)?;
    if local_ws > global_ws {
        return Err(format!(
            "local-ws {} exceeds global-ws {}",
            local_ws, global_ws
        ));
    }
    match verb {
        "build" => Ok(Command::Build {
            target,
            local_ws,
            global_ws,
        }),
        _ => Ok(Command::Run {
            target,
            local_ws,
            global_ws,
        }),
    }
}

/// `tsw sweep [--target <name>] [--keep-going] [--skip-existing]`
fn parse_sweep(args: &[&str]) -> Result<Command, String> {
    let rest = &args[1..];
    let mut target = None;
    let mut keep_going = false;
    let mut skip_existing = false;
    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            "--target" => {
                i += 1;
                target = Some(take_arg(rest, i, "--target")?);
            }
            "--keep-going" => keep_going = true,
            "--skip-existing" => skip_existing = true,
            other => return Err(format!("Unknown sweep flag: '{}'", other)),
        }
        i += 1;
    }
    Ok(Command::Sweep {
        target,
        keep_going,
        skip_existing,
    })
}

/// `tsw journal [--tail <n>]`
fn parse_journal(args: &[&str]) -> Result<Command, String> {
    let rest = &args[1..];
    let mut tail = None;
    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            "--tail" => {
                i += 1;
                let value = take_arg(rest, i, "--tail")?;
                let n: usize = value
                    .parse()
                    .map_err(|_| format!("--tail expects a number, got '{}'", value))?;
                tail = Some(n);
            }
            other => return Err(format!("Unknown journal flag: '{}'", other)),
        }
        i += 1;
    }
    Ok(Command::Journal { tail })
}

/// `tsw config`
fn parse_config(args: &[&str]) -> Result<Command, String> {
    if args.len() > 1 {
        return Err("Usage: tsw config".into());
    }
    Ok(Command::ConfigShow)
}

/// `tsw init [path]`
fn parse_init(args: &[&str]) -> Result<Command, String> {
    if args.len() > 2 {
        return Err("Usage: tsw init [path]".into());
    }
    Ok(Command::Init {
        path: args.get(1).map(|s| s.to_string()),
    })
}

/// `tsw help [topic]`
fn parse_help(args: &[&str]) -> Result<Command, String> {
    let topic = if args.len() > 1 {
        Some(args[1..].join(" "))
    } else {
        None
    };
    Ok(Command::Help { topic })
}


// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Take the value following a flag, or error if it's missing.
fn take_arg(args: &[&str], index: usize, flag: &str) -> Result<String, String> {
    if index >= args.len() {
        return Err(format!("{} requires a value", flag));
    }
    Ok(args[index].to_string())
}

/// Parse a work size value. Must be a nonzero power of two.
fn parse_size(value: &str, flag: &str) -> Result<u64, String> {
    let n: u64 = value
        .parse()
        .map_err(|_| format!("{} expects a number, got '{}'", flag, value))?;
    if !n.is_power_of_two() {
        return Err(format!("{} must be a power of two, got {}", flag, n));
    }
    Ok(n)
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Top-level dispatch --

    #[test]
    fn empty_args_error() {
        let err = parse_args(&[]).unwrap_err();
        assert!(err.contains("No command"));
    }

    #[test]
    fn unknown_command_error() {
        let err = parse_args(&["frobnicate"]).unwrap_err();
        assert!(err.contains("frobnicate"));
    }

    #[test]
    fn version_aliases() {
        assert_eq!(parse_args(&["version"]).unwrap(), Command::Version);
        assert_eq!(parse_args(&["--version"]).unwrap(), Command::Version);
        assert_eq!(parse_args(&["-V"]).unwrap(), Command::Version);
    }

    // -- grid / targets --

    #[test]
    fn grid_defaults_to_configured_target() {
        assert_eq!(parse_args(&["grid"]).unwrap(), Command::Grid { target: None });
    }

    #[test]
    fn grid_with_target() {
        let cmd = parse_args(&["grid", "--target", "cl-mem"]).unwrap();
        assert_eq!(
            cmd,
            Command::Grid {
                target: Some("cl-mem".into())
            }
        );
    }

    #[test]
    fn grid_rejects_unknown_flag() {
        let err = parse_args(&["grid", "--local-ws", "32"]).unwrap_err();
        assert!(err.contains("--local-ws"));
    }

    #[test]
    fn targets_takes_no_args() {
        assert_eq!(parse_args(&["targets"]).unwrap(), Command::Targets);
        assert!(parse_args(&["targets", "extra"]).is_err());
    }

    // -- build / run --

    #[test]
    fn build_with_both_sizes() {
        let cmd = parse_args(&["build", "--local-ws", "32", "--global-ws", "1024"]).unwrap();
        assert_eq!(
            cmd,
            Command::Build {
                target: None,
                local_ws: 32,
                global_ws: 1024,
            }
        );
    }

    #[test]
    fn run_with_target() {
        let cmd = parse_args(&[
            "run",
            "--target",
            "cl-mandelbrot",
            "--local-ws",
            "64",
            "--global-ws",
            "64",
        ])
        .unwrap();
        assert_eq!(
            cmd,
            Command::Run {
                target: Some("cl-mandelbrot".into()),
                local_ws: 64,
                global_ws: 64,
            }
        );
    }

    #[test]
    fn build_requires_both_sizes() {
        let err = parse_args(&["build", "--local-ws", "32"]).unwrap_err();
        assert!(err.contains("Usage: tsw build"));
        let err = parse_args(&["build"]).unwrap_err();
        assert!(err.contains("Usage: tsw build"));
    }

    #[test]
    fn sizes_must_be_powers_of_two() {
        let err = parse_args(&["build", "--local-ws", "33", "--global-ws", "64"]).unwrap_err();
        assert!(err.contains("power of two"));
    }

    #[test]
    fn local_must_not_exceed_global() {
        let err = parse_args(&["run", "--local-ws", "128", "--global-ws", "64"]).unwrap_err();
        assert!(err.contains("exceeds"));
    }

    #[test]
    fn size_value_must_be_numeric() {
        let err = parse_args(&["build", "--local-ws", "big", "--global-ws", "64"]).unwrap_err();
        assert!(err.contains("expects a number"));
    }

    #[test]
    fn flag_missing_value() {
        let err = parse_args(&["build", "--local-ws"]).unwrap_err();
        assert!(err.contains("--local-ws requires a value"));
    }

    // -- sweep --

    #[test]
    fn sweep_defaults() {
        assert_eq!(
            parse_args(&["sweep"]).unwrap(),
            Command::Sweep {
                target: None,
                keep_going: false,
                skip_existing: false,
            }
        );
    }

    #[test]
    fn sweep_all_flags() {
        let cmd = parse_args(&[
            "sweep",
            "--target",
            "cl-mem",
            "--keep-going",
            "--skip-existing",
        ])
        .unwrap();
        assert_eq!(
            cmd,
            Command::Sweep {
                target: Some("cl-mem".into()),
                keep_going: true,
                skip_existing: true,
            }
        );
    }

    // -- journal / config / init / help --

    #[test]
    fn journal_tail() {
        assert_eq!(
            parse_args(&["journal"]).unwrap(),
            Command::Journal { tail: None }
        );
        assert_eq!(
            parse_args(&["journal", "--tail", "5"]).unwrap(),
            Command::Journal { tail: Some(5) }
        );
        assert!(parse_args(&["journal", "--tail", "many"]).is_err());
    }

    #[test]
    fn config_show() {
        assert_eq!(parse_args(&["config"]).unwrap(), Command::ConfigShow);
    }

    #[test]
    fn init_with_and_without_path() {
        assert_eq!(parse_args(&["init"]).unwrap(), Command::Init { path: None });
        assert_eq!(
            parse_args(&["init", "custom.yaml"]).unwrap(),
            Command::Init {
                path: Some("custom.yaml".into())
            }
        );
    }

    #[test]
    fn help_topic() {
        assert_eq!(parse_args(&["help"]).unwrap(), Command::Help { topic: None });
        assert_eq!(
            parse_args(&["help", "sweep"]).unwrap(),
            Command::Help {
                topic: Some("sweep".into())
            }
        );
    }
}
