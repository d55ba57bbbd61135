//! tsw CLI — the command-line entry point for the thermal sweep driver.
//!
//! # Usage
//!
//! ```text
//! tsw init
//! tsw grid
//! tsw build --local-ws 32 --global-ws 1024
//! tsw sweep --target cl-mem --skip-existing
//! tsw journal --tail 10
//! ```

use std::path::{Path, PathBuf};
use std::process;

use thermosweep_core::app::App;
use thermosweep_core::cli::parse_args;
use thermosweep_core::command::Command;
use thermosweep_core::config::{self, SweepConfig};
use thermosweep_core::help::help_text;


fn main() {
    let args: Vec<String> = std::env::args().collect();
    let arg_refs: Vec<&str> = args[1..].iter().map(|s| s.as_str()).collect();

    let cmd = match parse_args(&arg_refs) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("tsw: {}", e);
            process::exit(1);
        }
    };

    // Help, version and init need no configuration file, so they are
    // answered before one is loaded.
    match &cmd {
        Command::Help { topic } => {
            println!("{}", help_text(topic.as_deref()));
            return;
        }
        Command::Version => {
            println!("tsw {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        Command::Init { path } => {
            match write_starter_config(path.as_deref()) {
                Ok(msg) => println!("{}", msg),
                Err(e) => {
                    eprintln!("tsw: {}", e);
                    process::exit(1);
                }
            }
            return;
        }
        _ => {}
    }

    let config_path = resolve_config_path();
    let config = match config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("tsw: {}", e);
            process::exit(1);
        }
    };

    let app = App::new(config);
    match app.execute(cmd) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("tsw error: {}", e);
            process::exit(1);
        }
    }
}


fn resolve_config_path() -> PathBuf {
    if let Ok(path) = std::env::var("TSW_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("thermosweep.yaml")
}


fn write_starter_config(path: Option<&str>) -> Result<String, String> {
    let path = Path::new(path.unwrap_or("thermosweep.yaml"));
    if path.exists() {
        return Err(format!("{} already exists, not overwriting", path.display()));
    }
    std::fs::write(path, SweepConfig::example())
        .map_err(|e| format!("cannot write {}: {}", path.display(), e))?;
    Ok(format!(
        "wrote starter configuration to {} (edit the hosts and targets before sweeping)",
        path.display()
    ))
}
