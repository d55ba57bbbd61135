//! Thermosweep — thermal benchmark sweep driver.
//!
//! This crate walks a grid of power-of-two work sizes over one or more
//! OpenCL-style benchmarks: for each grid point it rebuilds the benchmark
//! on a build host, runs the binary on an embedded device under a thermal
//! monitor, and collects the per-run CSV. Everything remote goes over
//! plain ssh/rsync invocations through the [`exec::CommandRunner`] trait,
//! so the whole pipeline is testable without any host at all.
//!
//! # Modules
//!
//! - [`app`] — Command dispatch around a loaded configuration
//! - [`cli`] — Argument parsing for the `tsw` binary
//! - [`command`] — The typed command enum
//! - [`config`] — YAML configuration (hosts, thermal settings, targets)
//! - [`error`] — The crate-wide error type
//! - [`exec`] — Command runner abstraction (real and mock)
//! - [`grid`] — Power-of-two work size grids
//! - [`help`] — CLI help text
//! - [`journal`] — Append-only JSONL sweep journal
//! - [`lock`] — Results-directory sweep lock
//! - [`remote`] — SSH/rsync plumbing for the build host and the device
//! - [`sweep`] — Build, run, and sweep orchestration

pub mod app;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod exec;
pub mod grid;
pub mod help;
pub mod journal;
pub mod lock;
pub mod remote;
pub mod sweep;
