//! CLI argument parsing for the `tsw` binary.

pub mod parse;

pub use parse::parse_args;
