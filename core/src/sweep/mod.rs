//! Sweep orchestration.
//!
//! The three layers of a sweep: `build` rebuilds the benchmark on the build
//! host with a grid point's sizes baked in, `run` deploys the artifact and
//! drives the monitoring wrapper on the device, and `driver` walks the grid
//! calling both with progress markers, journal records, and the failure
//! policy.

pub mod build;
pub mod driver;
pub mod run;

pub use build::{BuildOrchestrator, BuildSpec};
pub use driver::{SweepDriver, SweepSummary};
pub use run::{result_file_name, RunOrchestrator, EX_TEMPFAIL};
