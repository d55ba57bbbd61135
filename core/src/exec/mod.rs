//! Child-process execution.
//!
//! Provides the `CommandRunner` trait through which every external command
//! (ssh, sshpass, rsync) is spawned, along with the production and test
//! implementations. Keeping process spawning behind one seam lets the
//! orchestration layers be exercised without touching the network.

pub mod runner;

pub use runner::{CommandOutput, CommandRunner, MockRunner, ShellRunner};
