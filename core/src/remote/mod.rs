//! Remote host access — SSH coordinates, per-command execution, rsync.
//!
//! Everything the orchestrators need to talk to the build host and the
//! device: host configuration with ssh/sshpass/rsync argument assembly,
//! a structured one-command-per-invocation remote shell, and mirror
//! push / file pull helpers. No process is spawned here directly; all
//! execution goes through the `CommandRunner` seam.

pub mod host;
pub mod shell;
pub mod sync;

pub use host::{remote_join, HostConfig};
pub use shell::RemoteShell;
pub use sync::Mirror;
