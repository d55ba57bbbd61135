//! Remote host configuration.
//!
//! `HostConfig` describes one SSH-reachable host (the build machine or the
//! benchmark device) and assembles the program/argument vectors for ssh and
//! rsync invocations. Password authentication goes through `sshpass -p`;
//! key authentication passes `-i`; with neither, whatever the ambient SSH
//! agent provides is used.

use serde::{Deserialize, Serialize};

fn default_port() -> u16 {
    22
}

fn default_workspace() -> String {
    ".".to_string()
}

// ---------------------------------------------------------------------------
// HostConfig
// ---------------------------------------------------------------------------

/// Configuration for a single remote host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HostConfig {
    /// Short name used in messages (e.g. "buildvm", "imx8").
    pub name: String,
    /// Hostname or IP address.
    pub host: String,
    /// SSH user.
    pub user: String,
    /// SSH port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path to an SSH private key, if not using the default.
    #[serde(default)]
    pub ssh_key: Option<String>,
    /// Password fed to ssh via sshpass, if the host wants one.
    #[serde(default)]
    pub password: Option<String>,
    /// Working directory on the host, relative to the login home.
    #[serde(default = "default_workspace")]
    pub workspace: String,
}

impl HostConfig {
    /// Build the `user@host` string used in SSH/rsync commands.
    pub fn user_at_host(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// Build base SSH arguments (port, options, key, user@host) without a
    /// command.
    pub fn ssh_base_args(&self) -> Vec<String> {
        let mut args = vec![
            "-p".to_string(),
            self.port.to_string(),
            "-o".to_string(),
            "StrictHostKeyChecking=no".to_string(),
            "-o".to_string(),
            "ConnectTimeout=10".to_string(),
        ];
        if let Some(ref key) = self.ssh_key {
            args.push("-i".to_string());
            args.push(key.clone());
        }
        args.push(self.user_at_host());
        args
    }

    /// `user@host:path`, as rsync sources and destinations want it.
    pub fn remote_spec(&self, path: &str) -> String {
        format!("{}:{}", self.user_at_host(), path)
    }

    /// The `-e` transport string for rsync: ssh with port and optional key.
    pub fn rsync_transport(&self) -> String {
        let mut ssh_cmd = format!("ssh -p {}", self.port);
        ssh_cmd.push_str(" -o StrictHostKeyChecking=no");
        if let Some(ref key) = self.ssh_key {
            ssh_cmd.push_str(&format!(" -i {}", key));
        }
        ssh_cmd
    }

    /// Program and argument vector for running one command on this host.
    pub fn ssh_invocation(&self, command: &str) -> (String, Vec<String>) {
        let mut args = Vec::new();
        let program = match self.password {
            Some(ref password) => {
                args.push("-p".to_string());
                args.push(password.clone());
                args.push("ssh".to_string());
                "sshpass".to_string()
            }
            None => "ssh".to_string(),
        };
        args.extend(self.ssh_base_args());
        args.push(command.to_string());
        (program, args)
    }

    /// Program and argument vector for an rsync whose transport is this host.
    /// The caller supplies the rsync arguments; sshpass is prepended when the
    /// host authenticates by password.
    pub fn rsync_invocation(&self, rsync_args: Vec<String>) -> (String, Vec<String>) {
        match self.password {
            Some(ref password) => {
                let mut args = vec![
                    "-p".to_string(),
                    password.clone(),
                    "rsync".to_string(),
                ];
                args.extend(rsync_args);
                ("sshpass".to_string(), args)
            }
            None => ("rsync".to_string(), rsync_args),
        }
    }
}

/// Join a path onto a remote workspace. A workspace of `.` or `""` means the
/// login home, in which case the path stands alone.
pub fn remote_join(workspace: &str, path: &str) -> String {
    if workspace.is_empty() || workspace == "." {
        path.to_string()
    } else {
        format!("{}/{}", workspace.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> HostConfig {
        HostConfig {
            name: "buildvm".into(),
            host: "vm".into(),
            user: "user".into(),
            port: 22,
            ssh_key: None,
            password: None,
            workspace: "cl-bench".into(),
        }
    }

    #[test]
    fn ssh_base_args_default() {
        let args = host().ssh_base_args();
        assert_eq!(
            args,
            vec![
                "-p",
                "22",
                "-o",
                "StrictHostKeyChecking=no",
                "-o",
                "ConnectTimeout=10",
                "user@vm"
            ]
        );
    }

    #[test]
    fn ssh_base_args_with_key() {
        let mut h = host();
        h.ssh_key = Some("/home/user/.ssh/bench".into());
        let args = h.ssh_base_args();
        assert!(args.contains(&"-i".to_string()));
        assert!(args.contains(&"/home/user/.ssh/bench".to_string()));
        assert_eq!(args.last().map(|s| s.as_str()), Some("user@vm"));
    }

    #[test]
    fn ssh_invocation_without_password() {
        let (program, args) = host().ssh_invocation("rm -rf cl-bench");
        assert_eq!(program, "ssh");
        assert_eq!(args.last().map(|s| s.as_str()), Some("rm -rf cl-bench"));
    }

    #[test]
    fn ssh_invocation_with_password_uses_sshpass() {
        let mut h = host();
        h.password = Some("asdf".into());
        let (program, args) = h.ssh_invocation("ls");
        assert_eq!(program, "sshpass");
        assert_eq!(&args[..3], &["-p", "asdf", "ssh"]);
        assert_eq!(args.last().map(|s| s.as_str()), Some("ls"));
    }

    #[test]
    fn rsync_invocation_with_password_uses_sshpass() {
        let mut h = host();
        h.password = Some("asdf".into());
        let (program, args) = h.rsync_invocation(vec!["-a".into(), "src/".into()]);
        assert_eq!(program, "sshpass");
        assert_eq!(&args[..3], &["-p", "asdf", "rsync"]);
        assert_eq!(&args[3..], &["-a", "src/"]);
    }

    #[test]
    fn remote_spec_formats_user_host_path() {
        assert_eq!(host().remote_spec("cl-bench"), "user@vm:cl-bench");
    }

    #[test]
    fn rsync_transport_includes_port_and_key() {
        let mut h = host();
        h.port = 2222;
        h.ssh_key = Some("key.pem".into());
        assert_eq!(
            h.rsync_transport(),
            "ssh -p 2222 -o StrictHostKeyChecking=no -i key.pem"
        );
    }

    #[test]
    fn remote_join_handles_home_workspace() {
        assert_eq!(remote_join(".", "cl-mem"), "cl-mem");
        assert_eq!(remote_join("", "cl-mem"), "cl-mem");
        assert_eq!(remote_join("cl-bench/", "target/cl-mem"), "cl-bench/target/cl-mem");
        assert_eq!(remote_join("work", "a.csv"), "work/a.csv");
    }

    #[test]
    fn host_config_parses_with_defaults() {
        let yaml = "name: imx8\nhost: imx8\nuser: root\n";
        let h: HostConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(h.port, 22);
        assert_eq!(h.workspace, ".");
        assert!(h.password.is_none());
        assert!(h.ssh_key.is_none());
    }
}
