use std::process::Stdio;
use std::time::Duration;

use anyhow::Context;
use domain::service::{ProcessChecker, ProcessState};
use tokio::process::Command;
use typed_builder::TypedBuilder;

/// Probes a pid with `ps -p`, through `sudo` when jobs run as their user.
#[derive(Debug, Clone, TypedBuilder)]
pub struct UnixProcessChecker {
    /// Upper bound for a single probe.
    #[builder(default = Duration::from_secs(86400))]
    timeout: Duration,
    #[builder(default)]
    run_as_user: bool,
    #[builder(default = vec!["ps".to_owned(), "-p".to_owned()])]
    probe: Vec<String>,
}

impl UnixProcessChecker {
    fn command_line(&self, pid: u32) -> Vec<String> {
        let mut args = Vec::with_capacity(self.probe.len() + 2);
        if self.run_as_user {
            args.push("sudo".to_owned());
        }
        args.extend(self.probe.iter().cloned());
        args.push(pid.to_string());
        args
    }
}

#[async_trait::async_trait]
impl ProcessChecker for UnixProcessChecker {
    async fn check_process(&self, pid: u32) -> anyhow::Result<ProcessState> {
        let args = self.command_line(pid);
        let (program, rest) = args.split_first().context("Empty process probe")?;

        let status = Command::new(program)
            .args(rest)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status();
        let status = tokio::time::timeout(self.timeout, status)
            .await
            .with_context(|| format!("Probing process {pid} timed out"))?
            .with_context(|| format!("Failed to run {program}"))?;

        Ok(if status.success() {
            ProcessState::Alive
        } else {
            ProcessState::Dead
        })
    }
}
