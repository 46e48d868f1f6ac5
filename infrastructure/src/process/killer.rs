use std::process::Stdio;

use anyhow::{bail, Context};
use domain::service::ProcessKiller;
use tokio::process::Command;

/// Sends `SIGTERM` with `kill`, through `sudo` for jobs running as their user.
#[derive(Debug, Clone, Default)]
pub struct UnixProcessKiller;

fn command_line(pid: u32, run_as_user: bool) -> Vec<String> {
    let mut args = Vec::with_capacity(3);
    if run_as_user {
        args.push("sudo".to_owned());
    }
    args.push("kill".to_owned());
    args.push(pid.to_string());
    args
}

#[async_trait::async_trait]
impl ProcessKiller for UnixProcessKiller {
    async fn kill(&self, pid: u32, run_as_user: bool) -> anyhow::Result<()> {
        let args = command_line(pid, run_as_user);
        let (program, rest) = args.split_first().context("Empty kill command")?;

        let output = Command::new(program)
            .args(rest)
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("Failed to run {program}"))?;
        if !output.status.success() {
            bail!(
                "Unable to kill process {pid}: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(())
    }
}
