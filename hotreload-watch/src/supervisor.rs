//! Build process supervisor.
//!
//! The bundler runs through the platform shell in its own process group so a
//! terminal Ctrl-C reaches hotreload only; hotreload then tears the whole
//! group down (SIGTERM, grace period, SIGKILL).

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::sync::broadcast;

use crate::error::{io_err, WatchError};

/// How supervision ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The process exited on its own.
    Exited(ExitStatus),
    /// Shutdown was requested and the process was torn down.
    Terminated,
}

/// A running build command.
#[derive(Debug)]
pub struct BuildProcess {
    command: String,
    child: Child,
}

impl BuildProcess {
    /// Spawn `command` through the platform shell with `dir` as working directory.
    pub fn spawn(command: &str, dir: &Path) -> Result<Self, WatchError> {
        let mut std_cmd = shell_command(command);
        std_cmd
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            std_cmd.process_group(0);
        }

        let mut cmd = Command::from(std_cmd);
        cmd.kill_on_drop(true);
        let child = cmd.spawn().map_err(|e| io_err(dir, e))?;
        tracing::info!(command = %command, pid = ?child.id(), "build process started");
        Ok(Self {
            command: command.to_string(),
            child,
        })
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Non-blocking liveness check.
    pub fn try_exit(&mut self) -> Result<Option<ExitStatus>, WatchError> {
        self.child
            .try_wait()
            .map_err(|e| io_err("build process", e))
    }

    /// Terminate the process group: SIGTERM, wait up to `grace`, then SIGKILL.
    pub async fn terminate(mut self, grace: Duration) -> Result<ExitStatus, WatchError> {
        if let Some(status) = self.try_exit()? {
            return Ok(status);
        }

        #[cfg(unix)]
        if let Some(pid) = self.child.id() {
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;

            let pgid = Pid::from_raw(pid as i32);
            tracing::debug!(pgid = pid, "sending SIGTERM to build process group");
            let _ = killpg(pgid, Signal::SIGTERM);

            if let Ok(status) = tokio::time::timeout(grace, self.child.wait()).await {
                return status.map_err(|e| io_err("build process", e));
            }

            tracing::debug!(pgid = pid, "sending SIGKILL to build process group");
            let _ = killpg(pgid, Signal::SIGKILL);
        }

        #[cfg(not(unix))]
        let _ = grace;

        let _ = self.child.start_kill();
        self.child
            .wait()
            .await
            .map_err(|e| io_err("build process", e))
    }
}

/// Poll `process` every `poll` until it exits or shutdown is requested.
pub async fn supervise(
    mut process: BuildProcess,
    poll: Duration,
    grace: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<BuildOutcome, WatchError> {
    let mut interval = tokio::time::interval(poll);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                let status = process.terminate(grace).await?;
                tracing::info!(status = %status, "build process stopped");
                return Ok(BuildOutcome::Terminated);
            }
            _ = interval.tick() => {
                if let Some(status) = process.try_exit()? {
                    return Ok(BuildOutcome::Exited(status));
                }
            }
        }
    }
}

#[cfg(unix)]
fn shell_command(command: &str) -> std::process::Command {
    let mut cmd = std::process::Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(not(unix))]
fn shell_command(command: &str) -> std::process::Command {
    let mut cmd = std::process::Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Instant;
    use tempfile::TempDir;

    #[tokio::test]
    async fn exited_process_is_reported() {
        let dir = TempDir::new().unwrap();
        let process = BuildProcess::spawn("exit 3", dir.path()).unwrap();
        let (_tx, rx) = broadcast::channel(1);

        let outcome = supervise(process, Duration::from_millis(20), Duration::from_secs(1), rx)
            .await
            .unwrap();
        match outcome {
            BuildOutcome::Exited(status) => assert_eq!(status.code(), Some(3)),
            other => panic!("expected exit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn shutdown_terminates_long_running_build() {
        let dir = TempDir::new().unwrap();
        let process = BuildProcess::spawn("sleep 30", dir.path()).unwrap();
        let (tx, rx) = broadcast::channel(1);

        let started = Instant::now();
        let handle = tokio::spawn(supervise(
            process,
            Duration::from_millis(20),
            Duration::from_secs(1),
            rx,
        ));
        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send(()).unwrap();

        let outcome = handle.await.unwrap().unwrap();
        assert_eq!(outcome, BuildOutcome::Terminated);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn runs_in_requested_directory() {
        let dir = TempDir::new().unwrap();
        let mut process = BuildProcess::spawn("touch built.marker", dir.path()).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while process.try_exit().unwrap().is_none() && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(dir.path().join("built.marker").exists());
    }
}
