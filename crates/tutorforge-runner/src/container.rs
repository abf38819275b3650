//! The Container Runner (C1): one-shot execution of a compile/run command
//! chain inside an isolated, auto-removed Docker container, with no
//! network, a hard memory cap, a fractional CPU share, and a wall-clock
//! timeout enforced by the calling process.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use tutorforge_core::traits::{ContainerRunner, ExecutionResult};

/// Host-side timeout exit code (§4.1): `tokio::time::timeout` firing before
/// the container itself exits.
pub const EXIT_TIMEOUT: i32 = 124;
/// Container killed for exceeding its memory cap.
pub const EXIT_OOM_KILLED: i32 = 137;
/// Segmentation fault, observed as either of two conventional exit codes.
pub const EXIT_SEGFAULT_A: i32 = 139;
pub const EXIT_SEGFAULT_B: i32 = 11;

pub fn is_segfault(exit_code: i32) -> bool {
    exit_code == EXIT_SEGFAULT_A || exit_code == EXIT_SEGFAULT_B
}

#[derive(Debug, Clone)]
pub struct ContainerConfig {
    pub image: String,
    pub memory_limit_mb: u64,
    pub cpu_limit: f64,
    pub wall_clock_timeout: Duration,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            image: "tutorforge-sandbox:latest".to_string(),
            memory_limit_mb: 256,
            cpu_limit: 0.5,
            wall_clock_timeout: Duration::from_secs(5),
        }
    }
}

/// Shells out to the `docker` CLI for every run: spawns a fresh, `--rm`
/// container per command chain rather than keeping one alive across
/// submissions, so a wedged or compromised program can never affect a
/// later investigation.
pub struct DockerContainerRunner {
    config: ContainerConfig,
}

impl DockerContainerRunner {
    pub fn new(config: ContainerConfig) -> Self {
        Self { config }
    }

    fn docker_args(&self, work_dir: &Path, shell_script: &str) -> Vec<String> {
        vec![
            "run".to_string(),
            "--rm".to_string(),
            "-i".to_string(),
            "--network".to_string(),
            "none".to_string(),
            "--memory".to_string(),
            format!("{}m", self.config.memory_limit_mb),
            "--cpus".to_string(),
            self.config.cpu_limit.to_string(),
            "-v".to_string(),
            format!("{}:/workspace", work_dir.display()),
            "-w".to_string(),
            "/workspace".to_string(),
            self.config.image.clone(),
            "bash".to_string(),
            "-c".to_string(),
            shell_script.to_string(),
        ]
    }
}

#[async_trait]
impl ContainerRunner for DockerContainerRunner {
    /// Chains `commands` with `&&` so an earlier failure short-circuits the
    /// rest; `stdin` is piped directly to the spawned `docker` process's own
    /// stdin handle, never interpolated into the shell script (§4.1
    /// resolution of the stdin-escaping open question).
    async fn run(
        &self,
        commands: &[Vec<String>],
        stdin: &[u8],
        work_dir: &Path,
    ) -> Result<ExecutionResult> {
        let script = commands
            .iter()
            .map(|argv| shell_join(argv))
            .collect::<Vec<_>>()
            .join(" && ");

        let mut cmd = Command::new("docker");
        cmd.args(self.docker_args(work_dir, &script))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().context("failed to spawn docker")?;

        if let Some(mut handle) = child.stdin.take() {
            let stdin = stdin.to_vec();
            handle
                .write_all(&stdin)
                .await
                .context("failed to write stdin to container")?;
            drop(handle);
        }

        let output = match tokio::time::timeout(self.config.wall_clock_timeout, child.wait_with_output()).await {
            Ok(result) => result.context("failed to wait for docker container")?,
            Err(_) => {
                return Ok(ExecutionResult {
                    exit_code: EXIT_TIMEOUT,
                    stdout: String::new(),
                    stderr: "execution timed out".to_string(),
                    timed_out: true,
                });
            }
        };

        let exit_code = output.status.code().unwrap_or(EXIT_OOM_KILLED);
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let mut stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if is_segfault(exit_code) && stderr.trim().is_empty() {
            stderr = "Segmentation Fault".to_string();
        }

        Ok(ExecutionResult {
            exit_code,
            stdout,
            stderr,
            timed_out: false,
        })
    }
}

/// Quotes each argument for the shell script handed to `bash -c`; arguments
/// never contain user-controlled data (only fixed compiler invocations), so
/// single-quote wrapping with embedded-quote escaping is sufficient.
fn shell_join(argv: &[String]) -> String {
    argv.iter()
        .map(|arg| format!("'{}'", arg.replace('\'', "'\\''")))
        .collect::<Vec<_>>()
        .join(" ")
}
