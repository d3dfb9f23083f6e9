use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::models::job::Job;

/// Runs a job's payload through the external evaluator and returns its raw stdout.
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, job: &Job) -> Result<String, LaunchError>;
}

/// Settings for the process-backed evaluator.
#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    pub command: String,
    pub args: Vec<String>,
    pub timeout: Duration,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub staged_extension: String,
}

/// Where a job's payload is staged and where its artifacts go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedPaths {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Stages payloads on disk and launches the evaluator as a subprocess, one at a time.
#[derive(Debug, Clone)]
pub struct ProcessEvaluator {
    config: EvaluatorConfig,
}

impl ProcessEvaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    /// Deterministic staging paths for a job, unique per submitter and job id.
    pub fn staged_paths(&self, job: &Job) -> StagedPaths {
        let stem = format!("{}_{}", sanitize_name(&job.submitter_name), job.id);
        StagedPaths {
            input: self
                .config
                .input_dir
                .join(format!("{}.{}", stem, self.config.staged_extension)),
            output: self.config.output_dir.join(format!("{}_output.txt", stem)),
        }
    }

    async fn stage(&self, job: &Job) -> Result<StagedPaths, LaunchError> {
        let paths = self.staged_paths(job);

        for dir in [&self.config.input_dir, &self.config.output_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| LaunchError::Stage {
                    path: dir.clone(),
                    source,
                })?;
        }

        tokio::fs::write(&paths.input, job.payload.as_bytes())
            .await
            .map_err(|source| LaunchError::Stage {
                path: paths.input.clone(),
                source,
            })?;

        Ok(paths)
    }

    async fn run(&self, job: &Job, input: &Path) -> Result<String, LaunchError> {
        let mut command = Command::new(&self.config.command);
        command
            .args(&self.config.args)
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group, so a timeout can take down everything the evaluator started.
        #[cfg(unix)]
        command.process_group(0);

        let child = command.spawn().map_err(|source| LaunchError::Spawn {
            command: self.config.command.clone(),
            source,
        })?;
        let pid = child.id();

        let output = match tokio::time::timeout(self.config.timeout, child.wait_with_output()).await
        {
            Ok(result) => result.map_err(LaunchError::Wait)?,
            Err(_) => {
                if let Some(pid) = pid {
                    kill_process_group(job, pid);
                }
                return Err(LaunchError::Timeout(self.config.timeout));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !stderr.is_empty() {
            tracing::debug!(job_id = %job.id, stderr = %stderr, "Evaluator stderr");
        }

        if !output.status.success() {
            return Err(LaunchError::NonZeroExit {
                code: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(stdout)
    }
}

#[async_trait]
impl Evaluator for ProcessEvaluator {
    async fn evaluate(&self, job: &Job) -> Result<String, LaunchError> {
        let paths = self.stage(job).await?;

        tracing::debug!(
            job_id = %job.id,
            staged = %paths.input.display(),
            command = %self.config.command,
            "Launching evaluator"
        );

        let stdout = self.run(job, &paths.input).await?;

        if let Err(e) = tokio::fs::write(&paths.output, stdout.as_bytes()).await {
            tracing::warn!(
                job_id = %job.id,
                path = %paths.output.display(),
                error = %e,
                "Failed to write evaluator artifact"
            );
        }

        Ok(stdout)
    }
}

#[cfg(unix)]
fn kill_process_group(job: &Job, pid: u32) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    match killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        Ok(()) => tracing::warn!(job_id = %job.id, pgid = pid, "Killed timed-out evaluator"),
        // ESRCH: the whole group already exited.
        Err(nix::errno::Errno::ESRCH) => {}
        Err(e) => tracing::error!(
            job_id = %job.id,
            pgid = pid,
            error = %e,
            "Failed to kill evaluator process group"
        ),
    }
}

#[cfg(not(unix))]
fn kill_process_group(_job: &Job, _pid: u32) {}

/// Keep submitter names filesystem-safe: anything outside `[A-Za-z0-9_-]` becomes `_`.
fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "anonymous".to_string()
    } else {
        cleaned
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("Failed to stage submission at {path}: {source}")]
    Stage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to spawn evaluator '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed waiting for evaluator: {0}")]
    Wait(#[source] std::io::Error),

    #[error("Evaluator exited with status {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },

    #[error("Evaluator timed out after {0:?}")]
    Timeout(Duration),
}
