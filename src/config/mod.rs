use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::services::evaluator::EvaluatorConfig;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000"). Optional for worker processes.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// PostgreSQL connection string
    pub database_url: String,

    /// Evaluator executable, invoked as `<command> [args...] <staged file>`
    pub evaluator_command: String,

    /// Extra arguments placed before the staged file path (comma-separated in the environment)
    #[serde(default)]
    pub evaluator_args: Vec<String>,

    /// Wall-clock bound for a single evaluator run
    #[serde(default = "default_evaluator_timeout_secs")]
    pub evaluator_timeout_secs: u64,

    /// Directory submissions are staged into before evaluation
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Directory reserved for evaluator artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Extension given to staged payload files
    #[serde(default = "default_staged_extension")]
    pub staged_extension: String,

    /// Delay between two dequeue passes
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Minimum normalized score for a `Success` verdict
    #[serde(default = "default_pass_threshold")]
    pub pass_threshold: f64,

    /// Prometheus listener for the worker process (e.g., "0.0.0.0:9100")
    #[serde(default)]
    pub worker_metrics_addr: Option<String>,

    /// Directory plagiarism comparisons may read from; defaults to `input_dir`
    #[serde(default)]
    pub compare_root: Option<PathBuf>,

    /// Connection pool size for the API server
    #[serde(default = "default_api_max_connections")]
    pub api_max_connections: u32,
}

/// The worker runs one query at a time; one spare covers a slow reconnect.
pub const WORKER_MAX_CONNECTIONS: u32 = 2;

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_evaluator_timeout_secs() -> u64 {
    300
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("decoded_notebooks")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_staged_extension() -> String {
    "ipynb".to_string()
}

fn default_poll_interval_ms() -> u64 {
    3000
}

fn default_pass_threshold() -> f64 {
    80.0
}

fn default_api_max_connections() -> u32 {
    8
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    pub fn evaluator(&self) -> EvaluatorConfig {
        EvaluatorConfig {
            command: self.evaluator_command.clone(),
            args: self.evaluator_args.clone(),
            timeout: Duration::from_secs(self.evaluator_timeout_secs),
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            staged_extension: self.staged_extension.clone(),
        }
    }

    pub fn compare_root(&self) -> PathBuf {
        self.compare_root
            .clone()
            .unwrap_or_else(|| self.input_dir.clone())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
