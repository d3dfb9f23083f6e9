//! Process evaluator tests. These shell out to `sh`, so they assume a Unix host.

use std::path::PathBuf;
use std::time::{Duration, Instant};
use submission_grader::models::job::{Job, JobStatus};
use submission_grader::services::evaluator::{
    Evaluator, EvaluatorConfig, LaunchError, ProcessEvaluator,
};
use submission_grader::services::result_parser;
use uuid::Uuid;

/// Scratch directory unique to one test.
fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("grader-test-{}", Uuid::new_v4()))
}

/// Evaluator running `sh -c <script> <staged file>`; the staged path is `$0`.
fn shell_evaluator(root: &PathBuf, script: &str, timeout: Duration) -> ProcessEvaluator {
    ProcessEvaluator::new(EvaluatorConfig {
        command: "sh".to_string(),
        args: vec!["-c".to_string(), script.to_string()],
        timeout,
        input_dir: root.join("decoded"),
        output_dir: root.join("output"),
        staged_extension: "ipynb".to_string(),
    })
}

fn job(payload: &str) -> Job {
    Job {
        id: Uuid::new_v4(),
        submitter_name: "Grace Hopper".to_string(),
        payload: payload.to_string(),
        enqueued_at: "01-01-2024 10:00".to_string(),
        status: JobStatus::Pending,
        score: 0.0,
    }
}

#[tokio::test]
async fn test_stages_payload_and_captures_stdout() {
    let root = scratch_dir();
    let evaluator = shell_evaluator(
        &root,
        r#"echo "grading $0"; cat "$0" >/dev/null; echo '{"accuracy": 0.9}'"#,
        Duration::from_secs(10),
    );
    let job = job("{\"cells\": []}");

    let output = evaluator.evaluate(&job).await.unwrap();
    assert!(output.starts_with("grading "));
    assert_eq!(result_parser::parse_score(&output).unwrap(), 90.0);

    let paths = evaluator.staged_paths(&job);
    assert_eq!(std::fs::read_to_string(&paths.input).unwrap(), "{\"cells\": []}");
    assert_eq!(std::fs::read_to_string(&paths.output).unwrap(), output);

    std::fs::remove_dir_all(root).ok();
}

#[tokio::test]
async fn test_evaluator_receives_staged_path_as_last_argument() {
    let root = scratch_dir();
    let evaluator = shell_evaluator(&root, r#"echo "$0""#, Duration::from_secs(10));
    let job = job("x = 1");

    let output = evaluator.evaluate(&job).await.unwrap();
    let paths = evaluator.staged_paths(&job);
    assert_eq!(PathBuf::from(output.trim()), paths.input);

    std::fs::remove_dir_all(root).ok();
}

#[tokio::test]
async fn test_non_zero_exit_is_launch_error() {
    let root = scratch_dir();
    let evaluator = shell_evaluator(
        &root,
        r#"echo '{"accuracy": 99}'; echo 'traceback' >&2; exit 3"#,
        Duration::from_secs(10),
    );

    let err = evaluator.evaluate(&job("x")).await.unwrap_err();
    match err {
        LaunchError::NonZeroExit { code, stderr } => {
            assert_eq!(code, Some(3));
            assert_eq!(stderr, "traceback");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    std::fs::remove_dir_all(root).ok();
}

#[tokio::test]
async fn test_missing_executable_is_spawn_error() {
    let root = scratch_dir();
    let evaluator = ProcessEvaluator::new(EvaluatorConfig {
        command: "/nonexistent/evaluator".to_string(),
        args: Vec::new(),
        timeout: Duration::from_secs(10),
        input_dir: root.join("decoded"),
        output_dir: root.join("output"),
        staged_extension: "ipynb".to_string(),
    });

    let err = evaluator.evaluate(&job("x")).await.unwrap_err();
    assert!(matches!(err, LaunchError::Spawn { .. }));

    std::fs::remove_dir_all(root).ok();
}

#[tokio::test]
async fn test_runaway_evaluator_times_out() {
    let root = scratch_dir();
    let evaluator = shell_evaluator(&root, "sleep 30", Duration::from_millis(200));

    let start = Instant::now();
    let err = evaluator.evaluate(&job("while True: pass")).await.unwrap_err();

    assert!(matches!(err, LaunchError::Timeout(_)));
    assert!(start.elapsed() < Duration::from_secs(10));

    std::fs::remove_dir_all(root).ok();
}

#[tokio::test]
async fn test_timeout_kills_processes_started_by_the_evaluator() {
    let root = scratch_dir();
    std::fs::create_dir_all(&root).unwrap();
    let marker = root.join("compiler-finished");

    let script = format!("(sleep 1; touch '{}'); echo done", marker.display());
    let evaluator = shell_evaluator(&root, &script, Duration::from_millis(200));

    let err = evaluator.evaluate(&job("print(1)")).await.unwrap_err();
    assert!(matches!(err, LaunchError::Timeout(_)));

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(
        !marker.exists(),
        "a process started by the evaluator kept running after the timeout"
    );

    std::fs::remove_dir_all(root).ok();
}
