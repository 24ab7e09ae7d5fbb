//! Executor integration tests against real subprocesses.

use std::collections::BTreeSet;
use std::time::Duration;

use toolforge::services::{Executor, ExecutorConfig, ExitStatus, InstallPrompt};
use toolforge::{AppError, ToolRecord};

struct Decline;
impl InstallPrompt for Decline {
    fn confirm(&self, _command: &str) -> toolforge::AppResult<bool> {
        Ok(false)
    }
}

fn record(id: &str, code: &str, install: Vec<String>) -> ToolRecord {
    ToolRecord {
        id: id.to_string(),
        description: "integration test tool".to_string(),
        keywords: ["test"].iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
        install_dependencies: install,
        code: code.to_string(),
    }
}

fn sh_executor(work_dir: std::path::PathBuf, timeout: Duration) -> Executor {
    Executor::new(ExecutorConfig {
        timeout,
        interpreter: "sh".to_string(),
        work_dir,
    })
}

#[tokio::test]
async fn run_captures_output_and_artifact() {
    let tmp = tempfile::tempdir().unwrap();
    let executor = sh_executor(tmp.path().to_path_buf(), Duration::from_secs(10));
    let tool = record(
        "report_20260101120000",
        "echo working\necho '{\"value\": 7}' > result.json\n",
        vec![],
    );

    let result = executor.run(&tool).await.unwrap();
    assert_eq!(result.exit_status, ExitStatus::Success);
    assert_eq!(result.stdout.trim(), "working");

    let artifact = result.artifact_path.expect("artifact expected");
    let content = std::fs::read_to_string(artifact).unwrap();
    assert!(content.contains("\"value\""));
}

#[tokio::test]
async fn runaway_tool_is_killed_on_timeout() {
    let tmp = tempfile::tempdir().unwrap();
    let executor = sh_executor(tmp.path().to_path_buf(), Duration::from_millis(200));
    let tool = record("runaway_20260101120000", "sleep 60\n", vec![]);

    let start = std::time::Instant::now();
    let result = executor.run(&tool).await.unwrap();
    assert_eq!(result.exit_status, ExitStatus::Timeout);
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn declined_dependency_stops_before_any_run() {
    let tmp = tempfile::tempdir().unwrap();
    let executor = sh_executor(tmp.path().to_path_buf(), Duration::from_secs(10));
    let marker = tmp.path().join("installed.marker");
    let tool = record(
        "needy_20260101120000",
        "echo should not run\n",
        vec![format!("touch {}", marker.display())],
    );

    let err = executor.prepare(&tool, &Decline).await.unwrap_err();
    assert!(matches!(err, AppError::DependencyDeclined(_)));
    assert!(!marker.exists());
}

#[tokio::test]
async fn failed_tool_reports_exit_code_and_stderr() {
    let tmp = tempfile::tempdir().unwrap();
    let executor = sh_executor(tmp.path().to_path_buf(), Duration::from_secs(10));
    let tool = record(
        "broken_20260101120000",
        "echo diagnostics >&2\nexit 3\n",
        vec![],
    );

    let result = executor.run(&tool).await.unwrap();
    assert_eq!(result.exit_status, ExitStatus::Failed(3));
    assert!(result.stderr.contains("diagnostics"));
    assert!(!result.succeeded());
}
