//! Tool Execution
//!
//! Runs stored tools as subprocesses: dependency preparation (probe, then
//! ask the operator, never install silently), scratch-directory setup, and
//! the spawn/timeout/kill loop. Execution failures are data in the result,
//! not errors.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::models::tool::ToolRecord;
use crate::utils::error::{AppError, AppResult};

/// How a tool run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    /// Non-zero exit code.
    Failed(i32),
    /// Killed after the wall-clock timeout expired.
    Timeout,
}

/// Outcome of one tool run.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: ExitStatus,
    /// Path to `result.json` in the scratch dir, if the tool produced one.
    pub artifact_path: Option<PathBuf>,
}

impl ExecutionResult {
    pub fn succeeded(&self) -> bool {
        self.exit_status == ExitStatus::Success
    }
}

/// Asks the operator whether an install command may run.
pub trait InstallPrompt: Send + Sync {
    fn confirm(&self, command: &str) -> AppResult<bool>;
}

/// Terminal y/n prompt.
pub struct TerminalPrompt;

impl InstallPrompt for TerminalPrompt {
    fn confirm(&self, command: &str) -> AppResult<bool> {
        use std::io::Write;

        print!("Tool wants to run `{}`. Allow? [y/N] ", command);
        std::io::stdout().flush()?;
        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
    }
}

/// Executor configuration.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Wall-clock limit per run.
    pub timeout: Duration,
    /// Interpreter binary. Tests swap in `sh` to stay portable.
    pub interpreter: String,
    /// Root for per-tool scratch directories.
    pub work_dir: PathBuf,
}

impl ExecutorConfig {
    pub fn new(work_dir: PathBuf) -> Self {
        Self {
            timeout: Duration::from_secs(60),
            interpreter: "python3".to_string(),
            work_dir,
        }
    }
}

/// Runs tools as subprocesses.
pub struct Executor {
    config: ExecutorConfig,
}

impl Executor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// Make sure the record's install dependencies are satisfied.
    ///
    /// Per command: skip if the package is already present (probed via
    /// `pip show`), otherwise ask the operator. A declined command aborts
    /// with `DependencyDeclined`; nothing is ever installed silently.
    pub async fn prepare(&self, record: &ToolRecord, prompt: &dyn InstallPrompt) -> AppResult<()> {
        for command in &record.install_dependencies {
            if let Some(package) = pip_package_name(command) {
                if self.pip_package_installed(&package).await {
                    debug!(%package, "dependency already satisfied");
                    continue;
                }
            }

            if !prompt.confirm(command)? {
                return Err(AppError::DependencyDeclined(command.clone()));
            }

            info!(%command, "running install command");
            let status = Command::new("sh")
                .arg("-c")
                .arg(command)
                .status()
                .await
                .map_err(|e| AppError::command(format!("failed to spawn `{}`: {}", command, e)))?;

            if !status.success() {
                return Err(AppError::command(format!(
                    "install command `{}` exited with {}",
                    command,
                    status.code().unwrap_or(-1)
                )));
            }
        }
        Ok(())
    }

    async fn pip_package_installed(&self, package: &str) -> bool {
        Command::new("pip")
            .arg("show")
            .arg(package)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Run the record's code in its own scratch directory.
    ///
    /// stdin is inherited so interactive tools can read credentials from
    /// the operator; stdout/stderr are captured.
    pub async fn run(&self, record: &ToolRecord) -> AppResult<ExecutionResult> {
        let scratch = self.config.work_dir.join(&record.id);
        std::fs::create_dir_all(&scratch)?;

        let script_path = scratch.join("tool.py");
        std::fs::write(&script_path, &record.code)?;

        let mut cmd = Command::new(&self.config.interpreter);
        cmd.arg(&script_path)
            .current_dir(&scratch)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(id = %record.id, interpreter = %self.config.interpreter, "spawning tool");
        let mut child = cmd
            .spawn()
            .map_err(|e| AppError::command(format!("failed to spawn interpreter: {}", e)))?;

        // Drain the pipes concurrently with the wait: a tool writing more
        // than the OS pipe buffer would otherwise block forever and get
        // misreported as a timeout.
        let stdout_task = tokio::spawn(read_handle(child.stdout.take()));
        let stderr_task = tokio::spawn(read_handle(child.stderr.take()));

        let exit_status = tokio::select! {
            status = child.wait() => {
                let status = status
                    .map_err(|e| AppError::command(format!("failed to wait for tool: {}", e)))?;
                if status.success() {
                    ExitStatus::Success
                } else {
                    ExitStatus::Failed(status.code().unwrap_or(-1))
                }
            }
            _ = tokio::time::sleep(self.config.timeout) => {
                warn!(id = %record.id, timeout = ?self.config.timeout, "tool timed out, killing");
                let _ = child.kill().await;
                ExitStatus::Timeout
            }
        };

        // The readers hit EOF once the child is reaped or killed.
        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_task.await.unwrap_or_default();

        let artifact = scratch.join("result.json");
        let artifact_path = artifact.exists().then_some(artifact);

        Ok(ExecutionResult {
            stdout,
            stderr,
            exit_status,
            artifact_path,
        })
    }
}

async fn read_handle<R>(handle: Option<R>) -> String
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    if let Some(mut reader) = handle {
        let _ = tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut buf).await;
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Extract the package name from a `pip install <pkg>` style command.
fn pip_package_name(command: &str) -> Option<String> {
    let mut parts = command.split_whitespace();
    let program = parts.next()?;
    if program != "pip" && program != "pip3" {
        return None;
    }
    if parts.next()? != "install" {
        return None;
    }
    parts
        .find(|p| !p.starts_with('-'))
        .map(|p| {
            // Strip version constraints: requests==2.31 -> requests
            p.split(|c| c == '=' || c == '<' || c == '>' || c == '~')
                .next()
                .unwrap_or(p)
                .to_string()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct AlwaysDecline;
    impl InstallPrompt for AlwaysDecline {
        fn confirm(&self, _command: &str) -> AppResult<bool> {
            Ok(false)
        }
    }

    struct CountingPrompt {
        calls: AtomicU32,
    }
    impl InstallPrompt for CountingPrompt {
        fn confirm(&self, _command: &str) -> AppResult<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }
    }

    fn sh_record(id: &str, code: &str) -> ToolRecord {
        ToolRecord {
            id: id.to_string(),
            description: "test tool".to_string(),
            keywords: ["test"].iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            install_dependencies: vec![],
            code: code.to_string(),
        }
    }

    fn sh_executor(work_dir: PathBuf, timeout: Duration) -> Executor {
        Executor::new(ExecutorConfig {
            timeout,
            interpreter: "sh".to_string(),
            work_dir,
        })
    }

    #[tokio::test]
    async fn test_run_captures_stdout() {
        let tmp = tempfile::tempdir().unwrap();
        let executor = sh_executor(tmp.path().to_path_buf(), Duration::from_secs(10));
        let record = sh_record("echo_20260101120000", "echo hello\n");

        let result = executor.run(&record).await.unwrap();
        assert_eq!(result.exit_status, ExitStatus::Success);
        assert_eq!(result.stdout.trim(), "hello");
        assert!(result.succeeded());
    }

    #[tokio::test]
    async fn test_run_reports_failure_code() {
        let tmp = tempfile::tempdir().unwrap();
        let executor = sh_executor(tmp.path().to_path_buf(), Duration::from_secs(10));
        let record = sh_record("fail_20260101120000", "echo oops >&2\nexit 3\n");

        let result = executor.run(&record).await.unwrap();
        assert_eq!(result.exit_status, ExitStatus::Failed(3));
        assert!(result.stderr.contains("oops"));
        assert!(!result.succeeded());
    }

    #[tokio::test]
    async fn test_run_times_out() {
        let tmp = tempfile::tempdir().unwrap();
        let executor = sh_executor(tmp.path().to_path_buf(), Duration::from_millis(200));
        let record = sh_record("sleep_20260101120000", "sleep 30\n");

        let start = std::time::Instant::now();
        let result = executor.run(&record).await.unwrap();
        assert_eq!(result.exit_status, ExitStatus::Timeout);
        // Killed promptly, nowhere near the 30s sleep.
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_run_drains_output_larger_than_pipe_buffer() {
        let tmp = tempfile::tempdir().unwrap();
        let executor = sh_executor(tmp.path().to_path_buf(), Duration::from_secs(10));
        // ~320 KiB of stdout, well past the usual 64 KiB pipe buffer.
        let record = sh_record(
            "chatty_20260101120000",
            "i=0\nwhile [ $i -lt 5000 ]; do\n  echo 0123456789012345678901234567890123456789012345678901234567890123\n  i=$((i+1))\ndone\n",
        );

        let result = executor.run(&record).await.unwrap();
        assert_eq!(result.exit_status, ExitStatus::Success);
        assert!(result.stdout.len() > 300_000);
    }

    #[tokio::test]
    async fn test_run_picks_up_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let executor = sh_executor(tmp.path().to_path_buf(), Duration::from_secs(10));
        let record = sh_record(
            "artifact_20260101120000",
            "echo '{\"answer\": 42}' > result.json\n",
        );

        let result = executor.run(&record).await.unwrap();
        assert_eq!(result.exit_status, ExitStatus::Success);
        let artifact = result.artifact_path.expect("artifact expected");
        assert!(artifact.ends_with("result.json"));
        assert!(artifact.exists());
    }

    #[tokio::test]
    async fn test_prepare_declined_runs_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let executor = sh_executor(tmp.path().to_path_buf(), Duration::from_secs(10));
        let marker = tmp.path().join("ran.marker");
        let mut record = sh_record("dep_20260101120000", "echo hi\n");
        record.install_dependencies = vec![format!("touch {}", marker.display())];

        let err = executor.prepare(&record, &AlwaysDecline).await.unwrap_err();
        assert!(matches!(err, AppError::DependencyDeclined(_)));
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_prepare_approved_runs_command() {
        let tmp = tempfile::tempdir().unwrap();
        let executor = sh_executor(tmp.path().to_path_buf(), Duration::from_secs(10));
        let marker = tmp.path().join("ran.marker");
        let mut record = sh_record("dep_20260101120000", "echo hi\n");
        record.install_dependencies = vec![format!("touch {}", marker.display())];

        let prompt = CountingPrompt {
            calls: AtomicU32::new(0),
        };
        executor.prepare(&record, &prompt).await.unwrap();
        assert_eq!(prompt.calls.load(Ordering::SeqCst), 1);
        assert!(marker.exists());
    }

    #[test]
    fn test_pip_package_name() {
        assert_eq!(
            pip_package_name("pip install requests"),
            Some("requests".to_string())
        );
        assert_eq!(
            pip_package_name("pip3 install requests==2.31.0"),
            Some("requests".to_string())
        );
        assert_eq!(
            pip_package_name("pip install --upgrade numpy"),
            Some("numpy".to_string())
        );
        assert_eq!(pip_package_name("npm install leftpad"), None);
        assert_eq!(pip_package_name("pip uninstall requests"), None);
    }
}
