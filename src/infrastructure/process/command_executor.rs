use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use thiserror::Error;
use tokio::process::Command as TokioCommand;

/// Command executor errors
#[derive(Debug, Error)]
pub enum CommandExecutorError {
    #[error("'{command}' failed with exit code {exit_code}: {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("Failed to spawn '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid command: {0:?}")]
    InvalidCommand(String),
}

/// Configuration for command execution
#[derive(Debug, Clone, Default)]
pub struct ExecutionConfig {
    /// Working directory for command execution
    pub working_directory: Option<PathBuf>,

    /// Capture stdout/stderr instead of streaming them to the terminal
    pub capture_output: bool,
}

impl ExecutionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_working_directory<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.working_directory = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn with_output_capture(mut self, capture_output: bool) -> Self {
        self.capture_output = capture_output;
        self
    }
}

/// Result of command execution
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub exit_code: i32,

    /// Empty unless output capture was requested
    pub stdout: String,

    /// Empty unless output capture was requested
    pub stderr: String,

    pub execution_time_ms: u64,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs external command lines such as `repo sync` through the platform shell
pub struct CommandExecutor;

impl CommandExecutor {
    /// Run `command` and wait for it; a non-zero exit status is returned as
    /// part of the result, not as an error.
    pub async fn execute(
        command: &str,
        config: &ExecutionConfig,
    ) -> Result<ExecutionResult, CommandExecutorError> {
        let start_time = Instant::now();
        let (program, args) = Self::shell_command(command)?;

        let mut cmd = TokioCommand::new(&program);
        cmd.args(&args).stdin(Stdio::null());

        if let Some(working_dir) = &config.working_directory {
            cmd.current_dir(working_dir);
        }

        if config.capture_output {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }

        tracing::debug!("Running {:?} {:?}", program, args);

        let output = cmd
            .spawn()
            .map_err(|source| CommandExecutorError::SpawnFailed {
                command: command.to_string(),
                source,
            })?
            .wait_with_output()
            .await
            .map_err(|source| CommandExecutorError::SpawnFailed {
                command: command.to_string(),
                source,
            })?;

        Ok(ExecutionResult {
            // Terminated by a signal
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            execution_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }

    /// Like [`CommandExecutor::execute`], but a non-zero exit status is an error.
    pub async fn execute_checked(
        command: &str,
        config: &ExecutionConfig,
    ) -> Result<ExecutionResult, CommandExecutorError> {
        let result = Self::execute(command, config).await?;
        if !result.success() {
            return Err(CommandExecutorError::CommandFailed {
                command: command.to_string(),
                exit_code: result.exit_code,
                stderr: result.stderr.trim().to_string(),
            });
        }
        Ok(result)
    }

    fn shell_command(command: &str) -> Result<(String, Vec<String>), CommandExecutorError> {
        if command.trim().is_empty() {
            return Err(CommandExecutorError::InvalidCommand(command.to_string()));
        }

        let (shell, flag) = if cfg!(windows) { ("cmd", "/C") } else { ("sh", "-c") };
        Ok((shell.to_string(), vec![flag.to_string(), command.to_string()]))
    }
}
