use crate::git_info::GitInfo;
use anyhow::{Result, anyhow};
use std::process::Command;
use std::sync::{Arc, Mutex};
use tracing::instrument;

#[derive(Clone, Debug)]
pub struct GitCommandExecutor {
  info: Arc<Mutex<Option<GitInfo>>>,
}

impl Default for GitCommandExecutor {
  fn default() -> Self {
    Self::new()
  }
}

impl GitCommandExecutor {
  #[must_use]
  pub fn new() -> Self {
    Self { info: Arc::new(Mutex::new(None)) }
  }

  #[instrument(skip(self))]
  pub fn get_info(&self) -> Result<GitInfo> {
    let mut guard = self.info.lock().map_err(|e| anyhow!("Failed to acquire lock: {}", e))?;
    if guard.is_none() {
      let info = GitInfo::discover().map_err(|e| anyhow!(e))?;
      tracing::info!(git_version = %info.version, git_path = %info.path, "discovered git info");
      *guard = Some(info);
    }

    guard.as_ref().ok_or_else(|| anyhow!("Git info should be initialized")).cloned()
  }

  // Helper method to validate repository path
  fn validate_path(repository_path: &str) -> Result<()> {
    if repository_path.is_empty() {
      Err(anyhow!("repository path cannot be blank"))
    } else {
      Ok(())
    }
  }

  // Helper method to handle command errors uniformly
  fn handle_error<T>(&self, output: &std::process::Output, args: &[&str]) -> Result<T> {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    tracing::Span::current().record("success", false);
    tracing::error!(stderr = %stderr, "git command failed");
    let git_info = self.get_info()?;
    Err(anyhow!("git command failed: {} {}\nError: {stderr}", git_info.path, args.join(" ")))
  }

  // Helper method to handle successful command output
  fn handle_success(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    tracing::Span::current().record("success", true);
    stdout
  }

  // Helper method to parse output into lines efficiently
  pub fn parse_lines(output: &[u8]) -> Vec<String> {
    output
      .split(|&b| b == b'\n')
      .filter_map(|line| {
        let line_str = String::from_utf8_lossy(line);
        let trimmed = line_str.trim();
        if !trimmed.is_empty() { Some(trimmed.to_string()) } else { None }
      })
      .collect()
  }

  // Internal helper that builds and runs the git command
  fn execute_command_internal(&self, args: &[&str], repository_path: &str, env_vars: &[(&str, &str)]) -> Result<std::process::Output> {
    Self::validate_path(repository_path)?;
    let git_info = self.get_info()?;

    let mut cmd = Command::new(&git_info.path);
    cmd.args(args).current_dir(repository_path);
    for (key, value) in env_vars {
      cmd.env(key, value);
    }

    cmd.output().map_err(|e| anyhow!("Failed to execute git command: {e}"))
  }

  #[instrument(
    skip(self),
    fields(
      git_command = args.join(" "),
      repository_path = repository_path,
      success = tracing::field::Empty,
    )
  )]
  pub fn execute_command(&self, args: &[&str], repository_path: &str) -> Result<String> {
    let output = self.execute_command_internal(args, repository_path, &[])?;

    if output.status.success() {
      Ok(Self::handle_success(&output))
    } else {
      self.handle_error(&output, args)
    }
  }

  /// Execute a git command and return raw untrimmed output
  /// Useful for commands where exact formatting matters (e.g., git status --porcelain)
  #[instrument(
    skip(self),
    fields(
      git_command = args.join(" "),
      repository_path = repository_path,
      success = tracing::field::Empty,
    )
  )]
  pub fn execute_command_raw(&self, args: &[&str], repository_path: &str) -> Result<String> {
    let output = self.execute_command_internal(args, repository_path, &[])?;

    if output.status.success() {
      let stdout = String::from_utf8_lossy(&output.stdout).to_string();
      tracing::Span::current().record("success", true);
      Ok(stdout)
    } else {
      self.handle_error(&output, args)
    }
  }

  /// Execute a git command and return the output with exit code
  /// Useful when a non-zero exit is an answer rather than a failure
  /// (e.g., merge-base --is-ancestor, diff-tree --quiet)
  #[instrument(
    skip(self),
    fields(
      git_command = args.join(" "),
      repository_path = repository_path,
      success = tracing::field::Empty,
    )
  )]
  pub fn execute_command_with_status(&self, args: &[&str], repository_path: &str) -> Result<(String, i32)> {
    let output = self.execute_command_internal(args, repository_path, &[])?;
    let exit_code = output.status.code().unwrap_or(-1);

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    if output.status.success() {
      tracing::Span::current().record("success", true);
      Ok((stdout, exit_code))
    } else {
      tracing::Span::current().record("success", false);
      tracing::debug!(stderr = %stderr, exit_code = exit_code, "git command returned non-zero status");
      // Return stderr for error cases, but still with exit code
      Ok((stderr, exit_code))
    }
  }

  /// Execute a git command with environment overrides and return output with exit code
  /// Used to drive `git rebase -i` with an injected sequence editor, where a
  /// non-zero exit signals a conflict that the caller inspects rather than an error
  #[instrument(
    skip(self),
    fields(
      git_command = args.join(" "),
      repository_path = repository_path,
      success = tracing::field::Empty,
    )
  )]
  pub fn execute_command_with_env_status(&self, args: &[&str], repository_path: &str, env_vars: &[(&str, &str)]) -> Result<(String, i32)> {
    let output = self.execute_command_internal(args, repository_path, env_vars)?;
    let exit_code = output.status.code().unwrap_or(-1);

    if output.status.success() {
      tracing::Span::current().record("success", true);
      Ok((Self::handle_success(&output), exit_code))
    } else {
      let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
      tracing::Span::current().record("success", false);
      tracing::debug!(stderr = %stderr, exit_code = exit_code, "git command returned non-zero status");
      Ok((stderr, exit_code))
    }
  }

  /// Execute a git command and return output as lines, filtering empty lines
  #[instrument(
    skip(self),
    fields(
      git_command = args.join(" "),
      repository_path = repository_path,
      success = tracing::field::Empty,
    )
  )]
  pub fn execute_command_lines(&self, args: &[&str], repository_path: &str) -> Result<Vec<String>> {
    let output = self.execute_command_internal(args, repository_path, &[])?;

    if output.status.success() {
      tracing::Span::current().record("success", true);
      Ok(Self::parse_lines(&output.stdout))
    } else {
      self.handle_error(&output, args)
    }
  }
}
