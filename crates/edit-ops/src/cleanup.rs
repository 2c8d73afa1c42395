use crate::rewrite::rebase_in_progress;
use git_executor::git_command_executor::GitCommandExecutor;
use tracing::{debug, warn};

/// Restores the repository on every exit path: aborts any in-progress
/// rebase, returns to the original branch, puts any staged-changes commit
/// back into the index and working tree, and deletes the disposable
/// working branch. Runs from Drop so success, error and panic paths all
/// converge on the same sequence; each step is idempotent.
pub struct CleanupGuard<'a> {
  git_executor: &'a GitCommandExecutor,
  repo_path: &'a str,
  original_branch: String,
  temp_branch: String,
  staged_commit: Option<String>,
}

impl<'a> CleanupGuard<'a> {
  pub fn new(git_executor: &'a GitCommandExecutor, repo_path: &'a str, original_branch: &str, temp_branch: &str) -> Self {
    Self {
      git_executor,
      repo_path,
      original_branch: original_branch.to_string(),
      temp_branch: temp_branch.to_string(),
      staged_commit: None,
    }
  }

  /// Register the commit created from the user's staged changes. If the
  /// edit fails, restore replays it onto the original branch so the staged
  /// work ends up back in the index and working tree.
  pub fn set_staged_commit(&mut self, commit_id: &str) {
    self.staged_commit = Some(commit_id.to_string());
  }

  /// Called once the rewrite has incorporated the staged-changes commit;
  /// from then on restore must not replay it.
  pub fn clear_staged_commit(&mut self) {
    self.staged_commit = None;
  }

  fn restore(&self) {
    match rebase_in_progress(self.git_executor, self.repo_path) {
      Ok(true) => {
        warn!("aborting in-progress rewrite");
        if let Err(e) = self.git_executor.execute_command(&["rebase", "--abort"], self.repo_path) {
          warn!(error = %e, "failed to abort in-progress rewrite");
        }
      }
      Ok(false) => {}
      Err(e) => warn!(error = %e, "could not determine rewrite state"),
    }

    if let Err(e) = self.git_executor.execute_command(&["checkout", "--quiet", &self.original_branch], self.repo_path) {
      warn!(branch = %self.original_branch, error = %e, "failed to return to original branch");
    }

    // the commit's parent is the original tip, so replaying it without
    // committing reproduces the pre-invocation index and working tree
    if let Some(commit_id) = &self.staged_commit {
      if let Err(e) = self.git_executor.execute_command(&["cherry-pick", "--no-commit", commit_id], self.repo_path) {
        warn!(commit_id = %commit_id, error = %e, "failed to restore staged changes");
      } else {
        debug!(commit_id = %commit_id, "restored staged changes");
      }
    }

    if let Err(e) = self.git_executor.execute_command(&["branch", "-D", &self.temp_branch], self.repo_path) {
      warn!(branch = %self.temp_branch, error = %e, "failed to delete temporary branch");
    } else {
      debug!(branch = %self.temp_branch, "deleted temporary branch");
    }
  }
}

impl Drop for CleanupGuard<'_> {
  fn drop(&mut self) {
    self.restore();
  }
}
