use crate::model::EditError;
use anyhow::anyhow;
use git_executor::git_command_executor::GitCommandExecutor;
use tracing::instrument;

/// Resolve a user-supplied commit specifier to a canonical commit id.
#[instrument(skip(git_executor))]
pub fn resolve_commit(git_executor: &GitCommandExecutor, repo_path: &str, spec: &str) -> Result<String, EditError> {
  let commit_spec = format!("{spec}^{{commit}}");
  let (output, exit_code) = git_executor
    .execute_command_with_status(&["rev-parse", "--verify", "--quiet", &commit_spec], repo_path)
    .map_err(EditError::Other)?;

  if exit_code == 0 && !output.is_empty() {
    Ok(output)
  } else {
    Err(EditError::InvalidReference(spec.to_string()))
  }
}

/// Test whether `ancestor` is an ancestor of `descendant` (inclusive: a
/// commit is its own ancestor as far as git is concerned).
#[instrument(skip(git_executor))]
pub fn is_ancestor(git_executor: &GitCommandExecutor, repo_path: &str, ancestor: &str, descendant: &str) -> Result<bool, EditError> {
  let (output, exit_code) = git_executor
    .execute_command_with_status(&["merge-base", "--is-ancestor", ancestor, descendant], repo_path)
    .map_err(EditError::Other)?;

  match exit_code {
    0 => Ok(true),
    1 => Ok(false),
    code => Err(EditError::Other(anyhow!("merge-base --is-ancestor failed with status {code}: {output}"))),
  }
}

/// Name of the currently checked out branch, or None when HEAD is detached.
#[instrument(skip(git_executor))]
pub fn current_branch(git_executor: &GitCommandExecutor, repo_path: &str) -> Result<Option<String>, EditError> {
  let (output, exit_code) = git_executor
    .execute_command_with_status(&["symbolic-ref", "--quiet", "--short", "HEAD"], repo_path)
    .map_err(EditError::Other)?;

  if exit_code == 0 && !output.is_empty() { Ok(Some(output)) } else { Ok(None) }
}

/// Subject (first message line) of a commit.
#[instrument(skip(git_executor))]
pub fn commit_subject(git_executor: &GitCommandExecutor, repo_path: &str, commit_id: &str) -> Result<String, EditError> {
  git_executor
    .execute_command(&["log", "-1", "--format=%s", commit_id], repo_path)
    .map_err(EditError::Other)
}

/// Staged / unstaged state of the working tree. Untracked files are ignored;
/// they do not interfere with a rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorktreeStatus {
  pub staged: bool,
  pub unstaged: bool,
}

impl WorktreeStatus {
  pub fn is_clean(&self) -> bool {
    !self.staged && !self.unstaged
  }
}

/// Parse `git status --porcelain` into staged/unstaged flags.
#[instrument(skip(git_executor))]
pub fn worktree_status(git_executor: &GitCommandExecutor, repo_path: &str) -> Result<WorktreeStatus, EditError> {
  let output = git_executor
    .execute_command_raw(&["status", "--porcelain"], repo_path)
    .map_err(EditError::Other)?;

  let mut status = WorktreeStatus { staged: false, unstaged: false };
  for line in output.lines() {
    let mut chars = line.chars();
    let index_state = chars.next().unwrap_or(' ');
    let worktree_state = chars.next().unwrap_or(' ');

    if index_state == '?' || index_state == '!' {
      continue;
    }
    if index_state != ' ' {
      status.staged = true;
    }
    if worktree_state != ' ' {
      status.unstaged = true;
    }
  }

  Ok(status)
}
