use crate::model::{BranchUpdate, EditError};
use anyhow::anyhow;
use git_executor::git_command_executor::GitCommandExecutor;
use tracing::{info, instrument};

/// Content-equivalence gate: the rewritten tip's tree must be byte-identical
/// to the original tip's tree. This is the last safety check before any
/// branch is touched; a mismatch means the rewrite silently changed content.
#[instrument(skip(git_executor))]
pub fn verify_tree_equivalence(git_executor: &GitCommandExecutor, repo_path: &str, original: &str, rewritten: &str) -> Result<(), EditError> {
  let (output, exit_code) = git_executor
    .execute_command_with_status(&["diff-tree", "--quiet", original, rewritten], repo_path)
    .map_err(EditError::Other)?;

  match exit_code {
    0 => Ok(()),
    1 => Err(EditError::ContentMismatch {
      original: original.to_string(),
      rewritten: rewritten.to_string(),
    }),
    code => Err(EditError::Other(anyhow!("diff-tree failed with status {code}: {output}"))),
  }
}

/// Force-update every mapped branch to its new commit. The only mutation of
/// persistent branch state in the whole pipeline.
#[instrument(skip(git_executor, updates), fields(branches = updates.len()))]
pub fn apply_branch_updates(git_executor: &GitCommandExecutor, repo_path: &str, updates: &[BranchUpdate]) -> Result<(), EditError> {
  for update in updates {
    git_executor
      .execute_command(&["branch", "-f", &update.name, &update.commit_id], repo_path)
      .map_err(EditError::Other)?;
    info!(branch = %update.name, depth = update.new_depth, commit_id = %update.commit_id, "relocated branch");
  }
  Ok(())
}
