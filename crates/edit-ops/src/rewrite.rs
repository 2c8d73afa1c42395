use crate::model::EditError;
use crate::plan::{Directive, RewritePlan};
use anyhow::anyhow;
use git_executor::git_command_executor::GitCommandExecutor;
use std::io::Write;
use std::path::Path;
use tracing::{debug, instrument, warn};

/// Render the plan in git's rebase todo format, one directive per line.
pub fn render_todo(plan: &RewritePlan) -> String {
  let mut todo = String::new();
  for directive in &plan.directives {
    match directive {
      Directive::Pick(commit) => {
        todo.push_str(&format!("pick {} {}\n", commit.id, commit.subject));
      }
      Directive::Squash { commit, inherit_message } => {
        // `fixup -C` takes the squashed commit's message for the result
        let command = if *inherit_message { "fixup -C" } else { "fixup" };
        todo.push_str(&format!("{command} {} {}\n", commit.id, commit.subject));
      }
    }
  }
  todo
}

/// Whether an interactive rebase is currently in progress.
pub fn rebase_in_progress(git_executor: &GitCommandExecutor, repo_path: &str) -> Result<bool, EditError> {
  let state_dir = git_executor
    .execute_command(&["rev-parse", "--git-path", "rebase-merge"], repo_path)
    .map_err(EditError::Other)?;

  let state_path = Path::new(&state_dir);
  let resolved = if state_path.is_absolute() {
    state_path.to_path_buf()
  } else {
    Path::new(repo_path).join(state_path)
  };
  Ok(resolved.exists())
}

/// Drive `git rebase -i` over `base^..HEAD` (or from the root) with the
/// synthesized plan substituted for the default todo. Empty commits are kept
/// so depth positions stay aligned with the plan. On conflict the in-progress
/// rebase is aborted immediately; no partial resolution is attempted.
#[instrument(skip(git_executor, plan), fields(directives = plan.directives.len()))]
pub fn execute_rewrite(git_executor: &GitCommandExecutor, repo_path: &str, base_parent: Option<&str>, plan: &RewritePlan) -> Result<(), EditError> {
  let todo = render_todo(plan);
  debug!(todo = %todo, "synthesized rebase todo");

  let mut plan_file = tempfile::NamedTempFile::new().map_err(|e| anyhow!("failed to create plan file: {e}"))?;
  plan_file.write_all(todo.as_bytes()).map_err(|e| anyhow!("failed to write plan file: {e}"))?;
  plan_file.flush().map_err(|e| anyhow!("failed to flush plan file: {e}"))?;
  let plan_path = plan_file.path().to_str().ok_or_else(|| anyhow!("plan file path is not valid UTF-8"))?;

  // git evaluates GIT_SEQUENCE_EDITOR with the todo path appended, so a
  // plain `cp` replaces the default plan without any interaction
  let sequence_editor = format!("cp '{plan_path}'");
  let env_vars = vec![("GIT_SEQUENCE_EDITOR", sequence_editor.as_str()), ("GIT_EDITOR", "true")];

  let upstream = base_parent.map(|p| p.to_string());
  let mut args = vec!["rebase", "-i", "--empty=keep", "--no-autosquash"];
  match &upstream {
    Some(parent) => args.push(parent),
    None => args.push("--root"),
  }

  let (output, exit_code) = git_executor
    .execute_command_with_env_status(&args, repo_path, &env_vars)
    .map_err(EditError::Other)?;

  if exit_code == 0 {
    return Ok(());
  }

  if rebase_in_progress(git_executor, repo_path)? {
    warn!(exit_code = exit_code, "rewrite halted mid-sequence, aborting");
    git_executor.execute_command(&["rebase", "--abort"], repo_path).map_err(EditError::Other)?;
    Err(EditError::RewriteConflict(output))
  } else {
    Err(EditError::RewriteFailed(output))
  }
}
