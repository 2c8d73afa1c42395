use crate::model::EditError;
use anyhow::anyhow;
use git_executor::git_command_executor::GitCommandExecutor;
use tracing::{debug, instrument};

/// One commit of the affected range: id, first parent count and subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEntry {
  pub id: String,
  pub subject: String,
  pub is_merge: bool,
}

/// A branch that pointed into the affected range, recorded by depth index
/// (base = depth 0, oldest first). The snapshot is taken strictly before the
/// rewrite because rewriting replaces commit identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchPosition {
  pub name: String,
  pub depth: usize,
}

/// Enumerate the first-parent chain up to `tip`, oldest first, excluding
/// `lower_exclusive` and everything below it. `None` enumerates from the
/// root commit. Depth indices are the positions in the returned list.
#[instrument(skip(git_executor))]
pub fn enumerate_range(git_executor: &GitCommandExecutor, repo_path: &str, lower_exclusive: Option<&str>, tip: &str) -> Result<Vec<CommitEntry>, EditError> {
  let range = match lower_exclusive {
    Some(lower) => format!("{lower}..{tip}"),
    None => tip.to_string(),
  };
  let args = vec!["log", "--first-parent", "--reverse", "--format=%H%x1f%P%x1f%s", &range];

  let lines = git_executor.execute_command_lines(&args, repo_path).map_err(EditError::Other)?;

  let mut commits = Vec::with_capacity(lines.len());
  for line in &lines {
    let mut fields = line.split('\x1f');
    let id = fields.next().ok_or_else(|| anyhow!("missing commit id in log record: {line}"))?;
    let parents = fields.next().ok_or_else(|| anyhow!("missing parents in log record: {line}"))?;
    let subject = fields.next().unwrap_or("");
    commits.push(CommitEntry {
      id: id.to_string(),
      subject: subject.to_string(),
      is_merge: parents.split_whitespace().count() > 1,
    });
  }

  debug!(commits_count = commits.len(), range = %range, "enumerated commit range");
  Ok(commits)
}

/// Record, for every branch pointing into the range, its depth index.
/// `exclude` is the disposable working branch, which by construction points
/// at the range tip and must not be tracked.
#[instrument(skip(git_executor, commits))]
pub fn snapshot_branches(git_executor: &GitCommandExecutor, repo_path: &str, commits: &[CommitEntry], exclude: &str) -> Result<Vec<BranchPosition>, EditError> {
  let refs = git_executor
    .execute_command_lines(&["for-each-ref", "refs/heads", "--format=%(refname:short)\x1f%(objectname)"], repo_path)
    .map_err(EditError::Other)?;

  let mut positions = Vec::new();
  for line in &refs {
    let Some((name, commit_id)) = line.split_once('\x1f') else {
      return Err(EditError::Other(anyhow!("unexpected for-each-ref record: {line}")));
    };
    if name == exclude {
      continue;
    }
    if let Some(depth) = commits.iter().position(|c| c.id == commit_id) {
      debug!(branch = %name, depth = depth, "tracking branch position");
      positions.push(BranchPosition { name: name.to_string(), depth });
    }
  }

  Ok(positions)
}
