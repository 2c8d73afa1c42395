use crate::branch_track;
use crate::cleanup::CleanupGuard;
use crate::depth_map;
use crate::model::{EditError, EditOutcome, EditRequest, Operation};
use crate::plan;
use crate::reconcile;
use crate::resolve::{self, WorktreeStatus};
use crate::rewrite;
use anyhow::anyhow;
use git_executor::git_command_executor::GitCommandExecutor;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, instrument, warn};

/// Where the operation-relevant commit comes from.
enum TargetSource {
  Existing(String),
  /// Created from staged changes on the temporary branch, so the original
  /// branch is never advanced before the rewrite succeeds
  FromStaged,
}

/// The commit-history surgery pipeline: resolve → track → synthesize →
/// rewrite → map → reconcile. All work happens on a disposable branch; the
/// original branch is only touched by the final reconciliation step.
pub struct HistoryEditor<'a> {
  git_executor: &'a GitCommandExecutor,
  repo_path: &'a str,
}

impl<'a> HistoryEditor<'a> {
  pub fn new(git_executor: &'a GitCommandExecutor, repo_path: &'a str) -> Self {
    Self { git_executor, repo_path }
  }

  #[instrument(skip(self, request), fields(operation = %request.operation))]
  pub fn edit(&self, request: &EditRequest) -> Result<EditOutcome, EditError> {
    let original_branch = resolve::current_branch(self.git_executor, self.repo_path)?.ok_or(EditError::DetachedHead)?;
    let head = resolve::resolve_commit(self.git_executor, self.repo_path, "HEAD")?;
    let status = resolve::worktree_status(self.git_executor, self.repo_path)?;

    let (base, target_source) = match self.resolve_operands(request, status)? {
      Some(operands) => operands,
      None => return Ok(EditOutcome::NothingToDo),
    };

    self.validate_ancestry(&base, &target_source, &head)?;
    let (base_parent, base_is_merge) = self.first_parent(&base)?;
    self.validate_merges(request, &base, base_is_merge, &target_source, &head)?;

    // Everything up to here is read-only. The temporary branch is the core
    // safety mechanism: until reconciliation, no pre-existing ref moves.
    let temp_branch = temp_branch_name();
    self
      .git_executor
      .execute_command(&["checkout", "--quiet", "-b", &temp_branch], self.repo_path)
      .map_err(EditError::Other)?;
    let mut guard = CleanupGuard::new(self.git_executor, self.repo_path, &original_branch, &temp_branch);

    let (target, effective_head) = match target_source {
      TargetSource::Existing(target) => (target, head),
      TargetSource::FromStaged => {
        let created = self.create_staged_commit(request, &base)?;
        info!(commit_id = %created, "created commit from staged changes");
        // if anything fails from here on, the guard replays this commit so
        // the user's staged work survives the rollback
        guard.set_staged_commit(&created);
        (created.clone(), created)
      }
    };

    let commits = branch_track::enumerate_range(self.git_executor, self.repo_path, base_parent.as_deref(), &effective_head)?;
    if commits.first().map(|c| c.id.as_str()) != Some(base.as_str()) {
      return Err(EditError::Other(anyhow!("base {base} is not on the first-parent chain of HEAD")));
    }

    // Snapshot strictly before the rewrite; it replaces commit identities
    let positions = branch_track::snapshot_branches(self.git_executor, self.repo_path, &commits, &temp_branch)?;

    let rewrite_plan = plan::synthesize_plan(request.operation, &commits, &target)?;
    rewrite::execute_rewrite(self.git_executor, self.repo_path, base_parent.as_deref(), &rewrite_plan)?;

    let new_tip = resolve::resolve_commit(self.git_executor, self.repo_path, "HEAD")?;
    let new_commits = branch_track::enumerate_range(self.git_executor, self.repo_path, base_parent.as_deref(), &new_tip)?;
    if new_commits.len() != rewrite_plan.expected_commit_count() {
      return Err(EditError::RewriteFailed(format!(
        "rewritten range has {} commits, expected {}",
        new_commits.len(),
        rewrite_plan.expected_commit_count()
      )));
    }

    // Drop is the only operation allowed to change the final tree
    if request.operation != Operation::Drop {
      reconcile::verify_tree_equivalence(self.git_executor, self.repo_path, &effective_head, &new_tip)?;
    }

    let (updates, lost_branches) = depth_map::map_branches(request.operation, &positions, rewrite_plan.target_depth, &original_branch, &new_commits);
    reconcile::apply_branch_updates(self.git_executor, self.repo_path, &updates)?;
    // the staged work is now part of the rewritten history
    guard.clear_staged_commit();

    info!(
      operation = %request.operation,
      updated = updates.len(),
      lost = lost_branches.len(),
      new_tip = %new_tip,
      "history edit completed"
    );
    Ok(EditOutcome::Completed {
      updated_branches: updates,
      lost_branches,
    })
  }

  /// Resolve the request into (base, target source), enforcing the
  /// cleanliness rules. Returns None for the no-staged-changes no-op.
  fn resolve_operands(&self, request: &EditRequest, status: WorktreeStatus) -> Result<Option<(String, TargetSource)>, EditError> {
    match request.operation {
      Operation::Drop => {
        if !status.is_clean() {
          return Err(EditError::DirtyWorkingTree);
        }
        let target = resolve::resolve_commit(self.git_executor, self.repo_path, &request.first_spec)?;
        let parent_spec = format!("{target}^");
        let base = resolve::resolve_commit(self.git_executor, self.repo_path, &parent_spec)
          .map_err(|_| EditError::InvalidReference(format!("{} has no parent; a root commit cannot be dropped", request.first_spec)))?;
        Ok(Some((base, TargetSource::Existing(target))))
      }
      _ => {
        let first = resolve::resolve_commit(self.git_executor, self.repo_path, &request.first_spec)?;
        match &request.second_spec {
          Some(second_spec) => {
            if !status.is_clean() {
              return Err(EditError::DirtyWorkingTree);
            }
            let second = resolve::resolve_commit(self.git_executor, self.repo_path, second_spec)?;
            if request.operation == Operation::Swap {
              Ok(Some(self.order_by_ancestry(first, second)?))
            } else {
              Ok(Some((first, TargetSource::Existing(second))))
            }
          }
          None => {
            // amend permits an empty, message-only commit
            if !status.staged && request.operation != Operation::Amend {
              warn!(operation = %request.operation, "no staged changes; nothing to do");
              return Ok(None);
            }
            if status.unstaged {
              return Err(EditError::DirtyWorkingTree);
            }
            Ok(Some((first, TargetSource::FromStaged)))
          }
        }
      }
    }
  }

  /// For swap, the ancestor becomes the base ("early") and the descendant
  /// the target ("late").
  fn order_by_ancestry(&self, first: String, second: String) -> Result<(String, TargetSource), EditError> {
    if first == second {
      return Err(EditError::Other(anyhow!("cannot swap a commit with itself")));
    }
    if resolve::is_ancestor(self.git_executor, self.repo_path, &first, &second)? {
      Ok((first, TargetSource::Existing(second)))
    } else if resolve::is_ancestor(self.git_executor, self.repo_path, &second, &first)? {
      Ok((second, TargetSource::Existing(first)))
    } else {
      Err(EditError::NotAncestor {
        ancestor: first,
        descendant: second,
      })
    }
  }

  fn validate_ancestry(&self, base: &str, target_source: &TargetSource, head: &str) -> Result<(), EditError> {
    if !resolve::is_ancestor(self.git_executor, self.repo_path, base, head)? {
      return Err(EditError::NotAncestor {
        ancestor: base.to_string(),
        descendant: head.to_string(),
      });
    }

    match target_source {
      TargetSource::Existing(target) => {
        // base must be a strict ancestor of the target
        if base == target || !resolve::is_ancestor(self.git_executor, self.repo_path, base, target)? {
          return Err(EditError::NotAncestor {
            ancestor: base.to_string(),
            descendant: target.to_string(),
          });
        }
        if !resolve::is_ancestor(self.git_executor, self.repo_path, target, head)? {
          return Err(EditError::NotAncestor {
            ancestor: target.to_string(),
            descendant: head.to_string(),
          });
        }
      }
      // the created commit lands on top of HEAD, so base == HEAD is fine
      TargetSource::FromStaged => {}
    }

    Ok(())
  }

  /// Merge commits cannot be replayed as single-parent directives. Without
  /// --force their presence in the range is an error; with --force they are
  /// linearized by omission. The base and a non-drop target are replayed
  /// directly, so a merge there is refused even under --force.
  fn validate_merges(&self, request: &EditRequest, base: &str, base_is_merge: bool, target_source: &TargetSource, head: &str) -> Result<(), EditError> {
    if base_is_merge {
      return Err(EditError::MergeCommitsPresent(vec![base.to_string()]));
    }

    let range = format!("{base}..{head}");
    let merges = self
      .git_executor
      .execute_command_lines(&["rev-list", "--merges", &range], self.repo_path)
      .map_err(EditError::Other)?;

    if let TargetSource::Existing(target) = target_source
      && request.operation != Operation::Drop
      && merges.iter().any(|m| m == target)
    {
      return Err(EditError::MergeCommitsPresent(vec![target.clone()]));
    }

    if !merges.is_empty() && !request.force {
      return Err(EditError::MergeCommitsPresent(merges));
    }
    if !merges.is_empty() {
      warn!(merges = merges.len(), "linearizing merge commits; their non-first-parent contributions are dropped");
    }

    Ok(())
  }

  /// First parent of a commit (None for a root commit) and whether the
  /// commit itself is a merge.
  fn first_parent(&self, commit_id: &str) -> Result<(Option<String>, bool), EditError> {
    let output = self
      .git_executor
      .execute_command(&["rev-list", "--parents", "-n", "1", commit_id], self.repo_path)
      .map_err(EditError::Other)?;

    let mut parts = output.split_whitespace();
    parts.next(); // the commit itself
    let parents: Vec<&str> = parts.collect();
    Ok((parents.first().map(|p| p.to_string()), parents.len() > 1))
  }

  /// Create the target commit from staged changes on the temporary branch.
  fn create_staged_commit(&self, request: &EditRequest, base: &str) -> Result<String, EditError> {
    match request.operation {
      Operation::Amend => match &request.message {
        Some(message) => self
          .git_executor
          .execute_command(&["commit", "--quiet", "--allow-empty", "-m", message], self.repo_path)
          .map_err(EditError::Other)?,
        // no replacement message: reuse the base's, making this a
        // content-only amend
        None => self
          .git_executor
          .execute_command(&["commit", "--quiet", "--allow-empty", "-C", base], self.repo_path)
          .map_err(EditError::Other)?,
      },
      _ => {
        let message = match &request.message {
          Some(message) => message.clone(),
          None => match request.operation {
            Operation::Fixup => {
              let base_subject = resolve::commit_subject(self.git_executor, self.repo_path, base)?;
              format!("fixup! {base_subject}")
            }
            _ => "Staged changes".to_string(),
          },
        };
        self
          .git_executor
          .execute_command(&["commit", "--quiet", "-m", &message], self.repo_path)
          .map_err(EditError::Other)?
      }
    };

    resolve::resolve_commit(self.git_executor, self.repo_path, "HEAD")
  }
}

/// Uniquely named disposable branch, scoped to this process invocation.
fn temp_branch_name() -> String {
  let millis = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0);
  format!("git-edit/tmp-{}-{}", std::process::id(), millis)
}
