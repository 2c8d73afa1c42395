/// The history edit being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
  /// Squash the target commit into the base, discarding the target's message
  Fixup,
  /// Squash the target commit into the base, replacing the base's message
  Amend,
  /// Relocate the target commit to immediately follow the base
  Pick,
  /// Remove the target commit from history
  Drop,
  /// Exchange the positions of two commits
  Swap,
}

impl Operation {
  pub fn as_str(&self) -> &'static str {
    match self {
      Operation::Fixup => "fixup",
      Operation::Amend => "amend",
      Operation::Pick => "pick",
      Operation::Drop => "drop",
      Operation::Swap => "swap",
    }
  }

  /// Change in range length a successful rewrite must produce
  /// (relative to the pre-rewrite enumeration, which already includes a
  /// commit created from staged changes)
  pub fn expected_delta(&self) -> i64 {
    match self {
      Operation::Fixup | Operation::Amend | Operation::Drop => -1,
      Operation::Pick | Operation::Swap => 0,
    }
  }
}

impl std::fmt::Display for Operation {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A fully described edit: operation, commit specifiers and flags.
/// All inputs are explicit so the engine carries no ambient process state.
#[derive(Debug, Clone)]
pub struct EditRequest {
  pub operation: Operation,
  /// Base commit, or for drop the commit to remove
  pub first_spec: String,
  /// Target commit; when absent a commit is created from staged changes
  pub second_spec: Option<String>,
  /// Permit destructive linearization of merge commits in the range
  pub force: bool,
  /// Message for the commit created from staged changes
  pub message: Option<String>,
}

/// A branch force-update performed by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchUpdate {
  pub name: String,
  pub original_depth: usize,
  pub new_depth: usize,
  pub commit_id: String,
}

/// Result of a history edit.
#[derive(Debug)]
pub enum EditOutcome {
  Completed {
    updated_branches: Vec<BranchUpdate>,
    /// Branches whose adjusted depth fell outside the rewritten range;
    /// reported, left untouched, never fatal
    lost_branches: Vec<String>,
  },
  /// No staged changes to turn into a commit; the repository was not touched
  NothingToDo,
}

/// Error taxonomy for history edits. Precondition failures are raised before
/// any mutation; everything after temp-branch creation unwinds through the
/// cleanup guard.
#[derive(Debug)]
pub enum EditError {
  InvalidReference(String),
  NotAncestor { ancestor: String, descendant: String },
  DetachedHead,
  DirtyWorkingTree,
  MergeCommitsPresent(Vec<String>),
  RewriteConflict(String),
  RewriteFailed(String),
  ContentMismatch { original: String, rewritten: String },
  Other(anyhow::Error),
}

impl From<anyhow::Error> for EditError {
  fn from(err: anyhow::Error) -> Self {
    EditError::Other(err)
  }
}

impl std::fmt::Display for EditError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      EditError::InvalidReference(spec) => write!(f, "'{spec}' does not resolve to a commit"),
      EditError::NotAncestor { ancestor, descendant } => write!(f, "{ancestor} is not an ancestor of {descendant}"),
      EditError::DetachedHead => write!(f, "HEAD is detached; check out a branch first"),
      EditError::DirtyWorkingTree => write!(f, "working tree or index has changes that would be clobbered"),
      EditError::MergeCommitsPresent(merges) => {
        write!(f, "the affected range contains merge commits (pass --force to linearize): {}", merges.join(", "))
      }
      EditError::RewriteConflict(detail) => write!(f, "rewrite halted on a conflict and was aborted: {detail}"),
      EditError::RewriteFailed(detail) => write!(f, "rewrite failed: {detail}"),
      EditError::ContentMismatch { original, rewritten } => {
        write!(f, "rewritten tree {rewritten} does not match original tree {original}; no branch was touched")
      }
      EditError::Other(e) => write!(f, "{e}"),
    }
  }
}

impl std::error::Error for EditError {}
