use crate::branch_track::{BranchPosition, CommitEntry};
use crate::model::{BranchUpdate, Operation};
use tracing::{debug, warn};

/// Apply the operation-specific depth-shift arithmetic to one original depth.
///
/// | operation   | rule                                              |
/// |-------------|---------------------------------------------------|
/// | fixup/amend | depths >= target depth decrease by 1              |
/// | drop        | depths >= target depth decrease by 1              |
/// | pick        | depths < target depth increase by 1               |
/// | swap        | depth 0 and target depth exchange, pin excepted   |
pub fn adjusted_depth(operation: Operation, original_depth: usize, target_depth: usize, pinned: bool) -> usize {
  match operation {
    Operation::Fixup | Operation::Amend | Operation::Drop => {
      if original_depth >= target_depth {
        original_depth - 1
      } else {
        original_depth
      }
    }
    Operation::Pick => {
      if target_depth > 0 && original_depth < target_depth {
        original_depth + 1
      } else {
        original_depth
      }
    }
    Operation::Swap => {
      if pinned {
        original_depth
      } else if original_depth == 0 {
        target_depth
      } else if original_depth == target_depth {
        0
      } else {
        original_depth
      }
    }
  }
}

/// Map every tracked branch onto the rewritten range. Branches whose adjusted
/// depth falls outside the new range are reported as lost and skipped; the
/// remaining branches are still reconciled (best-effort policy).
///
/// `current_branch` is the branch that was checked out when the edit started;
/// for swap it is pinned at its original depth when it sat on the descendant,
/// because moving the active branch's tip backward is almost never intended.
pub fn map_branches(
  operation: Operation,
  positions: &[BranchPosition],
  target_depth: usize,
  current_branch: &str,
  new_commits: &[CommitEntry],
) -> (Vec<BranchUpdate>, Vec<String>) {
  let mut updates = Vec::with_capacity(positions.len());
  let mut lost = Vec::new();

  for position in positions {
    let pinned = operation == Operation::Swap && position.name == current_branch && position.depth == target_depth;
    let new_depth = adjusted_depth(operation, position.depth, target_depth, pinned);

    match new_commits.get(new_depth) {
      Some(commit) => {
        debug!(branch = %position.name, original_depth = position.depth, new_depth = new_depth, commit_id = %commit.id, "mapped branch");
        updates.push(BranchUpdate {
          name: position.name.clone(),
          original_depth: position.depth,
          new_depth,
          commit_id: commit.id.clone(),
        });
      }
      None => {
        warn!(branch = %position.name, original_depth = position.depth, new_depth = new_depth, "branch mapping lost: adjusted depth is outside the rewritten range");
        lost.push(position.name.clone());
      }
    }
  }

  (updates, lost)
}
