use crate::branch_track::{BranchPosition, CommitEntry};
use crate::depth_map::{adjusted_depth, map_branches};
use crate::model::{BranchUpdate, Operation};
use pretty_assertions::assert_eq;
use test_log::test;

fn entry(id: &str) -> CommitEntry {
  CommitEntry {
    id: id.to_string(),
    subject: format!("commit {id}"),
    is_merge: false,
  }
}

fn position(name: &str, depth: usize) -> BranchPosition {
  BranchPosition { name: name.to_string(), depth }
}

#[test]
fn test_squash_and_drop_shift_depths_at_or_after_the_target() {
  for operation in [Operation::Fixup, Operation::Amend, Operation::Drop] {
    assert_eq!(adjusted_depth(operation, 0, 2, false), 0);
    assert_eq!(adjusted_depth(operation, 1, 2, false), 1);
    assert_eq!(adjusted_depth(operation, 2, 2, false), 1);
    assert_eq!(adjusted_depth(operation, 3, 2, false), 2);
  }
}

#[test]
fn test_pick_shifts_depths_before_the_target() {
  assert_eq!(adjusted_depth(Operation::Pick, 0, 2, false), 1);
  assert_eq!(adjusted_depth(Operation::Pick, 1, 2, false), 2);
  assert_eq!(adjusted_depth(Operation::Pick, 2, 2, false), 2);
  assert_eq!(adjusted_depth(Operation::Pick, 3, 2, false), 3);
}

#[test]
fn test_swap_exchanges_base_and_target_depths() {
  assert_eq!(adjusted_depth(Operation::Swap, 0, 2, false), 2);
  assert_eq!(adjusted_depth(Operation::Swap, 2, 2, false), 0);
  assert_eq!(adjusted_depth(Operation::Swap, 1, 2, false), 1);
  assert_eq!(adjusted_depth(Operation::Swap, 3, 2, false), 3);
  // the pin keeps the checked-out branch where it was
  assert_eq!(adjusted_depth(Operation::Swap, 2, 2, true), 2);
}

#[test]
fn test_swap_pins_only_the_current_branch() {
  let positions = vec![position("anchor", 0), position("feature", 1), position("main", 2)];
  let new_commits = vec![entry("n0"), entry("n1"), entry("n2")];

  let (updates, lost) = map_branches(Operation::Swap, &positions, 2, "main", &new_commits);

  assert!(lost.is_empty());
  assert_eq!(
    updates,
    vec![
      BranchUpdate {
        name: "anchor".to_string(),
        original_depth: 0,
        new_depth: 2,
        commit_id: "n2".to_string(),
      },
      BranchUpdate {
        name: "feature".to_string(),
        original_depth: 1,
        new_depth: 1,
        commit_id: "n1".to_string(),
      },
      BranchUpdate {
        name: "main".to_string(),
        original_depth: 2,
        new_depth: 2,
        commit_id: "n2".to_string(),
      },
    ]
  );
}

#[test]
fn test_swap_moves_a_non_current_branch_off_the_target() {
  let positions = vec![position("other", 2)];
  let new_commits = vec![entry("n0"), entry("n1"), entry("n2")];

  let (updates, lost) = map_branches(Operation::Swap, &positions, 2, "main", &new_commits);

  assert!(lost.is_empty());
  assert_eq!(updates[0].new_depth, 0);
  assert_eq!(updates[0].commit_id, "n0");
}

#[test]
fn test_out_of_range_mappings_are_reported_as_lost() {
  // a range shrunk by force-linearization leaves late depths unmappable
  let positions = vec![position("keep", 0), position("main", 4)];
  let new_commits = vec![entry("n0"), entry("n1")];

  let (updates, lost) = map_branches(Operation::Drop, &positions, 1, "main", &new_commits);

  assert_eq!(lost, vec!["main"]);
  assert_eq!(
    updates,
    vec![BranchUpdate {
      name: "keep".to_string(),
      original_depth: 0,
      new_depth: 0,
      commit_id: "n0".to_string(),
    }]
  );
}
