use crate::model::EditError;
use crate::resolve::{WorktreeStatus, commit_subject, current_branch, is_ancestor, resolve_commit, worktree_status};
use pretty_assertions::assert_eq;
use test_log::test;
use test_utils::git_test_utils::TestRepo;

#[test]
fn test_resolves_symbolic_and_relative_specs() {
  let repo = TestRepo::new();
  let first = repo.create_commit("first", "a.txt", "a");
  let second = repo.create_commit("second", "b.txt", "b");

  assert_eq!(resolve_commit(repo.executor(), repo.path_str(), "HEAD").unwrap(), second);
  assert_eq!(resolve_commit(repo.executor(), repo.path_str(), "main").unwrap(), second);
  assert_eq!(resolve_commit(repo.executor(), repo.path_str(), "HEAD~1").unwrap(), first);
}

#[test]
fn test_rejects_an_unknown_reference() {
  let repo = TestRepo::new();
  repo.create_commit("first", "a.txt", "a");

  let result = resolve_commit(repo.executor(), repo.path_str(), "does-not-exist");
  assert!(matches!(result, Err(EditError::InvalidReference(spec)) if spec == "does-not-exist"));
}

#[test]
fn test_ancestor_checks() {
  let repo = TestRepo::new();
  let first = repo.create_commit("first", "a.txt", "a");
  let second = repo.create_commit("second", "b.txt", "b");

  assert!(is_ancestor(repo.executor(), repo.path_str(), &first, &second).unwrap());
  assert!(!is_ancestor(repo.executor(), repo.path_str(), &second, &first).unwrap());
  // git treats a commit as its own ancestor
  assert!(is_ancestor(repo.executor(), repo.path_str(), &first, &first).unwrap());
}

#[test]
fn test_current_branch_and_detached_head() {
  let repo = TestRepo::new();
  let head = repo.create_commit("first", "a.txt", "a");

  assert_eq!(current_branch(repo.executor(), repo.path_str()).unwrap(), Some("main".to_string()));

  repo.detach_head(&head).unwrap();
  assert_eq!(current_branch(repo.executor(), repo.path_str()).unwrap(), None);
}

#[test]
fn test_commit_subject_is_the_first_message_line() {
  let repo = TestRepo::new();
  let commit = repo.create_commit("add config\n\nwith a longer body", "a.txt", "a");

  assert_eq!(commit_subject(repo.executor(), repo.path_str(), &commit).unwrap(), "add config");
}

#[test]
fn test_worktree_status_ignores_untracked_files() {
  let repo = TestRepo::new();
  repo.create_commit("first", "tracked.txt", "original");

  assert_eq!(worktree_status(repo.executor(), repo.path_str()).unwrap(), WorktreeStatus { staged: false, unstaged: false });

  repo.write_file("untracked.txt", "anything");
  let status = worktree_status(repo.executor(), repo.path_str()).unwrap();
  assert!(status.is_clean());
}

#[test]
fn test_worktree_status_distinguishes_staged_and_unstaged() {
  let repo = TestRepo::new();
  repo.create_commit("first", "tracked.txt", "original");

  repo.write_file("tracked.txt", "modified");
  assert_eq!(worktree_status(repo.executor(), repo.path_str()).unwrap(), WorktreeStatus { staged: false, unstaged: true });

  repo.stage_file("tracked.txt", "modified");
  assert_eq!(worktree_status(repo.executor(), repo.path_str()).unwrap(), WorktreeStatus { staged: true, unstaged: false });

  repo.write_file("tracked.txt", "modified again");
  assert_eq!(worktree_status(repo.executor(), repo.path_str()).unwrap(), WorktreeStatus { staged: true, unstaged: true });
}
