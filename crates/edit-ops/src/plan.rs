use crate::branch_track::CommitEntry;
use crate::model::{EditError, Operation};
use anyhow::anyhow;
use tracing::instrument;

/// Message-prefix convention marking a squash commit that should also
/// replace the base commit's message.
pub const AMEND_PREFIX: &str = "amend!";

/// One step of the synthesized rewrite sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
  /// Keep the commit as-is
  Pick(CommitEntry),
  /// Squash the commit into the previous directive's commit; with
  /// `inherit_message` the squashed commit's message replaces the base's
  Squash { commit: CommitEntry, inherit_message: bool },
}

/// Ordered rewrite sequence plus the coordinates the post-rewrite mapper
/// needs to adjust branch depths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewritePlan {
  pub directives: Vec<Directive>,
  /// Depth index of the operation-relevant commit in the original range
  pub target_depth: usize,
}

impl RewritePlan {
  /// Number of commits a successful rewrite of this plan must produce.
  /// Each pick yields one commit; squashes fold into their predecessor.
  pub fn expected_commit_count(&self) -> usize {
    self.directives.iter().filter(|d| matches!(d, Directive::Pick(_))).count()
  }
}

fn pick_all<'a>(directives: &mut Vec<Directive>, commits: impl Iterator<Item = &'a CommitEntry>) {
  // Merge commits cannot be expressed as single-parent directives; the
  // caller has already gated on --force, which linearizes by omission
  for commit in commits {
    if !commit.is_merge {
      directives.push(Directive::Pick(commit.clone()));
    }
  }
}

/// Produce the rewrite sequence for the operation. `commits` is the original
/// range oldest-first with the base at depth 0; `target_id` is the
/// operation-relevant commit and must sit strictly after the base.
#[instrument(skip(commits))]
pub fn synthesize_plan(operation: Operation, commits: &[CommitEntry], target_id: &str) -> Result<RewritePlan, EditError> {
  let target_depth = commits
    .iter()
    .position(|c| c.id == target_id)
    .ok_or_else(|| anyhow!("target commit {target_id} not found in the affected range"))?;
  if target_depth == 0 {
    return Err(EditError::Other(anyhow!("target commit {target_id} coincides with the base")));
  }

  let base = &commits[0];
  let target = &commits[target_depth];
  let mut directives = Vec::with_capacity(commits.len());

  match operation {
    Operation::Fixup | Operation::Amend => {
      let inherit_message = operation == Operation::Amend || target.subject.starts_with(AMEND_PREFIX);
      directives.push(Directive::Pick(base.clone()));
      directives.push(Directive::Squash { commit: target.clone(), inherit_message });
      pick_all(&mut directives, commits[1..target_depth].iter());
      pick_all(&mut directives, commits[target_depth + 1..].iter());
    }
    Operation::Pick => {
      directives.push(Directive::Pick(base.clone()));
      directives.push(Directive::Pick(target.clone()));
      pick_all(&mut directives, commits[1..target_depth].iter());
      pick_all(&mut directives, commits[target_depth + 1..].iter());
    }
    Operation::Drop => {
      directives.push(Directive::Pick(base.clone()));
      pick_all(&mut directives, commits[1..target_depth].iter());
      pick_all(&mut directives, commits[target_depth + 1..].iter());
    }
    Operation::Swap => {
      // the descendant ("late") takes the base's position and vice versa
      directives.push(Directive::Pick(target.clone()));
      pick_all(&mut directives, commits[1..target_depth].iter());
      directives.push(Directive::Pick(base.clone()));
      pick_all(&mut directives, commits[target_depth + 1..].iter());
    }
  }

  Ok(RewritePlan { directives, target_depth })
}
