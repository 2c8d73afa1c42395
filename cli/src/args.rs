use clap::{ArgGroup, Parser};
use edit_ops::model::{EditRequest, Operation};

#[derive(Parser, Debug)]
#[command(
  name = "git-edit",
  version,
  about = "Targeted commit-history surgery: fixup, reorder, drop and swap commits while keeping branches in place",
  group = ArgGroup::new("operation").required(true).multiple(false),
)]
pub struct Args {
  /// Squash the second commit (or staged changes) into the first
  #[arg(long, group = "operation")]
  pub fixup: bool,

  /// Like --fixup, but the squashed commit's message replaces the base's
  #[arg(long, group = "operation")]
  pub amend: bool,

  /// Relocate the second commit (or a commit from staged changes) to immediately follow the first
  #[arg(long, group = "operation")]
  pub pick: bool,

  /// Remove the given commit from history
  #[arg(long, group = "operation")]
  pub drop: bool,

  /// Exchange the positions of two commits
  #[arg(long, group = "operation")]
  pub swap: bool,

  /// Linearize merge commits found in the affected range
  #[arg(long)]
  pub force: bool,

  /// Message for the commit created from staged changes
  #[arg(short, long)]
  pub message: Option<String>,

  /// Base commit (for --drop: the commit to remove), plus an optional second commit
  #[arg(value_name = "COMMIT", num_args = 1..=2, required = true)]
  pub commits: Vec<String>,
}

impl Args {
  fn operation(&self) -> Operation {
    if self.fixup {
      Operation::Fixup
    } else if self.amend {
      Operation::Amend
    } else if self.pick {
      Operation::Pick
    } else if self.drop {
      Operation::Drop
    } else {
      Operation::Swap
    }
  }

  pub fn into_request(self) -> Result<EditRequest, String> {
    let operation = self.operation();
    if operation == Operation::Drop && self.commits.len() != 1 {
      return Err("--drop takes exactly one commit argument".to_string());
    }

    let mut commits = self.commits.into_iter();
    let first_spec = commits.next().ok_or_else(|| "a commit argument is required".to_string())?;
    Ok(EditRequest {
      operation,
      first_spec,
      second_spec: commits.next(),
      force: self.force,
      message: self.message,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use clap::CommandFactory;
  use clap::Parser;

  #[test]
  fn verify_cli() {
    Args::command().debug_assert();
  }

  #[test]
  fn test_single_operation_flag_required() {
    assert!(Args::try_parse_from(["git-edit", "HEAD~2"]).is_err());
    assert!(Args::try_parse_from(["git-edit", "--fixup", "--drop", "HEAD~2"]).is_err());
    assert!(Args::try_parse_from(["git-edit", "--fixup", "HEAD~2"]).is_ok());
  }

  #[test]
  fn test_drop_takes_exactly_one_commit() {
    let args = Args::try_parse_from(["git-edit", "--drop", "HEAD~1", "HEAD~2"]).unwrap();
    assert!(args.into_request().is_err());

    let args = Args::try_parse_from(["git-edit", "--drop", "HEAD~1"]).unwrap();
    let request = args.into_request().unwrap();
    assert_eq!(request.operation, Operation::Drop);
    assert_eq!(request.first_spec, "HEAD~1");
    assert_eq!(request.second_spec, None);
  }

  #[test]
  fn test_two_commit_request() {
    let args = Args::try_parse_from(["git-edit", "--swap", "--force", "abc123", "def456"]).unwrap();
    let request = args.into_request().unwrap();
    assert_eq!(request.operation, Operation::Swap);
    assert_eq!(request.first_spec, "abc123");
    assert_eq!(request.second_spec, Some("def456".to_string()));
    assert!(request.force);
  }

  #[test]
  fn test_message_flag() {
    let args = Args::try_parse_from(["git-edit", "--amend", "-m", "better subject", "HEAD~3"]).unwrap();
    let request = args.into_request().unwrap();
    assert_eq!(request.message, Some("better subject".to_string()));
  }
}
