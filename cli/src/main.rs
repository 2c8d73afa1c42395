mod args;

use crate::args::Args;
use clap::Parser;
use clap::error::ErrorKind;
use edit_ops::edit::HistoryEditor;
use edit_ops::model::EditOutcome;
use git_executor::git_command_executor::GitCommandExecutor;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// All diagnostics go to stderr with severity prefixes; stdout stays clean
/// for machine-relevant output.
fn init_tracing() {
  let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
  tracing_subscriber::registry()
    .with(filter)
    .with(
      tracing_subscriber::fmt::layer()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr),
    )
    .init();
}

// Catch SIGINT instead of dying: the git child exits with the signal, the
// failing step propagates an error and the cleanup guard restores the
// repository before we terminate.
#[cfg(unix)]
extern "C" fn on_interrupt(_sig: libc::c_int) {
  INTERRUPTED.store(true, Ordering::Relaxed);
}

#[cfg(unix)]
fn install_interrupt_handler() {
  unsafe {
    let handler = on_interrupt as usize;
    let _ = libc::signal(libc::SIGINT, handler);
  }
}

#[cfg(not(unix))]
fn install_interrupt_handler() {}

fn main() -> ExitCode {
  init_tracing();
  install_interrupt_handler();

  let args = match Args::try_parse() {
    Ok(args) => args,
    Err(e) => {
      let exit_code = if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        ExitCode::SUCCESS
      } else {
        ExitCode::FAILURE
      };
      // clap prints help to stdout and errors (with usage) to stderr
      let _ = e.print();
      return exit_code;
    }
  };

  let request = match args.into_request() {
    Ok(request) => request,
    Err(message) => {
      error!("{message}");
      return ExitCode::FAILURE;
    }
  };

  let git_executor = GitCommandExecutor::new();
  let repo_path = match git_executor.execute_command(&["rev-parse", "--show-toplevel"], ".") {
    Ok(path) => path,
    Err(e) => {
      error!("not inside a git repository: {e}");
      return ExitCode::FAILURE;
    }
  };

  let editor = HistoryEditor::new(&git_executor, &repo_path);
  let result = editor.edit(&request);

  if INTERRUPTED.load(Ordering::Relaxed) {
    error!("interrupted; repository restored to its original state");
    return ExitCode::FAILURE;
  }

  match result {
    Ok(EditOutcome::Completed { updated_branches, lost_branches }) => {
      info!(updated = updated_branches.len(), lost = lost_branches.len(), "history edit completed");
      ExitCode::SUCCESS
    }
    Ok(EditOutcome::NothingToDo) => ExitCode::SUCCESS,
    Err(e) => {
      error!("{e}");
      ExitCode::FAILURE
    }
  }
}
