use git_executor::git_command_executor::GitCommandExecutor;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// Constants for test Git user configuration
const TEST_USER_NAME: &str = "Test User";
const TEST_USER_EMAIL: &str = "test@example.com";

/// Git test repository wrapper with helper methods
pub struct TestRepo {
  dir: TempDir,
  git_executor: GitCommandExecutor,
}

impl Default for TestRepo {
  fn default() -> Self {
    Self::new()
  }
}

impl TestRepo {
  /// Creates a new test repository with a deterministic initial branch name
  pub fn new() -> Self {
    let dir = tempfile::tempdir().unwrap();
    let repo_path = dir.path();
    let git_executor = GitCommandExecutor::new();

    git_executor
      .execute_command(&["init", "--initial-branch=main"], repo_path.to_str().unwrap())
      .unwrap_or_else(|e| panic!("Git init failed: {}", e));

    Self::configure_git_user(&git_executor, repo_path.to_str().unwrap()).unwrap();

    Self { dir, git_executor }
  }

  /// Get the repository path
  pub fn path(&self) -> &Path {
    self.dir.path()
  }

  /// Get the repository path as a string
  pub fn path_str(&self) -> &str {
    self.dir.path().to_str().unwrap()
  }

  /// Access the executor used by this repository
  pub fn executor(&self) -> &GitCommandExecutor {
    &self.git_executor
  }

  /// Configure Git user for a repository
  fn configure_git_user(git_executor: &GitCommandExecutor, repo_path: &str) -> Result<(), anyhow::Error> {
    git_executor.execute_command(&["config", "user.name", TEST_USER_NAME], repo_path)?;
    git_executor.execute_command(&["config", "user.email", TEST_USER_EMAIL], repo_path)?;
    Ok(())
  }

  /// Write a file without staging it
  pub fn write_file(&self, filename: &str, content: &str) {
    let file_path = self.path().join(filename);
    if let Some(parent) = file_path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(&file_path, content).unwrap();
  }

  /// Write a file and stage it without committing
  pub fn stage_file(&self, filename: &str, content: &str) {
    self.write_file(filename, content);
    self
      .git_executor
      .execute_command(&["add", filename], self.path_str())
      .unwrap_or_else(|e| panic!("Git add failed: {}", e));
  }

  /// Creates a commit with a file
  pub fn create_commit(&self, message: &str, filename: &str, content: &str) -> String {
    self.stage_file(filename, content);
    self
      .git_executor
      .execute_command(&["commit", "-m", message], self.path_str())
      .unwrap_or_else(|e| panic!("Git commit failed: {}", e));
    self.head()
  }

  /// Creates a commit with multiple files
  pub fn create_commit_with_files(&self, message: &str, files: &[(&str, &str)]) -> String {
    for (filename, content) in files {
      self.stage_file(filename, content);
    }
    self
      .git_executor
      .execute_command(&["commit", "-m", message], self.path_str())
      .unwrap_or_else(|e| panic!("Git commit failed: {}", e));
    self.head()
  }

  /// Creates a branch pointing to the current HEAD
  pub fn create_branch(&self, branch_name: &str) -> Result<(), String> {
    self
      .git_executor
      .execute_command(&["branch", branch_name], self.path_str())
      .map(|_| ())
      .map_err(|e| e.to_string())
  }

  /// Creates a branch pointing to a specific commit
  pub fn create_branch_at(&self, branch_name: &str, commit_hash: &str) -> Result<(), String> {
    self
      .git_executor
      .execute_command(&["branch", branch_name, commit_hash], self.path_str())
      .map(|_| ())
      .map_err(|e| e.to_string())
  }

  /// Checkout a branch or commit
  pub fn checkout(&self, ref_name: &str) -> Result<(), String> {
    self
      .git_executor
      .execute_command(&["checkout", ref_name], self.path_str())
      .map(|_| ())
      .map_err(|e| e.to_string())
  }

  /// Get the current HEAD commit hash
  pub fn head(&self) -> String {
    self.git_executor.execute_command(&["rev-parse", "HEAD"], self.path_str()).unwrap().trim().to_string()
  }

  /// Get the commit hash of a reference
  pub fn rev_parse(&self, ref_name: &str) -> Result<String, String> {
    self
      .git_executor
      .execute_command(&["rev-parse", ref_name], self.path_str())
      .map(|output| output.trim().to_string())
      .map_err(|e| e.to_string())
  }

  /// Get the tree id of a revision
  pub fn tree_id(&self, ref_name: &str) -> String {
    let tree_ref = format!("{ref_name}^{{tree}}");
    self.git_executor.execute_command(&["rev-parse", &tree_ref], self.path_str()).unwrap().trim().to_string()
  }

  /// Get current branch name
  pub fn current_branch(&self) -> Result<String, String> {
    self
      .git_executor
      .execute_command(&["branch", "--show-current"], self.path_str())
      .map(|output| output.trim().to_string())
      .map_err(|e| e.to_string())
  }

  /// Check if branch exists
  pub fn branch_exists(&self, branch_name: &str) -> bool {
    let ref_path = format!("refs/heads/{branch_name}");
    self
      .git_executor
      .execute_command_with_status(&["show-ref", "--verify", "--quiet", &ref_path], self.path_str())
      .map(|(_, exit_code)| exit_code == 0)
      .unwrap_or(false)
  }

  /// List branches matching a pattern
  pub fn list_branches(&self, pattern: &str) -> Result<Vec<String>, String> {
    self
      .git_executor
      .execute_command_lines(&["branch", "--list", pattern], self.path_str())
      .map(|lines| lines.into_iter().map(|line| line.trim().trim_start_matches("* ").to_string()).collect())
      .map_err(|e| e.to_string())
  }

  /// Get the last N commit subjects from HEAD, newest first
  pub fn get_commit_messages(&self, count: usize) -> Vec<String> {
    let count_arg = format!("-{count}");
    self
      .git_executor
      .execute_command_lines(&["log", &count_arg, "--pretty=format:%s"], self.path_str())
      .unwrap_or_default()
  }

  /// Full commit message of a revision
  pub fn commit_message(&self, ref_name: &str) -> String {
    self
      .git_executor
      .execute_command(&["log", "-1", "--format=%B", ref_name], self.path_str())
      .unwrap()
      .trim()
      .to_string()
  }

  /// Detach HEAD at the given revision
  pub fn detach_head(&self, ref_name: &str) -> Result<(), String> {
    self
      .git_executor
      .execute_command(&["checkout", "--detach", ref_name], self.path_str())
      .map(|_| ())
      .map_err(|e| e.to_string())
  }

  /// Create and checkout a new branch
  pub fn checkout_new_branch(&self, branch_name: &str) -> Result<(), String> {
    self
      .git_executor
      .execute_command(&["checkout", "-b", branch_name], self.path_str())
      .map(|_| ())
      .map_err(|e| e.to_string())
  }

  /// Merge a branch with --no-ff (creates a merge commit)
  pub fn merge_no_ff(&self, branch: &str, message: &str) -> Result<String, String> {
    self
      .git_executor
      .execute_command(&["merge", "--no-ff", branch, "-m", message], self.path_str())
      .map(|_| self.head())
      .map_err(|e| e.to_string())
  }

  /// Get list of files in a commit
  pub fn get_files_in_commit(&self, commit_hash: &str) -> Result<Vec<String>, String> {
    self
      .git_executor
      .execute_command_lines(&["ls-tree", "-r", "--name-only", commit_hash], self.path_str())
      .map_err(|e| e.to_string())
  }
}
