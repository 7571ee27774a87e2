//! git2-backed [`VersionControlProvider`].

use std::path::{Path, PathBuf};

use git2::{Diff, DiffFormat, ErrorCode, Repository, Tree};
use tracing::warn;

use crate::error::{GitError, HookError};

use super::VersionControlProvider;
use super::executor::run_git;
use super::hook;

/// Branch name reported when HEAD cannot be resolved.
const FALLBACK_BRANCH: &str = "main";

/// Staged changes rendered as a unified diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedDiff {
    pub text: String,
    /// Number of files with staged changes.
    pub file_count: usize,
    /// Whether `text` was cut short by the size cap.
    pub truncated: bool,
}

/// A repository opened from the current working tree.
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Find the repository containing `path`, searching parent directories.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let repo = Repository::discover(path).map_err(GitError::OpenRepository)?;
        Ok(Self { repo })
    }

    pub fn from_repository(repo: Repository) -> Self {
        Self { repo }
    }

    /// The `.git` directory.
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// The working tree root (the git dir for bare repositories).
    pub fn workdir(&self) -> &Path {
        self.repo.workdir().unwrap_or_else(|| self.repo.path())
    }

    fn staged(&self) -> Result<Diff<'_>, GitError> {
        let head_tree = resolve_head_tree(&self.repo)?;
        self.repo
            .diff_tree_to_index(head_tree.as_ref(), None, None)
            .map_err(GitError::DiffFailed)
    }
}

impl VersionControlProvider for GitRepository {
    fn staged_diff(&self, max_len: usize) -> Result<StagedDiff, GitError> {
        let diff = self.staged()?;
        let file_count = diff.deltas().len();
        let (text, truncated) = render_patch(&diff, max_len);
        Ok(StagedDiff {
            text,
            file_count,
            truncated,
        })
    }

    fn has_staged_changes(&self) -> Result<bool, GitError> {
        Ok(self.staged()?.deltas().len() > 0)
    }

    fn last_commit_message(&self) -> Option<String> {
        let commit = self.repo.head().ok()?.peel_to_commit().ok()?;
        commit
            .summary()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn current_branch(&self) -> String {
        match self.repo.head() {
            Ok(head) => head.shorthand().unwrap_or(FALLBACK_BRANCH).to_string(),
            // An unborn branch still names its target in HEAD.
            Err(_) => self
                .repo
                .find_reference("HEAD")
                .ok()
                .and_then(|r| r.symbolic_target().map(str::to_string))
                .and_then(|t| t.strip_prefix("refs/heads/").map(str::to_string))
                .unwrap_or_else(|| FALLBACK_BRANCH.to_string()),
        }
    }

    fn commit(&self, message: &str) -> Result<(), GitError> {
        run_git(self.workdir(), &["commit", "-m", message], "commit")
    }

    fn install_hook(&self) -> Result<PathBuf, HookError> {
        hook::install(self.git_dir())
    }

    fn uninstall_hook(&self) -> Result<PathBuf, HookError> {
        hook::uninstall(self.git_dir())
    }
}

/// Resolve the HEAD tree, distinguishing empty-repo errors from real failures.
///
/// Returns `Ok(None)` for repos with no commits (unborn branch / not found).
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, GitError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(GitError::DiffFailed(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(GitError::DiffFailed)?;
    Ok(Some(tree))
}

/// Render a diff as patch text, stopping before `max_len` bytes.
fn render_patch(diff: &Diff<'_>, max_len: usize) -> (String, bool) {
    let mut text = String::new();
    let mut truncated = false;

    let result = diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let content = std::str::from_utf8(line.content()).unwrap_or("");
        let origin = line.origin();
        let prefix_len = usize::from(matches!(origin, '+' | '-' | ' '));

        if text.len() + prefix_len + content.len() > max_len {
            truncated = true;
            return false;
        }

        if prefix_len == 1 {
            text.push(origin);
        }
        text.push_str(content);
        true
    });

    // Returning false from the callback surfaces as a user-abort error.
    if let Err(e) = result
        && !truncated
    {
        warn!("Failed to render staged diff: {e}");
        truncated = true;
    }

    (text, truncated)
}
