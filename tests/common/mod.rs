//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use git2::{Oid, Repository, Signature};

use gcomet::commands::{CommitAction, Prompter};
use gcomet::config::{
    ConfigPaths, ConfigResolver, Configuration, CredentialHelper, ModelTier, RemoteOverride,
    RemoteSource,
};
use gcomet::error::{CredentialHelperError, RemoteFetchError};
use gcomet::git::GitRepository;

/// Create a temporary directory for test output.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository with a committer identity configured.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        {
            let mut config = repo.config().expect("Failed to open repo config");
            config
                .set_str("user.name", "Test User")
                .expect("Failed to set user.name");
            config
                .set_str("user.email", "test@example.com")
                .expect("Failed to set user.email");
            config
                .set_bool("commit.gpgsign", false)
                .expect("Failed to set commit.gpgsign");
        }
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `name` and add it to the index.
    pub fn stage(&self, name: &str, content: &str) {
        let file_path = self.dir.path().join(name);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(&file_path, content).expect("Failed to write test file");

        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(name)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Stage `name` and commit it with the given message. Returns the commit OID.
    pub fn commit_file(&self, name: &str, content: &str, message: &str) -> Oid {
        self.stage(name, content);

        let sig = Signature::now("Test User", "test@example.com").expect("Failed to create signature");
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Full message of HEAD.
    pub fn head_message(&self) -> String {
        let head = self.repo.head().expect("Failed to read HEAD");
        let commit = head.peel_to_commit().expect("HEAD is not a commit");
        commit.message().unwrap_or_default().to_string()
    }

    /// Open the repository through the production type.
    pub fn git(&self) -> GitRepository {
        GitRepository::discover(self.dir.path()).expect("Failed to open test repo")
    }
}

/// Remote source returning a canned override and counting calls.
pub struct CountingRemote {
    calls: Arc<AtomicUsize>,
    response: Option<RemoteOverride>,
}

impl CountingRemote {
    pub fn returning(response: RemoteOverride) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            response: Some(response),
        }
    }

    /// Every fetch fails with HTTP 503.
    pub fn failing() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            response: None,
        }
    }

    /// Handle to the call counter that survives moving the source into a resolver.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl RemoteSource for CountingRemote {
    async fn fetch(&self, _url: &str) -> Result<RemoteOverride, RemoteFetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone().ok_or(RemoteFetchError::Status(503))
    }
}

/// Current value of a counter returned by [`CountingRemote::counter`].
pub fn count(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

/// Credential helper with a fixed answer.
pub struct StaticHelper(pub Option<&'static str>);

impl CredentialHelper for StaticHelper {
    fn token(&self) -> Result<String, CredentialHelperError> {
        self.0
            .map(str::to_string)
            .ok_or(CredentialHelperError::NotAuthenticated)
    }
}

/// Resolver over `dir` with the given remote source and no helper credential.
pub fn resolver_with(
    dir: &Path,
    remote: impl RemoteSource + 'static,
    defaults: Configuration,
) -> ConfigResolver {
    ConfigResolver::with_sources(
        ConfigPaths::in_dir(dir),
        Box::new(remote),
        Box::new(StaticHelper(None)),
    )
    .with_defaults(defaults)
}

/// Defaults without a remote locator, so no network is involved.
pub fn offline_defaults() -> Configuration {
    Configuration {
        remote_config_url: None,
        ..Configuration::default()
    }
}

/// Prompter that replays scripted answers and panics on unexpected questions.
#[derive(Default)]
pub struct ScriptedPrompter {
    pub confirms: Mutex<Vec<bool>>,
    pub action: Option<CommitAction>,
    pub edited: Option<String>,
    pub password: Option<String>,
    pub model: Option<ModelTier>,
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, prompt: &str, _default: bool) -> Result<bool, dialoguer::Error> {
        let mut confirms = self.confirms.lock().unwrap();
        assert!(!confirms.is_empty(), "unexpected confirm: {prompt}");
        Ok(confirms.remove(0))
    }

    fn select_action(&self) -> Result<CommitAction, dialoguer::Error> {
        Ok(self.action.expect("unexpected action prompt"))
    }

    fn edit_message(&self, _initial: &str) -> Result<Option<String>, dialoguer::Error> {
        Ok(self.edited.clone())
    }

    fn password(&self, _prompt: &str) -> Result<String, dialoguer::Error> {
        Ok(self.password.clone().expect("unexpected password prompt"))
    }

    fn select_model(&self, current: ModelTier) -> Result<ModelTier, dialoguer::Error> {
        Ok(self.model.unwrap_or(current))
    }
}
