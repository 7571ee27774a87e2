//! `gcomet generate`: staged diff to commit.

use tracing::{debug, warn};

use crate::config::{ConfigResolver, ModelTier};
use crate::error::{CommandError, GenerateError};
use crate::generator::{CommitMessage, CommitMessageGenerator, GenerationRequest};
use crate::git::VersionControlProvider;
use crate::security::SensitiveDataScanner;

use super::{CommitAction, Prompter, print_remote_messages};

/// Flags of the generate command.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Skip every confirmation and commit directly.
    pub force: bool,
    /// Model for this run only.
    pub model: Option<ModelTier>,
    /// Print the message instead of committing. Never prompts.
    pub stdout: bool,
}

/// How a generate run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    Committed(String),
    Printed(String),
    Cancelled,
}

/// Message used when the inference service cannot be reached.
pub fn fallback_message(file_count: usize) -> String {
    format!("chore: update {file_count} files")
}

/// Run the generation flow against the given collaborators.
pub async fn run_generate(
    resolver: &mut ConfigResolver,
    vcs: &dyn VersionControlProvider,
    generator: &dyn CommitMessageGenerator,
    scanner: &SensitiveDataScanner,
    prompter: &dyn Prompter,
    options: &GenerateOptions,
) -> Result<GenerateOutcome, CommandError> {
    if !vcs.has_staged_changes()? {
        return Err(CommandError::NoStagedChanges);
    }

    let config = resolver.load().await?;
    let model = options.model.unwrap_or(config.model);
    let always_ask = config.always_ask_before_commit;
    let max_diff_size = config.max_diff_size;
    print_remote_messages(resolver);

    let token = resolver
        .resolve_credential()
        .await?
        .ok_or(CommandError::CredentialMissing)?;

    let diff = vcs.staged_diff(max_diff_size)?;
    if diff.truncated {
        debug!("Staged diff truncated to {} bytes", max_diff_size);
    }
    let last_commit = vcs.last_commit_message();
    let branch = vcs.current_branch();

    let findings = scanner.scan(&diff.text);
    if !findings.is_empty() {
        eprintln!("Warning: Potential sensitive data detected:");
        for finding in &findings {
            eprintln!("  {} ({})", finding, finding.label);
        }

        if !options.force {
            if options.stdout {
                return Err(GenerateError::SensitiveContent.into());
            }
            if !prompter.confirm("Continue anyway?", false)? {
                println!("Cancelled.");
                return Ok(GenerateOutcome::Cancelled);
            }
        }
    }

    if !options.stdout {
        println!("Generating commit message with {model}...");
    }

    let request = GenerationRequest {
        diff: &diff.text,
        last_commit: last_commit.as_deref(),
        branch: &branch,
        model,
        token: &token,
    };

    let message = match generator.generate(request).await {
        Ok(message) => message,
        Err(e) if e.is_transport() && !options.stdout && !options.force => {
            warn!("Generation failed: {e}");
            eprintln!("Error: {e}");
            if !prompter.confirm("Generate a basic commit message instead?", true)? {
                return Err(e.into());
            }
            let fallback = fallback_message(diff.file_count);
            println!("Fallback message: {fallback}");
            vcs.commit(&fallback)?;
            println!("Committed with fallback message.");
            return Ok(GenerateOutcome::Committed(fallback));
        }
        Err(e) => return Err(e.into()),
    };

    if options.stdout {
        let text = message.format();
        println!("{text}");
        return Ok(GenerateOutcome::Printed(text));
    }

    print_message(&message);

    if options.force || !always_ask {
        return commit(vcs, message.format());
    }

    match prompter.select_action()? {
        CommitAction::Commit => commit(vcs, message.format()),
        CommitAction::Edit => match prompter.edit_message(&message.format())? {
            Some(edited) if !edited.trim().is_empty() => commit(vcs, edited.trim().to_string()),
            _ => {
                println!("Empty message, cancelled.");
                Ok(GenerateOutcome::Cancelled)
            }
        },
        CommitAction::Cancel => {
            println!("Cancelled.");
            Ok(GenerateOutcome::Cancelled)
        }
    }
}

fn print_message(message: &CommitMessage) {
    println!("\nGenerated commit message:");
    println!("{}", message.subject);
    if let Some(body) = &message.body {
        println!("\n{body}");
    }
    println!();
}

fn commit(vcs: &dyn VersionControlProvider, text: String) -> Result<GenerateOutcome, CommandError> {
    vcs.commit(&text)?;
    println!("Committed successfully.");
    Ok(GenerateOutcome::Committed(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MockPrompter;
    use crate::config::{
        ConfigPaths, Configuration, MockCredentialHelper, MockRemoteSource, TOKEN_ENV_VAR,
    };
    use crate::error::CredentialHelperError;
    use crate::git::{MockVersionControlProvider, StagedDiff};
    use async_trait::async_trait;
    use mockall::predicate::eq;
    use serial_test::serial;
    use std::sync::Mutex;

    struct FakeGenerator {
        result: Mutex<Option<Result<CommitMessage, GenerateError>>>,
        seen_model: Mutex<Option<ModelTier>>,
    }

    impl FakeGenerator {
        fn returning(result: Result<CommitMessage, GenerateError>) -> Self {
            Self {
                result: Mutex::new(Some(result)),
                seen_model: Mutex::new(None),
            }
        }

        fn message(subject: &str, body: Option<&str>) -> Self {
            Self::returning(Ok(CommitMessage {
                subject: subject.to_string(),
                body: body.map(str::to_string),
            }))
        }
    }

    #[async_trait]
    impl CommitMessageGenerator for FakeGenerator {
        async fn generate(
            &self,
            request: GenerationRequest<'_>,
        ) -> Result<CommitMessage, GenerateError> {
            *self.seen_model.lock().unwrap() = Some(request.model);
            self.result
                .lock()
                .unwrap()
                .take()
                .expect("generator called more than once")
        }
    }

    fn transport_error() -> GenerateError {
        let err = reqwest::Client::new()
            .get("not a url")
            .build()
            .expect_err("invalid url should fail");
        GenerateError::RetriesExhausted(Box::new(GenerateError::Transport(err)))
    }

    fn resolver(dir: &tempfile::TempDir, config: Configuration) -> ConfigResolver {
        let mut remote = MockRemoteSource::new();
        remote.expect_fetch().times(0);
        let mut helper = MockCredentialHelper::new();
        helper
            .expect_token()
            .returning(|| Err(CredentialHelperError::NotInstalled));
        let defaults = Configuration {
            remote_config_url: None,
            ..config
        };
        ConfigResolver::with_sources(
            ConfigPaths::in_dir(dir.path()),
            Box::new(remote),
            Box::new(helper),
        )
        .with_defaults(defaults)
    }

    fn with_token(always_ask: bool) -> Configuration {
        Configuration {
            github_token: Some("ghp_stored".to_string()),
            always_ask_before_commit: always_ask,
            ..Configuration::default()
        }
    }

    fn staged_repo(text: &str) -> MockVersionControlProvider {
        let mut vcs = MockVersionControlProvider::new();
        vcs.expect_has_staged_changes().returning(|| Ok(true));
        let text = text.to_string();
        vcs.expect_staged_diff().returning(move |_| {
            Ok(StagedDiff {
                text: text.clone(),
                file_count: 2,
                truncated: false,
            })
        });
        vcs.expect_last_commit_message().returning(|| None);
        vcs.expect_current_branch().returning(|| "main".to_string());
        vcs
    }

    fn run(
        resolver: &mut ConfigResolver,
        vcs: &MockVersionControlProvider,
        generator: &FakeGenerator,
        prompter: &MockPrompter,
        options: GenerateOptions,
    ) -> Result<GenerateOutcome, CommandError> {
        temp_env::with_var_unset(TOKEN_ENV_VAR, || {
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap()
                .block_on(run_generate(
                    resolver,
                    vcs,
                    generator,
                    &SensitiveDataScanner::new(),
                    prompter,
                    &options,
                ))
        })
    }

    #[test]
    #[serial]
    fn test_no_staged_changes() {
        let dir = tempfile::tempdir().unwrap();
        let mut resolver = resolver(&dir, with_token(true));
        let mut vcs = MockVersionControlProvider::new();
        vcs.expect_has_staged_changes().returning(|| Ok(false));
        let generator = FakeGenerator::message("unused", None);

        let result = run(&mut resolver, &vcs, &generator, &MockPrompter::new(), GenerateOptions::default());
        assert!(matches!(result, Err(CommandError::NoStagedChanges)));
    }

    #[test]
    #[serial]
    fn test_missing_credential() {
        let dir = tempfile::tempdir().unwrap();
        let mut resolver = resolver(&dir, Configuration::default());
        let vcs = staged_repo("+x");
        let generator = FakeGenerator::message("unused", None);

        let result = run(&mut resolver, &vcs, &generator, &MockPrompter::new(), GenerateOptions::default());
        assert!(matches!(result, Err(CommandError::CredentialMissing)));
    }

    #[test]
    #[serial]
    fn test_force_commits_full_message() {
        let dir = tempfile::tempdir().unwrap();
        let mut resolver = resolver(&dir, with_token(true));
        let mut vcs = staged_repo("+fn login() {}");
        vcs.expect_commit()
            .with(eq("feat(auth): add login\n\nAdds the handler."))
            .times(1)
            .returning(|_| Ok(()));
        let generator = FakeGenerator::message("feat(auth): add login", Some("Adds the handler."));

        let options = GenerateOptions {
            force: true,
            ..Default::default()
        };
        let result = run(&mut resolver, &vcs, &generator, &MockPrompter::new(), options).unwrap();
        assert_eq!(
            result,
            GenerateOutcome::Committed("feat(auth): add login\n\nAdds the handler.".to_string())
        );
    }

    #[test]
    #[serial]
    fn test_stdout_prints_without_committing() {
        let dir = tempfile::tempdir().unwrap();
        let mut resolver = resolver(&dir, with_token(true));
        let mut vcs = staged_repo("+x");
        vcs.expect_commit().times(0);
        let generator = FakeGenerator::message("fix: handle empty input", None);

        let options = GenerateOptions {
            stdout: true,
            ..Default::default()
        };
        let result = run(&mut resolver, &vcs, &generator, &MockPrompter::new(), options).unwrap();
        assert_eq!(result, GenerateOutcome::Printed("fix: handle empty input".to_string()));
    }

    #[test]
    #[serial]
    fn test_model_override_reaches_generator() {
        let dir = tempfile::tempdir().unwrap();
        let mut resolver = resolver(&dir, with_token(false));
        let mut vcs = staged_repo("+x");
        vcs.expect_commit().returning(|_| Ok(()));
        let generator = FakeGenerator::message("chore: tidy", None);

        let options = GenerateOptions {
            model: Some(ModelTier::Accurate),
            ..Default::default()
        };
        run(&mut resolver, &vcs, &generator, &MockPrompter::new(), options).unwrap();
        assert_eq!(*generator.seen_model.lock().unwrap(), Some(ModelTier::Accurate));
    }

    #[test]
    #[serial]
    fn test_sensitive_diff_declined() {
        let dir = tempfile::tempdir().unwrap();
        let mut resolver = resolver(&dir, with_token(true));
        let mut vcs = staged_repo("+password=\"hunter2hunter2\"");
        vcs.expect_commit().times(0);
        let generator = FakeGenerator::message("unused", None);
        let mut prompter = MockPrompter::new();
        prompter
            .expect_confirm()
            .withf(|prompt, default| prompt.starts_with("Continue anyway") && !*default)
            .times(1)
            .returning(|_, _| Ok(false));

        let result = run(&mut resolver, &vcs, &generator, &prompter, GenerateOptions::default()).unwrap();
        assert_eq!(result, GenerateOutcome::Cancelled);
        assert!(generator.seen_model.lock().unwrap().is_none());
    }

    #[test]
    #[serial]
    fn test_sensitive_diff_in_stdout_mode_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut resolver = resolver(&dir, with_token(true));
        let vcs = staged_repo("+password=\"hunter2hunter2\"");
        let generator = FakeGenerator::message("unused", None);

        let options = GenerateOptions {
            stdout: true,
            ..Default::default()
        };
        let result = run(&mut resolver, &vcs, &generator, &MockPrompter::new(), options);
        assert!(matches!(
            result,
            Err(CommandError::Generate(GenerateError::SensitiveContent))
        ));
    }

    #[test]
    #[serial]
    fn test_edit_action_commits_edited_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut resolver = resolver(&dir, with_token(true));
        let mut vcs = staged_repo("+x");
        vcs.expect_commit()
            .with(eq("docs: rewrite intro"))
            .times(1)
            .returning(|_| Ok(()));
        let generator = FakeGenerator::message("docs: update readme", None);
        let mut prompter = MockPrompter::new();
        prompter
            .expect_select_action()
            .returning(|| Ok(CommitAction::Edit));
        prompter
            .expect_edit_message()
            .with(eq("docs: update readme"))
            .returning(|_| Ok(Some("docs: rewrite intro\n".to_string())));

        let result = run(&mut resolver, &vcs, &generator, &prompter, GenerateOptions::default()).unwrap();
        assert_eq!(result, GenerateOutcome::Committed("docs: rewrite intro".to_string()));
    }

    #[test]
    #[serial]
    fn test_cancel_action() {
        let dir = tempfile::tempdir().unwrap();
        let mut resolver = resolver(&dir, with_token(true));
        let mut vcs = staged_repo("+x");
        vcs.expect_commit().times(0);
        let generator = FakeGenerator::message("docs: update readme", None);
        let mut prompter = MockPrompter::new();
        prompter
            .expect_select_action()
            .returning(|| Ok(CommitAction::Cancel));

        let result = run(&mut resolver, &vcs, &generator, &prompter, GenerateOptions::default()).unwrap();
        assert_eq!(result, GenerateOutcome::Cancelled);
    }

    #[test]
    #[serial]
    fn test_transport_failure_offers_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let mut resolver = resolver(&dir, with_token(true));
        let mut vcs = staged_repo("+x");
        vcs.expect_commit()
            .with(eq("chore: update 2 files"))
            .times(1)
            .returning(|_| Ok(()));
        let generator = FakeGenerator::returning(Err(transport_error()));
        let mut prompter = MockPrompter::new();
        prompter.expect_confirm().returning(|_, _| Ok(true));

        let result = run(&mut resolver, &vcs, &generator, &prompter, GenerateOptions::default()).unwrap();
        assert_eq!(result, GenerateOutcome::Committed("chore: update 2 files".to_string()));
    }

    #[test]
    #[serial]
    fn test_status_errors_are_not_softened() {
        let dir = tempfile::tempdir().unwrap();
        let mut resolver = resolver(&dir, with_token(true));
        let mut vcs = staged_repo("+x");
        vcs.expect_commit().times(0);
        let generator = FakeGenerator::returning(Err(GenerateError::Unauthorized));

        let result = run(&mut resolver, &vcs, &generator, &MockPrompter::new(), GenerateOptions::default());
        assert!(matches!(
            result,
            Err(CommandError::Generate(GenerateError::Unauthorized))
        ));
    }

    #[test]
    fn test_fallback_message() {
        assert_eq!(fallback_message(3), "chore: update 3 files");
    }
}
