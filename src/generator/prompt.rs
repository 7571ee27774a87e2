//! Prompt construction for commit message generation.

/// Maximum diff characters embedded in the prompt.
pub const MAX_PROMPT_DIFF_CHARS: usize = 5_000;

/// Branches whose name carries no useful context.
const DEFAULT_BRANCHES: &[&str] = &["main", "master"];

pub const SYSTEM_PROMPT: &str = r#"You write Git commit messages. Follow these rules strictly:

1. Use the Conventional Commits format: type(scope): description
2. Type is one of: feat, fix, docs, style, refactor, perf, test, build, ci, chore
3. Use the imperative mood ("add", "fix", "update", not "added", "fixed", "updated")
4. The subject line is at most 50 characters with no trailing period
5. Produce exactly ONE commit message, in English, with no surrounding commentary
6. An optional body may follow the subject after a blank line and should explain why
7. If the diff contains secrets (keys, passwords, tokens), reply starting with "⚠️ SENSITIVE DATA DETECTED" instead of a message

Examples:
- feat(auth): add password validation
- fix(api): handle null response error
- docs: update installation guide
- refactor(utils): extract helper functions"#;

/// Build the user prompt from the diff and repository context.
///
/// The diff is capped at [`MAX_PROMPT_DIFF_CHARS`]; the branch is mentioned
/// only when it is not a default branch.
pub fn build_user_prompt(diff: &str, last_commit: Option<&str>, branch: &str) -> String {
    let mut prompt = String::from("Generate a commit message for these staged changes:\n\n");

    prompt.push_str("DIFF:\n");
    if diff.chars().count() > MAX_PROMPT_DIFF_CHARS {
        prompt.extend(diff.chars().take(MAX_PROMPT_DIFF_CHARS));
        prompt.push_str("\n... (truncated)");
    } else {
        prompt.push_str(diff);
    }
    prompt.push_str("\n\n");

    if let Some(last) = last_commit.filter(|l| !l.trim().is_empty()) {
        prompt.push_str(&format!("LAST COMMIT: {}\n", last.trim()));
    }

    if !branch.is_empty() && !DEFAULT_BRANCHES.contains(&branch) {
        prompt.push_str(&format!("BRANCH: {branch}\n"));
    }

    prompt.push_str("\nGenerate ONE commit message following the Conventional Commits format.");
    prompt
}
