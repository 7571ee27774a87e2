//! Parsed commit messages.

/// Literal the model is instructed to start with when it sees secrets.
pub const SENSITIVE_MARKER: &str = "SENSITIVE DATA DETECTED";

/// A commit message split into subject and optional body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    pub subject: String,
    pub body: Option<String>,
}

impl CommitMessage {
    /// Parse raw model output.
    ///
    /// The first non-empty line is the subject and everything after it is the
    /// body. Markdown code fences around the message are dropped. Returns
    /// `None` when no subject line remains.
    pub fn parse(content: &str) -> Option<Self> {
        let lines: Vec<&str> = content
            .lines()
            .filter(|line| !line.trim_start().starts_with("```"))
            .collect();

        let subject_idx = lines.iter().position(|line| !line.trim().is_empty())?;
        let subject = lines[subject_idx].trim().to_string();
        let body = lines[subject_idx + 1..].join("\n").trim().to_string();

        Some(Self {
            subject,
            body: (!body.is_empty()).then_some(body),
        })
    }

    /// Format for `git commit`: subject, blank line, body.
    pub fn format(&self) -> String {
        match self.body.as_deref().map(str::trim) {
            Some(body) if !body.is_empty() => format!("{}\n\n{}", self.subject, body),
            _ => self.subject.clone(),
        }
    }
}

/// Whether the model flagged the diff instead of writing a message.
///
/// Leading emoji or punctuation before the marker are ignored.
pub fn is_sensitive_warning(content: &str) -> bool {
    content
        .trim_start_matches(|c: char| !c.is_ascii_alphanumeric())
        .to_ascii_uppercase()
        .starts_with(SENSITIVE_MARKER)
}
