//! Regex heuristics that flag likely secrets in a diff.
//!
//! This is a warn-and-confirm gate, not a hard block: false positives are
//! expected and the caller can override them.

use std::fmt;

use regex_lite::Regex;

/// Maximum number of characters of a match echoed back in a finding.
pub const PREVIEW_LENGTH: usize = 50;

/// Marker appended to every truncated preview.
const ELLIPSIS: &str = "...";

/// Ordered (label, pattern) table. All patterns are matched case-insensitively.
const SENSITIVE_PATTERNS: &[(&str, &str)] = &[
    ("api key", r#"api[_-]?key[_-]?=?["\s]*([a-zA-Z0-9_-]{20,})"#),
    ("secret key", r#"secret[_-]?key[_-]?=?["\s]*([a-zA-Z0-9_-]{20,})"#),
    ("password", r#"password[_-]?=?["\s]*([^\s"']{8,})"#),
    ("token", r#"token[_-]?=?["\s]*([a-zA-Z0-9_-]{20,})"#),
    ("private key name", r"private[_-]?key"),
    ("PEM private key", r"-----BEGIN[\s\S]*PRIVATE KEY[\s\S]*-----"),
    ("GitHub fine-grained token", r"github_pat_[a-zA-Z0-9_]{82}"),
    ("GitHub classic token", r"ghp_[a-zA-Z0-9]{36}"),
    ("AWS access key id", r"aws_access_key_id"),
    ("AWS secret access key", r"aws_secret_access_key"),
];

/// One truncated match produced by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Which pattern produced the match.
    pub label: &'static str,
    /// The first [`PREVIEW_LENGTH`] characters of the match plus `...`.
    pub preview: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.preview)
    }
}

/// Classifies text against the fixed sensitive-pattern table.
pub struct SensitiveDataScanner {
    patterns: Vec<(&'static str, Regex)>,
}

impl SensitiveDataScanner {
    pub fn new() -> Self {
        let patterns = SENSITIVE_PATTERNS
            .iter()
            .map(|(label, pattern)| {
                let re = Regex::new(&format!("(?i){pattern}")).expect("Invalid regex");
                (*label, re)
            })
            .collect();
        Self { patterns }
    }

    /// Return every match of every pattern, in table order then match order.
    pub fn scan(&self, text: &str) -> Vec<Finding> {
        let mut findings = Vec::new();
        for (label, re) in &self.patterns {
            for m in re.find_iter(text) {
                findings.push(Finding {
                    label,
                    preview: preview(m.as_str()),
                });
            }
        }
        findings
    }

    /// Whether `scan` would report anything. Stops at the first hit.
    pub fn has_sensitive_data(&self, text: &str) -> bool {
        self.patterns.iter().any(|(_, re)| re.is_match(text))
    }
}

impl Default for SensitiveDataScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Truncate on a char boundary so multi-byte input never panics.
fn preview(matched: &str) -> String {
    let mut out: String = matched.chars().take(PREVIEW_LENGTH).collect();
    out.push_str(ELLIPSIS);
    out
}
