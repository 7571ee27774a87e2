//! Sensitive-data detection for staged diffs.

pub mod scanner;

pub use scanner::{Finding, PREVIEW_LENGTH, SensitiveDataScanner};
