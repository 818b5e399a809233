//! # Validation Diagnostics
//!
//! One [`Diagnostic`] describes one violation: a `$`-rooted path locating the
//! offending field, a human-readable message, and optionally the expected and
//! received values. Validators accumulate diagnostics instead of stopping at
//! the first problem, so a single pass reports everything wrong with a
//! payload; the rendered form is specific enough to embed verbatim into a
//! retry-with-feedback request against the generative source.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One structural record of a single validation violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Dot/bracket path rooted at `$`, e.g. `$.students[2].riskLevel`
    pub path: String,

    /// Human-readable description of the violation
    pub message: String,

    /// What the contract requires, when it can be stated compactly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,

    /// What the payload actually contained
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,
}

impl Diagnostic {
    /// Diagnostic with path and message only.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            expected: None,
            received: None,
        }
    }

    /// Diagnostic carrying expected and received values.
    pub fn with_detail(
        path: impl Into<String>,
        message: impl Into<String>,
        expected: impl Into<String>,
        received: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            expected: Some(expected.into()),
            received: Some(received.into()),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)?;
        match (&self.expected, &self.received) {
            (Some(expected), Some(received)) => {
                write!(f, " (expected {expected}, received {received})")
            }
            (Some(expected), None) => write!(f, " (expected {expected})"),
            (None, Some(received)) => write!(f, " (received {received})"),
            (None, None) => Ok(()),
        }
    }
}

/// Builder for `$`-rooted dot/bracket paths.
///
/// Each `key`/`index` step yields a new path so sibling fields can extend the
/// same parent independently while the validator recurses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticPath(String);

impl DiagnosticPath {
    /// The document root, `$`.
    pub fn root() -> Self {
        Self("$".to_string())
    }

    /// Extend with an object key: `$.students`.
    pub fn key(&self, name: &str) -> Self {
        Self(format!("{}.{name}", self.0))
    }

    /// Extend with an array index: `$.students[3]`.
    pub fn index(&self, i: usize) -> Self {
        Self(format!("{}[{i}]", self.0))
    }

    /// The rendered path.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiagnosticPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<DiagnosticPath> for String {
    fn from(path: DiagnosticPath) -> Self {
        path.0
    }
}
