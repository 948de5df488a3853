use std::fmt;

use serde::Serialize;

/// One constraint violation, located by a dotted path into the document
/// (e.g. `config.visState.layers[0].config.color[1]`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub path: String,
    pub reason: String,
}

/// Every constraint violation found in a single pass over the document.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<ValidationIssue> {
        self.issues
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "document failed validation with {} issue(s)", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "\n  {}: {}", issue.path, issue.reason)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug)]
pub enum ParseError {
    /// The payload is not syntactically valid JSON.
    Syntax(serde_json::Error),
    /// The `version` tag is missing or not a supported schema tag. Fatal:
    /// the caller must route the document to a migration step or reject it.
    UnsupportedVersion { found: Option<String> },
    /// One or more fields violate documented constraints. All-or-nothing:
    /// no document is produced, and every violation is reported at once.
    Invalid(ValidationError),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Syntax(err) => write!(f, "JSON parse error: {err}"),
            ParseError::UnsupportedVersion { found: Some(tag) } => {
                write!(f, "unsupported document version: {tag}")
            }
            ParseError::UnsupportedVersion { found: None } => {
                write!(f, "document is missing a version tag")
            }
            ParseError::Invalid(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for ParseError {}

/// Collector threaded through the parse pass. Issues accumulate instead of
/// aborting so a caller sees the complete diagnostic in one load attempt.
#[derive(Debug, Default)]
pub(crate) struct Issues {
    list: Vec<ValidationIssue>,
}

impl Issues {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, path: impl Into<String>, reason: impl Into<String>) {
        self.list.push(ValidationIssue {
            path: path.into(),
            reason: reason.into(),
        });
    }

    pub(crate) fn into_result(self) -> Result<(), ValidationError> {
        if self.list.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues: self.list })
        }
    }
}
