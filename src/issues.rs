//! Issue types reported by a run.
//!
//! Every issue is file-scoped: the file it names was left untouched on disk
//! (or, for factory warnings, its constant stayed a plain constant), and the
//! run carried on with the rest of the project.

use enum_dispatch::enum_dispatch;

use crate::core::{error::FileError, factory::UnsafeReason};

// ============================================================
// Severity and Rule
// ============================================================

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Rule identifier for each issue type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rule {
    ParseError,
    InvalidOutput,
    UnsafeFactory,
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::ParseError => write!(f, "parse-error"),
            Rule::InvalidOutput => write!(f, "invalid-output"),
            Rule::UnsafeFactory => write!(f, "unsafe-factory"),
        }
    }
}

// ============================================================
// Issue Types
// ============================================================

/// File could not be read or parsed; it takes no part in the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrorIssue {
    pub file_path: String,
    pub error: String,
}

impl ParseErrorIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::ParseError
    }
}

/// Rewriting a file produced edits that overlap or output that does not
/// parse. The original is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidOutputIssue {
    pub file_path: String,
    pub error: String,
}

impl InvalidOutputIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::InvalidOutput
    }
}

/// An exported constant that was not turned into a factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsafeFactoryIssue {
    pub file_path: String,
    pub name: String,
    pub reason: UnsafeReason,
}

impl UnsafeFactoryIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::UnsafeFactory
    }
}

// ============================================================
// Issue Enum
// ============================================================

#[enum_dispatch(Report)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    ParseError(ParseErrorIssue),
    InvalidOutput(InvalidOutputIssue),
    UnsafeFactory(UnsafeFactoryIssue),
}

impl Issue {
    pub fn severity(&self) -> Severity {
        match self {
            Issue::ParseError(_) => ParseErrorIssue::severity(),
            Issue::InvalidOutput(_) => InvalidOutputIssue::severity(),
            Issue::UnsafeFactory(_) => UnsafeFactoryIssue::severity(),
        }
    }

    pub fn rule(&self) -> Rule {
        match self {
            Issue::ParseError(_) => ParseErrorIssue::rule(),
            Issue::InvalidOutput(_) => InvalidOutputIssue::rule(),
            Issue::UnsafeFactory(_) => UnsafeFactoryIssue::rule(),
        }
    }
}

impl From<&FileError> for Issue {
    fn from(err: &FileError) -> Self {
        let file_path = err.path();
        let error = err.to_string();
        match err {
            FileError::InvalidOutputAfterTransform { .. } | FileError::EditConflict { .. } => {
                Issue::InvalidOutput(InvalidOutputIssue { file_path, error })
            }
            FileError::ParseFailure { message, .. } => Issue::ParseError(ParseErrorIssue {
                file_path,
                error: message.clone(),
            }),
            FileError::Read { .. } | FileError::Write { .. } => {
                Issue::ParseError(ParseErrorIssue { file_path, error })
            }
        }
    }
}

// ============================================================
// Report Trait (for CLI output)
// ============================================================

/// Trait for types that can be reported to CLI.
///
/// Uses `enum_dispatch` for zero-cost dispatch on the `Issue` enum.
#[enum_dispatch]
pub trait Report {
    /// File the issue is about, relative to the source root.
    fn file_path(&self) -> &str;

    /// Primary message to display.
    fn message(&self) -> String;

    fn report_severity(&self) -> Severity;

    fn report_rule(&self) -> Rule;

    /// Optional details for the "= note:" line.
    fn details(&self) -> Option<String> {
        None
    }
}

impl Report for ParseErrorIssue {
    fn file_path(&self) -> &str {
        &self.file_path
    }

    fn message(&self) -> String {
        self.error.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some("file skipped".to_string())
    }
}

impl Report for InvalidOutputIssue {
    fn file_path(&self) -> &str {
        &self.file_path
    }

    fn message(&self) -> String {
        self.error.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some("original file kept".to_string())
    }
}

impl Report for UnsafeFactoryIssue {
    fn file_path(&self) -> &str {
        &self.file_path
    }

    fn message(&self) -> String {
        self.name.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(format!("kept as a constant: {}", self.reason))
    }
}

// ============================================================
// Ordering for Issue (for sorting in reports)
// ============================================================

impl Ord for Issue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.file_path()
            .cmp(other.file_path())
            .then_with(|| self.rule().cmp(&other.rule()))
            .then_with(|| self.message().cmp(&other.message()))
    }
}

impl PartialOrd for Issue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
