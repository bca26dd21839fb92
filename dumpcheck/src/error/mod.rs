//! Error types and reporting

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::document::DumpDocument;

/// Result type alias
pub type Result<T> = std::result::Result<T, VerifyError>;

/// Kind of a verification failure, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    DumpNotFound,
    InvalidPattern,
    NotFound,
    UnexpectedLine,
    EndOfDocument,
    SequenceAborted,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DumpNotFound => "dump not found",
            Self::InvalidPattern => "invalid pattern",
            Self::NotFound => "not found",
            Self::UnexpectedLine => "unexpected line",
            Self::EndOfDocument => "end of document",
            Self::SequenceAborted => "sequence aborted",
        };
        f.write_str(name)
    }
}

/// Verification error
///
/// Every variant is terminal for the session that raised it. Match failures
/// carry a fully rendered report so the message is actionable on its own.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("dump not found: {}: {reason}", path.display())]
    DumpNotFound { path: PathBuf, reason: String },

    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A scan-forward check reached the end of the dump
    #[error("{report}")]
    NotFound {
        expected: String,
        cursor: usize,
        report: String,
    },

    /// A next-line check saw a different line
    #[error("{report}")]
    UnexpectedLine {
        expected: String,
        line: usize,
        actual: String,
        report: String,
    },

    /// A next-line check was issued with the cursor past the last line
    #[error("{report}")]
    EndOfDocument {
        expected: String,
        cursor: usize,
        report: String,
    },

    #[error("check sequence aborted by an earlier failure: {first_failure}")]
    SequenceAborted { first_failure: String },
}

impl VerifyError {
    pub fn dump_not_found(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::DumpNotFound {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }

    pub fn sequence_aborted(first_failure: impl Into<String>) -> Self {
        Self::SequenceAborted {
            first_failure: first_failure.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::DumpNotFound { .. } => FailureKind::DumpNotFound,
            Self::InvalidPattern { .. } => FailureKind::InvalidPattern,
            Self::NotFound { .. } => FailureKind::NotFound,
            Self::UnexpectedLine { .. } => FailureKind::UnexpectedLine,
            Self::EndOfDocument { .. } => FailureKind::EndOfDocument,
            Self::SequenceAborted { .. } => FailureKind::SequenceAborted,
        }
    }

    /// The literal or pattern text of the unmet expectation
    pub fn expected(&self) -> Option<&str> {
        match self {
            Self::NotFound { expected, .. }
            | Self::UnexpectedLine { expected, .. }
            | Self::EndOfDocument { expected, .. } => Some(expected),
            Self::InvalidPattern { pattern, .. } => Some(pattern),
            Self::DumpNotFound { .. } | Self::SequenceAborted { .. } => None,
        }
    }

    /// Line index the failure points at, for next-line mismatches
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::UnexpectedLine { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Cursor position when a match failure happened
    pub fn cursor(&self) -> Option<usize> {
        match self {
            Self::NotFound { cursor, .. } | Self::EndOfDocument { cursor, .. } => Some(*cursor),
            Self::UnexpectedLine { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// First line of the message, used when a later check is aborted
    pub fn headline(&self) -> String {
        let message = self.to_string();
        message.lines().next().unwrap_or_default().to_string()
    }
}

/// Report a failure against its dump with ariadne
pub fn report_error(document: &DumpDocument, error: &VerifyError) -> std::io::Result<()> {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let filename = document.name();
    let filename = filename.as_str();
    let source = document.text();
    let kind = error.kind();

    let focus = match error {
        VerifyError::UnexpectedLine { line, .. } => document
            .char_range(*line..*line + 1)
            .map(|span| (span, "this line does not match".to_string())),
        VerifyError::NotFound { cursor, .. } => document
            .char_range(*cursor..document.len())
            .map(|span| (span, "no line in this range matches".to_string())),
        _ => None,
    };

    let note = match error {
        VerifyError::UnexpectedLine { expected, actual, .. } => {
            Some(format!("expected: {expected}\n  actual: {actual}"))
        }
        VerifyError::NotFound { expected, .. } => Some(format!("expected: {expected}")),
        _ => None,
    };

    let span = focus.as_ref().map_or(0..0, |(span, _)| span.clone());
    let mut builder = Report::build(ReportKind::Error, (filename, span))
        .with_message(format!("{kind}: {}", error.headline()));
    // Failures without a region of the dump have no label
    if let Some((span, label)) = focus {
        builder = builder.with_label(
            Label::new((filename, span))
                .with_message(label)
                .with_color(Color::Red),
        );
    }
    if let Some(note) = note {
        builder = builder.with_note(note);
    }
    builder.finish().eprint((filename, Source::from(source)))
}
