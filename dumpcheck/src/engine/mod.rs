//! Verification engine
//!
//! A [`Verifier`] owns one dump and a cursor into it. Checks are issued in
//! the order their lines are expected to appear:
//!
//! ```text
//! Active(0) --match at k--> Active(k+1) --...--> Active(n)
//!     |                         |
//!     +------ no match ---------+----> Exhausted (every later check aborts)
//! ```
//!
//! Scan-forward checks tolerate unrelated lines in between; next-line checks
//! pin exact adjacency.

use std::path::PathBuf;

use serde::Serialize;

use crate::check::{Anchor, Check, Match, NextLineMode};
use crate::document::DumpDocument;
use crate::error::{FailureKind, Result, VerifyError};
use crate::naming::Resolver;
use crate::report;
use crate::unit::CompilationUnitId;

/// Position of the verification cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Index of the next line to consider, at most the line count
    Active(usize),
    /// A check failed; the session is over
    Exhausted,
}

/// Matching options for one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifyOptions {
    /// How literal next-line checks compare
    pub next_line: NextLineMode,
}

/// A passed check, as recorded in the session summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub directive: &'static str,
    pub expected: String,
    #[serde(flatten)]
    pub matched: Match,
}

/// Serializable outcome of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub dump: String,
    pub lines: usize,
    pub passed: bool,
    pub checks_run: usize,
    pub steps: Vec<Step>,
    pub failure: Option<String>,
}

/// Ordered line checks against one dump
#[derive(Debug)]
pub struct Verifier {
    document: DumpDocument,
    state: CursorState,
    options: VerifyOptions,
    steps: Vec<Step>,
    checks_run: usize,
    /// Message of the failure that exhausted the session
    failure: Option<String>,
}

impl Verifier {
    /// Start a session over an already loaded document
    pub fn new(document: DumpDocument) -> Self {
        Self {
            document,
            state: CursorState::Active(0),
            options: VerifyOptions::default(),
            steps: Vec::new(),
            checks_run: 0,
            failure: None,
        }
    }

    pub fn with_options(mut self, options: VerifyOptions) -> Self {
        self.options = options;
        self
    }

    /// Load the unoptimized dump of `unit` from `dump_dir`
    pub fn open(dump_dir: impl Into<PathBuf>, unit: &CompilationUnitId) -> Result<Self> {
        Self::open_with(&Resolver::new(dump_dir), unit)
    }

    /// Load the dump of `unit` chosen by `resolver`
    pub fn open_with(resolver: &Resolver, unit: &CompilationUnitId) -> Result<Self> {
        let path = resolver.locate(unit);
        Ok(Self::new(DumpDocument::load(path)?))
    }

    pub fn document(&self) -> &DumpDocument {
        &self.document
    }

    pub fn options(&self) -> VerifyOptions {
        self.options
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Current cursor, `None` once exhausted
    pub fn cursor(&self) -> Option<usize> {
        match self.state {
            CursorState::Active(cursor) => Some(cursor),
            CursorState::Exhausted => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == CursorState::Exhausted
    }

    /// Checks that have passed so far, in order
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Unconsumed lines; empty once exhausted
    pub fn remaining(&self) -> &[String] {
        match self.state {
            CursorState::Active(cursor) => self.document.tail(cursor),
            CursorState::Exhausted => &[],
        }
    }

    /// Scan forward for a line containing `text`
    pub fn check(&mut self, text: &str) -> Result<Match> {
        self.run(&Check::scan(text))
    }

    /// Scan forward for a line matching `pattern` anywhere
    pub fn check_pattern(&mut self, pattern: &str) -> Result<Match> {
        self.ensure_active()?;
        let check = Check::scan_pattern(pattern)?;
        self.run(&check)
    }

    /// The line at the cursor must be `text`
    pub fn check_next(&mut self, text: &str) -> Result<Match> {
        self.run(&Check::next_line(text))
    }

    /// The line at the cursor must match `pattern`
    pub fn check_next_pattern(&mut self, pattern: &str) -> Result<Match> {
        self.ensure_active()?;
        let check = Check::next_line_pattern(pattern)?;
        self.run(&check)
    }

    /// Execute one compiled check and advance past its match
    pub fn run(&mut self, check: &Check) -> Result<Match> {
        let cursor = self.ensure_active()?;
        self.checks_run += 1;
        let mode = self.options.next_line;

        let outcome = match check.anchor() {
            Anchor::Scan => self
                .document
                .lines()
                .iter()
                .enumerate()
                .skip(cursor)
                .find_map(|(index, line)| {
                    tracing::trace!(index, line = %line, "scanning");
                    check.match_line(index, line, mode)
                })
                .ok_or(FailureKind::NotFound),
            Anchor::Next => match self.document.line(cursor) {
                Some(line) => check
                    .match_line(cursor, line, mode)
                    .ok_or(FailureKind::UnexpectedLine),
                None => Err(FailureKind::EndOfDocument),
            },
        };

        match outcome {
            Ok(matched) => {
                self.state = CursorState::Active(matched.line + 1);
                tracing::debug!(check = %check, line = matched.line + 1, "check passed");
                self.steps.push(Step {
                    directive: check.directive(),
                    expected: check.text().to_string(),
                    matched: matched.clone(),
                });
                Ok(matched)
            }
            Err(kind) => Err(self.fail(kind, check, cursor)),
        }
    }

    /// Execute checks in order, stopping at the first failure
    pub fn run_all(&mut self, checks: &[Check]) -> Result<Vec<Match>> {
        checks.iter().map(|check| self.run(check)).collect()
    }

    pub fn summary(&self) -> Summary {
        Summary {
            dump: self.document.name(),
            lines: self.document.len(),
            passed: self.failure.is_none(),
            checks_run: self.checks_run,
            steps: self.steps.clone(),
            failure: self.failure.clone(),
        }
    }

    fn ensure_active(&self) -> Result<usize> {
        match self.state {
            CursorState::Active(cursor) => Ok(cursor),
            CursorState::Exhausted => {
                let first = self.failure.as_deref().unwrap_or_default();
                Err(VerifyError::sequence_aborted(first.lines().next().unwrap_or_default()))
            }
        }
    }

    fn fail(&mut self, kind: FailureKind, check: &Check, cursor: usize) -> VerifyError {
        let report = report::describe(kind, check, cursor, &self.document, self.options.next_line);
        let expected = check.text().to_string();
        let error = match kind {
            FailureKind::UnexpectedLine => VerifyError::UnexpectedLine {
                expected,
                line: cursor,
                actual: self.document.line(cursor).unwrap_or_default().to_string(),
                report,
            },
            FailureKind::EndOfDocument => VerifyError::EndOfDocument {
                expected,
                cursor,
                report,
            },
            _ => VerifyError::NotFound {
                expected,
                cursor,
                report,
            },
        };

        tracing::warn!(check = %check, cursor, kind = %kind, "check failed");
        self.state = CursorState::Exhausted;
        self.failure = Some(error.to_string());
        error
    }
}
