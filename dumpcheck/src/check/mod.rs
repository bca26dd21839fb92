//! Check compilation and line matching
//!
//! A check is the closed product of two choices: where it may match
//! (`Anchor`) and what it matches with (`Matcher`). Cursor bookkeeping lives
//! in the engine; this module only answers "does this line satisfy it".

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VerifyError};

/// Where a check is allowed to match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// First matching line at or after the cursor
    Scan,
    /// Exactly the line at the cursor
    Next,
}

/// How the check text is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    Literal,
    Pattern,
}

/// How a literal next-line check compares against the line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NextLineMode {
    /// The whole line must equal the literal
    #[default]
    Exact,
    /// The line must contain the literal
    Substring,
}

/// Compiled matcher
#[derive(Debug, Clone)]
pub enum Matcher {
    Literal(String),
    Pattern(Regex),
}

/// One compiled expectation
#[derive(Debug, Clone)]
pub struct Check {
    anchor: Anchor,
    matcher: Matcher,
}

/// A satisfied check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    /// Index of the matched line
    pub line: usize,
    /// Matched text: the literal, or the pattern's whole match
    pub text: String,
    /// Capture groups of a pattern match, in order (`None` for groups that did not take part)
    pub groups: Vec<Option<String>>,
}

impl Check {
    /// Compile a check.
    ///
    /// Pattern text is compiled immediately so malformed expectations fail
    /// here with `InvalidPattern`, not at match time.
    pub fn compile(anchor: Anchor, kind: CheckKind, text: &str) -> Result<Self> {
        let matcher = match kind {
            CheckKind::Literal => Matcher::Literal(text.to_string()),
            CheckKind::Pattern => Matcher::Pattern(
                Regex::new(text).map_err(|e| VerifyError::invalid_pattern(text, e))?,
            ),
        };
        Ok(Self { anchor, matcher })
    }

    /// Scan-forward literal check
    pub fn scan(text: impl Into<String>) -> Self {
        Self {
            anchor: Anchor::Scan,
            matcher: Matcher::Literal(text.into()),
        }
    }

    /// Scan-forward pattern check
    pub fn scan_pattern(pattern: &str) -> Result<Self> {
        Self::compile(Anchor::Scan, CheckKind::Pattern, pattern)
    }

    /// Next-line literal check
    pub fn next_line(text: impl Into<String>) -> Self {
        Self {
            anchor: Anchor::Next,
            matcher: Matcher::Literal(text.into()),
        }
    }

    /// Next-line pattern check
    pub fn next_line_pattern(pattern: &str) -> Result<Self> {
        Self::compile(Anchor::Next, CheckKind::Pattern, pattern)
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn kind(&self) -> CheckKind {
        match self.matcher {
            Matcher::Literal(_) => CheckKind::Literal,
            Matcher::Pattern(_) => CheckKind::Pattern,
        }
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// The literal text or pattern source
    pub fn text(&self) -> &str {
        match &self.matcher {
            Matcher::Literal(text) => text,
            Matcher::Pattern(re) => re.as_str(),
        }
    }

    /// Directive name as written in check plans
    pub fn directive(&self) -> &'static str {
        match (self.anchor, self.kind()) {
            (Anchor::Scan, CheckKind::Literal) => "check",
            (Anchor::Scan, CheckKind::Pattern) => "check-pattern",
            (Anchor::Next, CheckKind::Literal) => "check-next",
            (Anchor::Next, CheckKind::Pattern) => "check-next-pattern",
        }
    }

    /// Short description of the expectation, e.g. ``literal `entry:` ``
    pub fn describe(&self) -> String {
        match self.kind() {
            CheckKind::Literal => format!("literal `{}`", self.text()),
            CheckKind::Pattern => format!("pattern `{}`", self.text()),
        }
    }

    /// Test one line.
    ///
    /// Scan checks and pattern checks match anywhere within the line. A
    /// literal next-line check compares according to `mode`.
    pub fn match_line(&self, index: usize, line: &str, mode: NextLineMode) -> Option<Match> {
        match &self.matcher {
            Matcher::Literal(text) => {
                let hit = match (self.anchor, mode) {
                    (Anchor::Next, NextLineMode::Exact) => line == text,
                    _ => line.contains(text.as_str()),
                };
                hit.then(|| Match {
                    line: index,
                    text: text.clone(),
                    groups: Vec::new(),
                })
            }
            Matcher::Pattern(re) => re.captures(line).map(|caps| Match {
                line: index,
                text: caps[0].to_string(),
                groups: caps
                    .iter()
                    .skip(1)
                    .map(|group| group.map(|m| m.as_str().to_string()))
                    .collect(),
            }),
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.directive(), self.text())
    }
}
