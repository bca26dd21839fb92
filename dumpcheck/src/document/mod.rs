//! Dump documents
//!
//! A dump is read once, in full, into an indexed list of lines. Lines keep
//! their leading and trailing whitespace; exact-line checks depend on it.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::error::{Result, VerifyError};

/// Name used for documents that were not loaded from disk
const IN_MEMORY_NAME: &str = "<memory>";

/// The lines of one IR dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpDocument {
    /// File the lines were read from, `None` for in-memory documents
    path: Option<PathBuf>,
    lines: Vec<String>,
}

impl DumpDocument {
    /// Read a dump file.
    ///
    /// Fails with `DumpNotFound` when the path is missing, is not a regular
    /// file, or cannot be read. Invalid UTF-8 is replaced, not rejected.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata =
            fs::metadata(path).map_err(|e| VerifyError::dump_not_found(path, e.to_string()))?;
        if !metadata.is_file() {
            return Err(VerifyError::dump_not_found(path, "not a regular file"));
        }

        let bytes = fs::read(path).map_err(|e| VerifyError::dump_not_found(path, e.to_string()))?;
        let lines = split_lines(&String::from_utf8_lossy(&bytes));
        tracing::debug!(path = %path.display(), lines = lines.len(), "loaded dump");

        Ok(Self {
            path: Some(path.to_path_buf()),
            lines,
        })
    }

    /// Build a document from text held in memory
    pub fn from_text(text: &str) -> Self {
        Self {
            path: None,
            lines: split_lines(text),
        }
    }

    /// Build a document from already split lines
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: None,
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Display name: the file path, or `<memory>`
    pub fn name(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => IN_MEMORY_NAME.to_string(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines from `start` to the end; empty once `start` is past the last line
    pub fn tail(&self, start: usize) -> &[String] {
        self.lines.get(start..).unwrap_or(&[])
    }

    /// The document re-joined with `\n`
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Character range of `lines` within [`text`](Self::text).
    ///
    /// `None` for an empty or out-of-bounds line range.
    pub fn char_range(&self, lines: Range<usize>) -> Option<Range<usize>> {
        if lines.start >= lines.end || lines.end > self.lines.len() {
            return None;
        }
        let width = |line: &String| line.chars().count();
        let start: usize = self.lines[..lines.start].iter().map(|l| width(l) + 1).sum();
        let body: usize = self.lines[lines.clone()].iter().map(width).sum();
        let separators = lines.end - lines.start - 1;
        Some(start..start + body + separators)
    }
}

/// Split text on universal newlines (`\n`, `\r\n`, lone `\r`).
///
/// A final terminator does not start an extra empty line.
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\n' => lines.push(std::mem::take(&mut current)),
            '\r' => {
                chars.next_if_eq(&'\n');
                lines.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines
}
