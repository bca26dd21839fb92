//! Failure descriptions
//!
//! Turns an unmet check into a message that can be acted on without
//! re-running the compiler: the expectation, where the cursor was, and the
//! part of the dump that was still unconsumed.

use crate::check::{Check, Matcher, NextLineMode};
use crate::document::DumpDocument;
use crate::error::FailureKind;
use crate::util::{find_closest_line, format_closest_hint, near_miss_threshold};

/// Describe a failed check.
///
/// Never panics; an empty document or a cursor past the end still yields a
/// complete message. Line numbers in the message are 1-based. `mode` must be
/// the one the check ran with.
pub fn describe(
    kind: FailureKind,
    check: &Check,
    cursor: usize,
    document: &DumpDocument,
    mode: NextLineMode,
) -> String {
    let name = document.name();
    match kind {
        FailureKind::NotFound => describe_not_found(check, cursor, document, &name),
        FailureKind::UnexpectedLine => {
            let actual = document.line(cursor).unwrap_or_default();
            let mut out = format!(
                "{}: line {} of {} does not match {}\n  expected: {}\n  actual:   {}",
                check.directive(),
                cursor + 1,
                name,
                check.describe(),
                check.text(),
                actual
            );
            if let Some(later) = later_occurrence(check, cursor + 1, document, mode) {
                out.push_str(&format!("\n  note: a matching line appears later, at line {}", later + 1));
            }
            out
        }
        FailureKind::EndOfDocument => format!(
            "{}: expected {} on line {} but {} has only {} lines",
            check.directive(),
            check.describe(),
            cursor + 1,
            name,
            document.len()
        ),
        other => format!("{}: {} while checking {}", check.directive(), other, check.describe()),
    }
}

fn describe_not_found(check: &Check, cursor: usize, document: &DumpDocument, name: &str) -> String {
    let remaining = document.tail(cursor);
    let mut out = format!("{}: no line matches {}", check.directive(), check.describe());

    if remaining.is_empty() {
        out.push_str(&format!(
            "\n  nothing left to search in {} ({} lines consumed)\nremaining input: <empty>",
            name,
            document.len()
        ));
        return out;
    }

    out.push_str(&format!(
        "\n  searched lines {}-{} of {}\nremaining input:",
        cursor + 1,
        document.len(),
        name
    ));
    out.push_str(&render_lines(document, cursor));

    if let Matcher::Literal(text) = check.matcher() {
        let closest = find_closest_line(text, remaining, near_miss_threshold(text));
        out.push_str(&format_closest_hint(closest.map(|(offset, line)| (cursor + offset, line))));
    }
    out
}

/// Lines from `start` to the end, with a gutter wide enough for the last line number
pub fn render_lines(document: &DumpDocument, start: usize) -> String {
    let width = document.len().to_string().len();
    let mut out = String::new();
    for (offset, line) in document.tail(start).iter().enumerate() {
        out.push_str(&format!("\n{:>width$} | {}", start + offset + 1, line));
    }
    out
}

/// First line at or after `start` that `check` would accept under `mode`
fn later_occurrence(check: &Check, start: usize, document: &DumpDocument, mode: NextLineMode) -> Option<usize> {
    document
        .lines()
        .iter()
        .enumerate()
        .skip(start)
        .find_map(|(index, line)| check.match_line(index, line, mode))
        .map(|matched| matched.line)
}
