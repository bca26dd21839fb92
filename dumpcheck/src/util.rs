//! Shared utility functions
//!
//! Edit-distance helpers used to point at a near miss when a check fails.

// ============================================================================
// Levenshtein Distance: Near-Miss Hints
// ============================================================================

/// Calculate Levenshtein edit distance between two strings.
/// Uses O(min(m,n)) space with two-row optimization.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr: Vec<usize> = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Largest distance still reported as a near miss for `expected`
pub fn near_miss_threshold(expected: &str) -> usize {
    (expected.chars().count() / 4).max(1)
}

/// Find the line closest to `expected`, ignoring surrounding whitespace.
///
/// Returns `(offset, line)` of the first best candidate within `threshold`.
/// Exact matches are skipped: they are not near misses.
pub fn find_closest_line<'a>(
    expected: &str,
    lines: &'a [String],
    threshold: usize,
) -> Option<(usize, &'a str)> {
    let expected = expected.trim();
    let mut best: Option<(usize, &str)> = None;
    let mut best_distance = usize::MAX;

    for (offset, line) in lines.iter().enumerate() {
        let distance = levenshtein_distance(expected, line.trim());
        if distance == 0 {
            continue;
        }
        if distance < best_distance && distance <= threshold {
            best_distance = distance;
            best = Some((offset, line.as_str()));
        }
    }

    best
}

/// Format a "closest line" hint, with a 1-based line number.
pub fn format_closest_hint(closest: Option<(usize, &str)>) -> String {
    match closest {
        Some((index, line)) => format!("\n  hint: closest line {}: `{}`", index + 1, line.trim()),
        None => String::new(),
    }
}
