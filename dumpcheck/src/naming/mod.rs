//! Dump naming and resolution
//!
//! The JIT writes one dump per compiled method into a dump directory. The
//! file name is an implicit contract with the compiler, so the mangling is a
//! pluggable [`NamingScheme`]. When a directory holds several dumps for the
//! same method (repeated compilation, reused directories), a [`DumpPolicy`]
//! decides which one is checked.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::SystemTime;

use crate::unit::CompilationUnitId;

/// Maps a compilation unit to the file name of its dump
pub trait NamingScheme: fmt::Debug {
    /// File name without the extension
    fn file_stem(&self, unit: &CompilationUnitId) -> String;

    /// Suffix appended to the stem, e.g. `.ll`
    fn extension(&self) -> &str;

    fn file_name(&self, unit: &CompilationUnitId) -> String {
        format!("{}{}", self.file_stem(unit), self.extension())
    }
}

/// The JIT's own convention: `<owner>_<method>_<descriptor>.ll`.
///
/// Package separators in the owner become `_`, nested-type `$` is kept, and
/// `/` in the descriptor becomes `_`. Optimized dumps end in `-optimized.ll`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignatureNaming {
    pub optimized: bool,
}

impl SignatureNaming {
    pub fn new(optimized: bool) -> Self {
        Self { optimized }
    }
}

impl NamingScheme for SignatureNaming {
    fn file_stem(&self, unit: &CompilationUnitId) -> String {
        let owner = unit.owner().replace(['.', '/'], "_");
        let method = unit.method().replace('/', "_");
        let signature = unit.descriptor().replace('/', "_");
        format!("{owner}_{method}_{signature}")
    }

    fn extension(&self) -> &str {
        if self.optimized { "-optimized.ll" } else { ".ll" }
    }
}

/// Owner and method joined by one separator; no signature.
///
/// Every structural separator of the owner (`.`, `/`, `$`) becomes
/// `separator`. Overloads share a name under this scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatNaming {
    pub separator: char,
    pub extension: String,
}

impl FlatNaming {
    pub fn new(separator: char, extension: impl Into<String>) -> Self {
        Self {
            separator,
            extension: extension.into(),
        }
    }
}

impl Default for FlatNaming {
    fn default() -> Self {
        Self::new('_', ".ll")
    }
}

impl NamingScheme for FlatNaming {
    fn file_stem(&self, unit: &CompilationUnitId) -> String {
        let mut stem: String = unit
            .owner()
            .chars()
            .map(|c| if matches!(c, '.' | '/' | '$') { self.separator } else { c })
            .collect();
        stem.push(self.separator);
        stem.push_str(unit.method());
        stem
    }

    fn extension(&self) -> &str {
        &self.extension
    }
}

/// Which dump to check when several belong to one compilation unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DumpPolicy {
    /// The exact resolved name, no directory listing
    #[default]
    Canonical,
    /// Oldest candidate by modification time
    FirstWritten,
    /// Newest candidate by modification time
    MostRecent,
    /// `<stem>-<n><ext>`
    Ordinal(u32),
}

impl fmt::Display for DumpPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Canonical => f.write_str("canonical"),
            Self::FirstWritten => f.write_str("first-written"),
            Self::MostRecent => f.write_str("most-recent"),
            Self::Ordinal(n) => write!(f, "ordinal:{n}"),
        }
    }
}

impl FromStr for DumpPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "canonical" => Ok(Self::Canonical),
            "first-written" => Ok(Self::FirstWritten),
            "most-recent" => Ok(Self::MostRecent),
            _ => match s.strip_prefix("ordinal:") {
                Some(n) => n
                    .parse()
                    .map(Self::Ordinal)
                    .map_err(|_| format!("invalid ordinal in dump policy `{s}`")),
                None => Err(format!(
                    "unknown dump policy `{s}` (expected canonical, first-written, most-recent or ordinal:<n>)"
                )),
            },
        }
    }
}

/// A dump file that belongs to a compilation unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    /// Ordinal suffix, `None` for the canonical name
    pub ordinal: Option<u32>,
    pub modified: Option<SystemTime>,
}

/// Resolves compilation units to dump paths under one directory
#[derive(Debug)]
pub struct Resolver {
    dir: PathBuf,
    scheme: Box<dyn NamingScheme>,
    policy: DumpPolicy,
}

impl Resolver {
    /// Unoptimized dumps with the JIT's signature naming, canonical policy
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            scheme: Box::new(SignatureNaming::default()),
            policy: DumpPolicy::default(),
        }
    }

    pub fn with_scheme(mut self, scheme: impl NamingScheme + 'static) -> Self {
        self.scheme = Box::new(scheme);
        self
    }

    /// Use signature naming for the optimized or unoptimized dump
    pub fn optimized(self, optimized: bool) -> Self {
        self.with_scheme(SignatureNaming::new(optimized))
    }

    pub fn with_policy(mut self, policy: DumpPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn scheme(&self) -> &dyn NamingScheme {
        self.scheme.as_ref()
    }

    pub fn policy(&self) -> DumpPolicy {
        self.policy
    }

    /// Canonical dump path. No I/O; a bad identity only fails when loaded.
    pub fn resolve(&self, unit: &CompilationUnitId) -> PathBuf {
        self.dir.join(self.scheme.file_name(unit))
    }

    /// Every dump in the directory that belongs to `unit`.
    ///
    /// Sorted with the canonical name first, then by ordinal. An unreadable
    /// directory has no candidates.
    pub fn candidates(&self, unit: &CompilationUnitId) -> Vec<Candidate> {
        let stem = self.scheme.file_stem(unit);
        let extension = self.scheme.extension();
        let canonical = format!("{stem}{extension}");

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(dir = %self.dir.display(), error = %e, "cannot list dump directory");
                return Vec::new();
            }
        };

        let mut found: Vec<Candidate> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                let ordinal = if name == canonical {
                    None
                } else {
                    Some(parse_ordinal(&name, &stem, extension)?)
                };
                // Follow symlinks the same way the loader does
                let metadata = fs::metadata(entry.path()).ok().filter(|m| m.is_file())?;
                Some(Candidate {
                    path: entry.path(),
                    ordinal,
                    modified: metadata.modified().ok(),
                })
            })
            .collect();

        found.sort_by(|a, b| a.ordinal.cmp(&b.ordinal).then_with(|| a.path.cmp(&b.path)));
        found
    }

    /// Dump path chosen by the policy.
    ///
    /// Falls back to the canonical path when no candidate exists, so the
    /// loader reports the expected name as missing.
    pub fn locate(&self, unit: &CompilationUnitId) -> PathBuf {
        let path = match self.policy {
            DumpPolicy::Canonical => self.resolve(unit),
            DumpPolicy::Ordinal(n) => self.dir.join(format!(
                "{}-{n}{}",
                self.scheme.file_stem(unit),
                self.scheme.extension()
            )),
            DumpPolicy::FirstWritten => {
                by_modified(self.candidates(unit), false).unwrap_or_else(|| self.resolve(unit))
            }
            DumpPolicy::MostRecent => {
                by_modified(self.candidates(unit), true).unwrap_or_else(|| self.resolve(unit))
            }
        };
        tracing::debug!(unit = %unit, policy = %self.policy, path = %path.display(), "located dump");
        path
    }
}

/// Oldest or newest candidate by modification time.
///
/// Candidates without a readable time are never chosen.
fn by_modified(candidates: Vec<Candidate>, newest: bool) -> Option<PathBuf> {
    let timed = candidates
        .into_iter()
        .filter_map(|c| Some((c.modified?, c.path)));
    let chosen = if newest {
        timed.max_by_key(|(modified, _)| *modified)
    } else {
        timed.min_by_key(|(modified, _)| *modified)
    };
    chosen.map(|(_, path)| path)
}

/// Ordinal `n` of a name shaped `<stem>-<n><extension>`
fn parse_ordinal(name: &str, stem: &str, extension: &str) -> Option<u32> {
    let digits = name
        .strip_prefix(stem)?
        .strip_prefix('-')?
        .strip_suffix(extension)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
