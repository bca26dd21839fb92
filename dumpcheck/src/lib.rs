//! dumpcheck
//!
//! Ordered line checks against the per-method IR dumps written by a JIT.
//! A [`Verifier`] resolves and loads one dump, then verifies expectations in
//! the order their lines must appear.
//!
//! ```no_run
//! use dumpcheck::{CompilationUnitId, Verifier};
//!
//! let unit = CompilationUnitId::new("compiler.jeandle.intrinsic.TestTanDouble$TestWrapper", "tan_double")
//!     .param("double")
//!     .returns("double");
//! let mut checker = Verifier::open("/tmp", &unit)?;
//! checker.check("define hotspotcc double")?;
//! checker.check_next("entry:")?;
//! checker.check_next_pattern(r"call double inttoptr \(i64 (\d+) to ptr\)")?;
//! # Ok::<(), dumpcheck::VerifyError>(())
//! ```

pub mod check;
pub mod document;
pub mod engine;
pub mod error;
pub mod naming;
pub mod plan;
pub mod report;
pub mod unit;
pub mod util;

pub use check::{Anchor, Check, CheckKind, Match, NextLineMode};
pub use document::DumpDocument;
pub use engine::{CursorState, Summary, Verifier, VerifyOptions};
pub use error::{FailureKind, Result, VerifyError};
pub use naming::{DumpPolicy, FlatNaming, NamingScheme, Resolver, SignatureNaming};
pub use plan::{CheckPlan, PlanError};
pub use unit::CompilationUnitId;
