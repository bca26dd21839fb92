//! Check plans
//!
//! A plan is a TOML file naming one compilation unit and the ordered checks
//! to run against its dump:
//!
//! ```toml
//! [unit]
//! owner = "compiler.jeandle.intrinsic.TestTanDouble$TestWrapper"
//! method = "tan_double"
//! params = ["D"]
//! returns = "D"
//!
//! [[check]]
//! check = "define hotspotcc double"
//! [[check]]
//! check-next = "entry:"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::check::{Check, NextLineMode};
use crate::engine::VerifyOptions;
use crate::error::VerifyError;
use crate::naming::{DumpPolicy, Resolver};
use crate::unit::{CompilationUnitId, is_field_descriptor, is_return_descriptor};

/// Plan loading error
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("cannot read plan {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid plan: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid plan: {message}")]
    Invalid { message: String },

    #[error(transparent)]
    Check(#[from] VerifyError),
}

impl PlanError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

/// A parsed check plan
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckPlan {
    pub unit: UnitSpec,
    #[serde(default)]
    pub options: PlanOptions,
    #[serde(default, rename = "check")]
    pub checks: Vec<CheckStep>,
}

/// The compilation unit whose dump is checked
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitSpec {
    /// Binary name of the owning type
    pub owner: String,
    pub method: String,
    /// Parameter descriptors
    #[serde(default)]
    pub params: Vec<String>,
    /// Return descriptor, `V` when absent
    pub returns: Option<String>,
    /// Check the optimized dump instead of the unoptimized one
    #[serde(default)]
    pub optimized: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PlanOptions {
    #[serde(default)]
    pub next_line: NextLineMode,
    /// Dump selection policy, see [`DumpPolicy`]
    pub policy: Option<String>,
}

/// One check, keyed by its directive
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckStep {
    Check(String),
    CheckPattern(String),
    CheckNext(String),
    CheckNextPattern(String),
}

impl CheckStep {
    pub fn compile(&self) -> Result<Check, VerifyError> {
        match self {
            Self::Check(text) => Ok(Check::scan(text.as_str())),
            Self::CheckPattern(pattern) => Check::scan_pattern(pattern),
            Self::CheckNext(text) => Ok(Check::next_line(text.as_str())),
            Self::CheckNextPattern(pattern) => Check::next_line_pattern(pattern),
        }
    }
}

impl CheckPlan {
    /// Parse and validate plan text
    pub fn parse(text: &str) -> Result<Self, PlanError> {
        let plan: Self = toml::from_str(text)?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PlanError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| PlanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let plan = Self::parse(&text)?;
        tracing::debug!(path = %path.display(), checks = plan.checks.len(), "loaded plan");
        Ok(plan)
    }

    fn validate(&self) -> Result<(), PlanError> {
        if self.unit.owner.trim().is_empty() {
            return Err(PlanError::invalid("unit.owner is empty"));
        }
        if self.unit.method.trim().is_empty() {
            return Err(PlanError::invalid("unit.method is empty"));
        }
        for (i, param) in self.unit.params.iter().enumerate() {
            if !is_field_descriptor(param) {
                return Err(PlanError::invalid(format!(
                    "unit.params[{i}] `{param}` is not a field descriptor"
                )));
            }
        }
        if let Some(returns) = &self.unit.returns {
            if !is_return_descriptor(returns) {
                return Err(PlanError::invalid(format!(
                    "unit.returns `{returns}` is not a return descriptor"
                )));
            }
        }
        self.policy()?;
        Ok(())
    }

    pub fn unit(&self) -> CompilationUnitId {
        let unit = self
            .unit
            .params
            .iter()
            .fold(CompilationUnitId::new(&self.unit.owner, &self.unit.method), |unit, param| {
                unit.param_descriptor(param.as_str())
            });
        match &self.unit.returns {
            Some(returns) => unit.returns_descriptor(returns.as_str()),
            None => unit,
        }
    }

    pub fn policy(&self) -> Result<DumpPolicy, PlanError> {
        match &self.options.policy {
            Some(text) => text.parse().map_err(PlanError::invalid),
            None => Ok(DumpPolicy::default()),
        }
    }

    /// Resolver for this plan's dump under `dir`
    pub fn resolver(&self, dir: impl Into<PathBuf>) -> Result<Resolver, PlanError> {
        Ok(Resolver::new(dir)
            .optimized(self.unit.optimized)
            .with_policy(self.policy()?))
    }

    pub fn verify_options(&self) -> VerifyOptions {
        VerifyOptions {
            next_line: self.options.next_line,
        }
    }

    /// Compile every check up front so a bad pattern fails before any dump is read
    pub fn compile_checks(&self) -> Result<Vec<Check>, PlanError> {
        self.checks
            .iter()
            .map(|step| step.compile().map_err(PlanError::from))
            .collect()
    }
}
