//! Compilation unit identity
//!
//! A compilation unit is one method as compiled by the JIT: its owning
//! type, its name and its signature. The identity exists only to derive
//! the name of the method's IR dump.

mod descriptor;

pub use descriptor::{descriptor_for, is_field_descriptor, is_return_descriptor};

use std::fmt;

/// Identity of one compiled method
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompilationUnitId {
    /// Binary name of the owning type (`pkg.Outer$Inner`)
    owner: String,
    method: String,
    /// Parameter descriptors, in declaration order
    params: Vec<String>,
    /// Return descriptor, `V` unless set
    returns: String,
}

impl CompilationUnitId {
    /// Create an identity for a `void` method without parameters
    pub fn new(owner: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            method: method.into(),
            params: Vec::new(),
            returns: "V".to_string(),
        }
    }

    /// Append a parameter given by its source-level type name (`double`, `int[]`)
    pub fn param(mut self, source_name: &str) -> Self {
        self.params.push(descriptor_for(source_name));
        self
    }

    /// Append a parameter given as a raw descriptor (`D`, `[I`)
    pub fn param_descriptor(mut self, descriptor: impl Into<String>) -> Self {
        self.params.push(descriptor.into());
        self
    }

    /// Set the return type by its source-level name
    pub fn returns(mut self, source_name: &str) -> Self {
        self.returns = descriptor_for(source_name);
        self
    }

    /// Set the return type as a raw descriptor
    pub fn returns_descriptor(mut self, descriptor: impl Into<String>) -> Self {
        self.returns = descriptor.into();
        self
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn return_descriptor(&self) -> &str {
        &self.returns
    }

    /// Method descriptor, e.g. `(DLjava/lang/String;)I`
    pub fn descriptor(&self) -> String {
        format!("({}){}", self.params.concat(), self.returns)
    }

    /// Owner name without its package, e.g. `Outer$Inner`
    pub fn simple_owner(&self) -> &str {
        self.owner.rsplit('.').next().unwrap_or(&self.owner)
    }
}

impl fmt::Display for CompilationUnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}{}", self.owner, self.method, self.descriptor())
    }
}
