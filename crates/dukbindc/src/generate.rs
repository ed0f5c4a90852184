//! Top-level generation entry point: validate a binding unit, then emit its
//! C artifact and registration rows. Validation runs over the whole unit
//! before any emission, so a unit with any invalid entry produces no output.

use serde::Serialize;

use crate::c_emit;
use crate::table::BindingUnit;
use crate::validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenErrorKind {
    UnknownType,
    UnknownPolicy,
    UnsupportedCapability,
    MalformedContract,
    Internal,
}

#[derive(Debug, Clone)]
pub struct GenError {
    pub kind: GenErrorKind,
    pub message: String,
}

impl GenError {
    pub fn new(kind: GenErrorKind, message: String) -> Self {
        Self { kind, message }
    }
}

/// One row of the generated registration list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FnDecl {
    /// Property name the function is exposed under.
    pub name: String,
    /// C identifier of the generated stub.
    pub entry: String,
    /// Declared argument count, including slotless constants.
    pub argc: usize,
}

#[derive(Debug, Clone)]
pub struct GenOutput {
    pub c_src: String,
    pub fn_decls: Vec<FnDecl>,
}

pub fn generate_unit(unit: &BindingUnit) -> Result<GenOutput, GenError> {
    let findings = validate::validate_unit(unit);
    if let Some(first) = findings.into_iter().next() {
        return Err(first);
    }
    let c_src = c_emit::emit_unit(unit)?;
    let fn_decls = c_emit::fn_decls(unit);
    Ok(GenOutput { c_src, fn_decls })
}
