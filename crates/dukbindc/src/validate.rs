//! Whole-unit validation pass. Generation is fail-closed: every table entry
//! and contract is checked up front, and a unit with any finding emits
//! nothing. Findings are collected in table order so the first one reported
//! is deterministic.

use crate::generate::{GenError, GenErrorKind};
use crate::table::BindingUnit;
use crate::types::TypeCategory;

pub fn validate_unit(unit: &BindingUnit) -> Vec<GenError> {
    let mut findings = Vec::new();
    validate_types(unit, &mut findings);
    validate_functions(unit, &mut findings);
    findings
}

fn validate_types(unit: &BindingUnit, findings: &mut Vec<GenError>) {
    for (type_name, category) in unit.types.iter() {
        match category {
            TypeCategory::FixedString => {
                // Helper names and storage declarations hardcode char, so the
                // category is only meaningful under this one type name.
                if type_name != "char[]" {
                    findings.push(GenError::new(
                        GenErrorKind::UnsupportedCapability,
                        format!("type {type_name}: fixed strings must be declared as char[]"),
                    ));
                }
            }
            TypeCategory::Array { elem } => match unit.types.get(elem) {
                None => findings.push(GenError::new(
                    GenErrorKind::UnknownType,
                    format!("type {type_name}: unknown element type {elem}"),
                )),
                Some(elem_cat) => {
                    // Elements are stored by value in the arena block, so the
                    // element type needs a plain C value representation.
                    let representable = matches!(
                        elem_cat,
                        TypeCategory::Atomic { .. }
                            | TypeCategory::Builtin { .. }
                            | TypeCategory::Opaque
                            | TypeCategory::StringPtr
                            | TypeCategory::Struct { .. }
                    );
                    if !representable {
                        findings.push(GenError::new(
                            GenErrorKind::UnsupportedCapability,
                            format!("type {type_name}: element type {elem} cannot be an array element"),
                        ));
                    }
                }
            },
            TypeCategory::Struct { fields } => {
                for field in fields {
                    if field.name.is_empty() {
                        findings.push(GenError::new(
                            GenErrorKind::MalformedContract,
                            format!("type {type_name}: field with empty name"),
                        ));
                        continue;
                    }
                    let Some(field_cat) = unit.types.get(&field.type_name) else {
                        findings.push(GenError::new(
                            GenErrorKind::UnknownType,
                            format!(
                                "type {type_name}: field {}: unknown type {}",
                                field.name, field.type_name
                            ),
                        ));
                        continue;
                    };
                    if !field_cat.supports_push() {
                        findings.push(GenError::new(
                            GenErrorKind::UnsupportedCapability,
                            format!(
                                "type {type_name}: field {}: type {} cannot be a struct field",
                                field.name, field.type_name
                            ),
                        ));
                    }
                    if matches!(field_cat, TypeCategory::FixedString) && field.length.is_none() {
                        findings.push(GenError::new(
                            GenErrorKind::MalformedContract,
                            format!(
                                "type {type_name}: field {}: char[] field needs a length",
                                field.name
                            ),
                        ));
                    }
                }
            }
            _ => {}
        }
    }
}

fn validate_functions(unit: &BindingUnit, findings: &mut Vec<GenError>) {
    for (fn_name, contract) in unit.functions.iter() {
        if unit.policies.get(&contract.throws).is_none() {
            let known: Vec<&str> = unit.policies.names().collect();
            findings.push(GenError::new(
                GenErrorKind::UnknownPolicy,
                format!(
                    "{fn_name}: unknown error policy {} (expected one of: {})",
                    contract.throws,
                    known.join(", ")
                ),
            ));
        }

        for arg in &contract.args {
            if arg.name.is_empty() {
                findings.push(GenError::new(
                    GenErrorKind::MalformedContract,
                    format!("{fn_name}: argument with empty name"),
                ));
                continue;
            }
            let Some(category) = unit.types.get(&arg.type_name) else {
                findings.push(GenError::new(
                    GenErrorKind::UnknownType,
                    format!(
                        "{fn_name}: argument {}: unknown type {}",
                        arg.name, arg.type_name
                    ),
                ));
                continue;
            };
            if arg.direction.is_out() && !category.supports_push() {
                findings.push(GenError::new(
                    GenErrorKind::UnsupportedCapability,
                    format!(
                        "{fn_name}: argument {}: type {} cannot be an output",
                        arg.name, arg.type_name
                    ),
                ));
            }
            if arg.by_ref && !category.supports_pointer() {
                findings.push(GenError::new(
                    GenErrorKind::UnsupportedCapability,
                    format!(
                        "{fn_name}: argument {}: type {} cannot be passed by reference",
                        arg.name, arg.type_name
                    ),
                ));
            }
            if matches!(category, TypeCategory::FixedString) && arg.size.is_none() {
                findings.push(GenError::new(
                    GenErrorKind::MalformedContract,
                    format!(
                        "{fn_name}: argument {}: char[] argument needs a size",
                        arg.name
                    ),
                ));
            }
            // An output-only array is never popped, so its block must be
            // sized from the contract for the arena to provision it.
            if matches!(category, TypeCategory::Array { .. })
                && !arg.direction.is_in()
                && arg.size.is_none()
            {
                findings.push(GenError::new(
                    GenErrorKind::MalformedContract,
                    format!(
                        "{fn_name}: argument {}: output-only array needs a size",
                        arg.name
                    ),
                ));
            }
        }

        match &contract.returns {
            None => {
                if let Some(policy) = unit.policies.get(&contract.throws) {
                    // With no return value there is nothing to guard on.
                    if !policy.is_nothing() {
                        findings.push(GenError::new(
                            GenErrorKind::MalformedContract,
                            format!(
                                "{fn_name}: void function cannot throw {}",
                                contract.throws
                            ),
                        ));
                    }
                }
            }
            Some(ret) => {
                if ret.name.is_empty() {
                    findings.push(GenError::new(
                        GenErrorKind::MalformedContract,
                        format!("{fn_name}: return value with empty name"),
                    ));
                    continue;
                }
                let Some(category) = unit.types.get(&ret.type_name) else {
                    findings.push(GenError::new(
                        GenErrorKind::UnknownType,
                        format!("{fn_name}: return: unknown type {}", ret.type_name),
                    ));
                    continue;
                };
                if !category.supports_return() {
                    findings.push(GenError::new(
                        GenErrorKind::UnsupportedCapability,
                        format!(
                            "{fn_name}: return: type {} cannot be returned",
                            ret.type_name
                        ),
                    ));
                }
                if ret.by_ref && !category.supports_pointer() {
                    findings.push(GenError::new(
                        GenErrorKind::UnsupportedCapability,
                        format!(
                            "{fn_name}: return: type {} cannot be returned by reference",
                            ret.type_name
                        ),
                    ));
                }
            }
        }
    }
}
