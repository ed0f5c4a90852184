//! C artifact emission. Every producer returns complete lines (nested blocks
//! carry embedded tabs) and the unit emitter joins the non-empty blocks with
//! single blank lines, so the artifact text is a pure function of the tables.
//!
//! Callers are expected to run `validate::validate_unit` first; table lookups
//! that fail here surface as `Internal` errors rather than panics.

use crate::contract::{Argument, FunctionContract};
use crate::generate::{FnDecl, GenError, GenErrorKind};
use crate::names;
use crate::table::BindingUnit;
use crate::types::{PrimKind, TypeCategory};

fn tabify(count: usize, lines: Vec<String>) -> Vec<String> {
    let indent = "\t".repeat(count);
    lines
        .into_iter()
        .map(|line| {
            if line.is_empty() {
                line
            } else {
                format!("{indent}{line}")
            }
        })
        .collect()
}

fn category<'a>(
    unit: &'a BindingUnit,
    type_name: &str,
    context: &str,
) -> Result<&'a TypeCategory, GenError> {
    unit.types.get(type_name).ok_or_else(|| {
        GenError::new(
            GenErrorKind::Internal,
            format!("{context}: type {type_name} missing from a validated table"),
        )
    })
}

fn internal(message: String) -> GenError {
    GenError::new(GenErrorKind::Internal, message)
}

// Prototypes shared by declaration and definition producers. Pop helpers
// that may allocate take the call arena as an explicit parameter.

fn opaque_pop_prototype(type_name: &str) -> String {
    let sid = names::sid(type_name);
    format!("static {type_name} duk_get_{sid}(duk_context* ctx, duk_idx_t idx)")
}

fn string_ptr_pop_prototype(type_name: &str) -> String {
    let sid = names::sid(type_name);
    format!("static {type_name} duk_get_{sid}(duk_context* ctx, dukbind_arena* arena, duk_idx_t idx)")
}

fn array_pop_prototype(type_name: &str) -> String {
    let sid = names::sid(type_name);
    format!("static dukbind_blk* duk_get_{sid}(duk_context* ctx, dukbind_arena* arena, duk_idx_t idx)")
}

fn array_push_prototype(type_name: &str) -> String {
    let sid = names::sid(type_name);
    format!("static void duk_push_{sid}(duk_context* ctx, dukbind_blk* blk)")
}

fn struct_pop_prototype(type_name: &str) -> String {
    let sid = names::sid(type_name);
    format!(
        "static void duk_get_{sid}(duk_context* ctx, dukbind_arena* arena, duk_idx_t idx, {type_name}* value)"
    )
}

fn struct_push_prototype(type_name: &str) -> String {
    let sid = names::sid(type_name);
    format!("static void duk_push_{sid}(duk_context* ctx, {type_name}* value)")
}

fn prim_require(prim: PrimKind) -> String {
    format!("duk_require_{}", prim.as_str())
}

fn prim_push(prim: PrimKind) -> String {
    format!("duk_push_{}", prim.as_str())
}

pub fn pop_declaration(type_name: &str, cat: &TypeCategory) -> Vec<String> {
    let sid = names::sid(type_name);
    match cat {
        TypeCategory::Atomic { prim, nullable } => {
            let require = prim_require(*prim);
            if *nullable {
                vec![format!(
                    "#define duk_get_{sid}(ctx,idx) (duk_is_null((ctx),(idx))||duk_is_undefined((ctx),(idx))?NULL:({type_name}){require}((ctx),(idx)))"
                )]
            } else {
                vec![format!(
                    "#define duk_get_{sid}(ctx,idx) {require}((ctx),(idx))"
                )]
            }
        }
        TypeCategory::Builtin { .. } => Vec::new(),
        TypeCategory::Buffer => vec![format!(
            "#define duk_get_{sid}(ctx,idx) (({type_name})duk_require_buffer_data((ctx),(idx),NULL))"
        )],
        TypeCategory::Opaque => vec![format!("{};", opaque_pop_prototype(type_name))],
        TypeCategory::FixedString => vec![format!(
            "#define duk_get_{sid}(ctx,idx,out_value) cnv_cesu_to_utf(duk_require_string((ctx),(idx)),(out_value))"
        )],
        TypeCategory::StringPtr => vec![format!("{};", string_ptr_pop_prototype(type_name))],
        TypeCategory::Array { .. } => vec![format!("{};", array_pop_prototype(type_name))],
        TypeCategory::Struct { .. } => vec![format!("{};", struct_pop_prototype(type_name))],
        TypeCategory::Constant => Vec::new(),
    }
}

pub fn push_declaration(type_name: &str, cat: &TypeCategory) -> Vec<String> {
    let sid = names::sid(type_name);
    match cat {
        TypeCategory::Atomic { prim, .. } => {
            let push = prim_push(*prim);
            vec![format!(
                "#define duk_push_{sid}(ctx,value) {push}((ctx),(value))"
            )]
        }
        TypeCategory::Builtin { .. } => Vec::new(),
        TypeCategory::Buffer => vec![format!(
            "/* duk_push_{sid}: buffer payloads carry no length and are never pushed */"
        )],
        TypeCategory::Opaque => vec![format!(
            "#define duk_push_{sid}(ctx,value) memcpy(duk_push_fixed_buffer(ctx,sizeof({type_name})),&(value),sizeof({type_name}))"
        )],
        TypeCategory::FixedString => vec![format!(
            "#define duk_push_{sid}(ctx,value) duk_push_string((ctx),(value))"
        )],
        TypeCategory::StringPtr => vec![format!(
            "#define duk_push_{sid}(ctx,value) duk_push_string((ctx),(value))"
        )],
        TypeCategory::Array { .. } => vec![format!("{};", array_push_prototype(type_name))],
        TypeCategory::Struct { .. } => vec![format!("{};", struct_push_prototype(type_name))],
        TypeCategory::Constant => Vec::new(),
    }
}

pub fn pop_definition(
    unit: &BindingUnit,
    type_name: &str,
    cat: &TypeCategory,
) -> Result<Vec<String>, GenError> {
    match cat {
        TypeCategory::Opaque => Ok(vec![
            format!("{} {{", opaque_pop_prototype(type_name)),
            format!("\t{type_name} value;"),
            format!(
                "\tmemcpy(&value, duk_require_buffer_data(ctx, idx, NULL), sizeof({type_name}));"
            ),
            "\treturn value;".to_string(),
            "}".to_string(),
        ]),
        TypeCategory::StringPtr => {
            let mut lines = vec![format!("{} {{", string_ptr_pop_prototype(type_name))];
            lines.extend(tabify(
                1,
                vec![
                    "if (duk_is_null(ctx, idx) || duk_is_undefined(ctx, idx)) {".to_string(),
                    "\treturn NULL;".to_string(),
                    "}".to_string(),
                    String::new(),
                    "const char* cesu = duk_require_string(ctx, idx);".to_string(),
                    "dukbind_blk* blk = dukbind_arena_alloc(arena, cnv_cesu_to_utf_length(cesu) + 1);"
                        .to_string(),
                    "char* utf = (char*)blk->data;".to_string(),
                    String::new(),
                    "cnv_cesu_to_utf(cesu, utf);".to_string(),
                    String::new(),
                    format!("return ({type_name})utf;"),
                ],
            ));
            lines.push("}".to_string());
            Ok(lines)
        }
        TypeCategory::Array { elem } => {
            let elem_pop = pop_variable(unit, elem, "value[i]", "-1", "arena")?;
            let mut body = vec![
                "duk_size_t length = duk_get_length(ctx, idx);".to_string(),
                String::new(),
                "if (length == 0) {".to_string(),
                "\treturn NULL;".to_string(),
                "}".to_string(),
                String::new(),
                format!("dukbind_blk* blk = dukbind_arena_alloc(arena, length * sizeof({elem}));"),
                format!("{elem}* value = ({elem}*)blk->data;"),
                String::new(),
                "for (duk_idx_t i = 0; i < (duk_idx_t)length; i++) {".to_string(),
                "\tduk_get_prop_index(ctx, idx, i);".to_string(),
            ];
            body.extend(tabify(1, elem_pop));
            body.extend([
                "\tduk_pop(ctx);".to_string(),
                "}".to_string(),
                String::new(),
                "return blk;".to_string(),
            ]);
            let mut lines = vec![format!("{} {{", array_pop_prototype(type_name))];
            lines.extend(tabify(1, body));
            lines.push("}".to_string());
            Ok(lines)
        }
        TypeCategory::Struct { fields } => {
            let mut body = Vec::new();
            for field in fields {
                body.push(format!("duk_get_prop_string(ctx, idx, \"{}\");", field.name));
                body.extend(pop_variable(
                    unit,
                    &field.type_name,
                    &format!("value->{}", field.name),
                    "-1",
                    "arena",
                )?);
                body.push("duk_pop(ctx);".to_string());
            }
            let mut lines = vec![format!("{} {{", struct_pop_prototype(type_name))];
            lines.extend(tabify(1, body));
            lines.push("}".to_string());
            Ok(lines)
        }
        _ => Ok(Vec::new()),
    }
}

pub fn push_definition(
    unit: &BindingUnit,
    type_name: &str,
    cat: &TypeCategory,
) -> Result<Vec<String>, GenError> {
    match cat {
        TypeCategory::Array { elem } => {
            let elem_push = push_variable(unit, elem, "value[i]", false)?;
            let mut body = vec![
                "duk_push_array(ctx);".to_string(),
                String::new(),
                "if (blk == NULL) {".to_string(),
                "\treturn;".to_string(),
                "}".to_string(),
                String::new(),
                format!("duk_size_t length = blk->size / sizeof({elem});"),
                format!("{elem}* value = ({elem}*)blk->data;"),
                String::new(),
                "for (duk_idx_t i = 0; i < (duk_idx_t)length; i++) {".to_string(),
            ];
            body.extend(tabify(1, elem_push));
            body.extend([
                "\tduk_put_prop_index(ctx, -2, i);".to_string(),
                "}".to_string(),
            ]);
            let mut lines = vec![format!("{} {{", array_push_prototype(type_name))];
            lines.extend(tabify(1, body));
            lines.push("}".to_string());
            Ok(lines)
        }
        TypeCategory::Struct { fields } => {
            let mut body = vec!["duk_push_object(ctx);".to_string()];
            for field in fields {
                body.extend(push_variable(
                    unit,
                    &field.type_name,
                    &format!("value->{}", field.name),
                    false,
                )?);
                body.push(format!("duk_put_prop_string(ctx, -2, \"{}\");", field.name));
            }
            let mut lines = vec![format!("{} {{", struct_push_prototype(type_name))];
            lines.extend(tabify(1, body));
            lines.push("}".to_string());
            Ok(lines)
        }
        _ => Ok(Vec::new()),
    }
}

/// One statement reading a dynamic value into `lvalue`. `arena` is the
/// expression for the current arena pointer (`&arena` inside stubs, the
/// `arena` parameter inside generated helpers).
pub fn pop_variable(
    unit: &BindingUnit,
    type_name: &str,
    lvalue: &str,
    idx: &str,
    arena: &str,
) -> Result<Vec<String>, GenError> {
    let cat = category(unit, type_name, "pop")?;
    let sid = names::sid(type_name);
    Ok(match cat {
        TypeCategory::Atomic { .. }
        | TypeCategory::Builtin { .. }
        | TypeCategory::Buffer
        | TypeCategory::Opaque => {
            vec![format!("{lvalue} = duk_get_{sid}(ctx, {idx});")]
        }
        TypeCategory::FixedString => {
            vec![format!(
                "cnv_cesu_to_utf(duk_get_string(ctx, {idx}), {lvalue});"
            )]
        }
        TypeCategory::StringPtr | TypeCategory::Array { .. } => {
            vec![format!("{lvalue} = duk_get_{sid}(ctx, {arena}, {idx});")]
        }
        TypeCategory::Struct { .. } => {
            vec![format!("duk_get_{sid}(ctx, {arena}, {idx}, &({lvalue}));")]
        }
        TypeCategory::Constant => Vec::new(),
    })
}

/// One statement pushing `expr` as a dynamic value. `is_pointer` marks
/// expressions that already hold a pointer to the value (by-reference
/// returns).
pub fn push_variable(
    unit: &BindingUnit,
    type_name: &str,
    expr: &str,
    is_pointer: bool,
) -> Result<Vec<String>, GenError> {
    let cat = category(unit, type_name, "push")?;
    let sid = names::sid(type_name);
    match cat {
        TypeCategory::Atomic { .. } | TypeCategory::Builtin { .. } | TypeCategory::StringPtr => {
            let expr = if is_pointer {
                format!("*({expr})")
            } else {
                expr.to_string()
            };
            Ok(vec![format!("duk_push_{sid}(ctx, {expr});")])
        }
        TypeCategory::Opaque | TypeCategory::FixedString | TypeCategory::Array { .. } => {
            if is_pointer {
                return Err(internal(format!(
                    "push: type {type_name} has no pointer form"
                )));
            }
            let call = if matches!(cat, TypeCategory::FixedString) {
                format!("duk_push_string(ctx, {expr});")
            } else {
                format!("duk_push_{sid}(ctx, {expr});")
            };
            Ok(vec![call])
        }
        TypeCategory::Struct { .. } => {
            let expr = if is_pointer {
                expr.to_string()
            } else {
                format!("&({expr})")
            };
            Ok(vec![format!("duk_push_{sid}(ctx, {expr});")])
        }
        TypeCategory::Buffer | TypeCategory::Constant => Err(internal(format!(
            "push: type {type_name} cannot be pushed"
        ))),
    }
}

/// Native storage declaration for one argument. Constants have none.
fn declare_argument(cat: &TypeCategory, arg: &Argument) -> Result<Vec<String>, GenError> {
    Ok(match cat {
        TypeCategory::FixedString => {
            let size = arg.size.as_deref().ok_or_else(|| {
                internal(format!("argument {}: unvalidated char[] size", arg.name))
            })?;
            vec![format!("char {}[{}];", arg.name, size)]
        }
        TypeCategory::Array { .. } => vec![format!("dukbind_blk* {};", arg.name)],
        TypeCategory::Constant => Vec::new(),
        _ => vec![format!("{} {};", arg.type_name, arg.name)],
    })
}

/// The expression an argument contributes at the call site. Arrays pass
/// their block's payload (NULL when no block was provisioned), constants
/// pass their name verbatim, by-reference arguments take address-of.
fn reference_argument(cat: &TypeCategory, arg: &Argument) -> String {
    let base = match cat {
        TypeCategory::Array { elem } => format!(
            "({name} == NULL ? NULL : ({elem}*){name}->data)",
            name = arg.name
        ),
        _ => arg.name.clone(),
    };
    if arg.by_ref {
        format!("&({base})")
    } else {
        base
    }
}

pub fn emit_stub(
    unit: &BindingUnit,
    fn_name: &str,
    contract: &FunctionContract,
) -> Result<Vec<String>, GenError> {
    let policy = unit.policies.get(&contract.throws).ok_or_else(|| {
        internal(format!(
            "stub {fn_name}: policy {} missing from a validated unit",
            contract.throws
        ))
    })?;
    if contract.returns.is_none() && !policy.is_nothing() {
        return Err(internal(format!(
            "stub {fn_name}: void contract reached emission with a value guard"
        )));
    }

    let mut sections: Vec<Vec<String>> = Vec::new();

    let mut decls = vec!["dukbind_arena arena = dukbind_arena_init(ctx);".to_string()];
    for arg in &contract.args {
        let cat = category(unit, &arg.type_name, fn_name)?;
        decls.extend(declare_argument(cat, arg)?);
    }
    sections.push(decls);

    // The slot counter advances only for arguments that actually read a
    // dynamic call slot: OUT-only arguments are never popped and constants
    // are call-site literals.
    let mut pops = Vec::new();
    let mut slot = 0usize;
    for arg in contract.in_args() {
        let cat = category(unit, &arg.type_name, fn_name)?;
        if !cat.consumes_slot() {
            continue;
        }
        pops.extend(pop_variable(
            unit,
            &arg.type_name,
            &arg.name,
            &slot.to_string(),
            "&arena",
        )?);
        slot += 1;
    }
    sections.push(pops);

    // Output-only arrays have no popped block, so their storage is
    // provisioned from the declared size.
    let mut preps = Vec::new();
    for arg in &contract.args {
        if arg.direction.is_in() {
            continue;
        }
        let cat = category(unit, &arg.type_name, fn_name)?;
        if let TypeCategory::Array { elem } = cat {
            let size = arg.size.as_deref().ok_or_else(|| {
                internal(format!("argument {}: unvalidated array size", arg.name))
            })?;
            preps.push(format!(
                "{} = dukbind_arena_alloc(&arena, ({size}) * sizeof({elem}));",
                arg.name
            ));
        }
    }
    sections.push(preps);

    let mut call = Vec::new();
    if policy.resets_errno() {
        call.push("errno = 0;".to_string());
    }
    let mut refs = Vec::new();
    for arg in &contract.args {
        let cat = category(unit, &arg.type_name, fn_name)?;
        refs.push(reference_argument(cat, arg));
    }
    let invocation = format!("{fn_name}({})", refs.join(", "));
    match &contract.returns {
        Some(ret) => {
            if ret.by_ref {
                call.push(format!("{}* {};", ret.type_name, ret.name));
            } else {
                call.push(format!("{} {};", ret.type_name, ret.name));
            }
            call.push(format!("{} = {invocation};", ret.name));
        }
        None => call.push(format!("{invocation};")),
    }
    sections.push(call);

    let release = "dukbind_arena_release(&arena);".to_string();
    let governing = contract
        .returns
        .as_ref()
        .map(|ret| ret.name.as_str())
        .unwrap_or_default();
    sections.push(policy.guard_lines(governing, &[release.clone()]));

    let out_args: Vec<&Argument> = contract.out_args().collect();
    let mut pushes = Vec::new();
    if !out_args.is_empty() {
        pushes.push("duk_push_object(ctx);".to_string());
        for arg in &out_args {
            pushes.extend(push_variable(unit, &arg.type_name, &arg.name, false)?);
            pushes.push(format!("duk_put_prop_string(ctx, -2, \"{}\");", arg.name));
        }
        if let Some(ret) = &contract.returns {
            pushes.extend(push_variable(unit, &ret.type_name, &ret.name, ret.by_ref)?);
            pushes.push("duk_put_prop_string(ctx, -2, \"value\");".to_string());
        }
    } else if let Some(ret) = &contract.returns {
        pushes.extend(push_variable(unit, &ret.type_name, &ret.name, ret.by_ref)?);
    }
    sections.push(pushes);

    let produces = contract.returns.is_some() || !out_args.is_empty();
    sections.push(vec![
        release,
        format!("return {};", if produces { 1 } else { 0 }),
    ]);

    let mut lines = vec![format!(
        "static duk_ret_t {}(duk_context* ctx) {{",
        names::stub_name(fn_name)
    )];
    let mut first = true;
    for section in sections {
        if section.is_empty() {
            continue;
        }
        if !first {
            lines.push(String::new());
        }
        first = false;
        lines.extend(tabify(1, section));
    }
    lines.push("}".to_string());
    Ok(lines)
}

/// Registration rows in function-table order. argc counts every declared
/// argument, slotless constants included.
pub fn fn_decls(unit: &BindingUnit) -> Vec<FnDecl> {
    unit.functions
        .iter()
        .map(|(fn_name, contract)| FnDecl {
            name: fn_name.to_string(),
            entry: names::stub_name(fn_name),
            argc: contract.args.len(),
        })
        .collect()
}

pub fn emit_unit(unit: &BindingUnit) -> Result<String, GenError> {
    let mut blocks: Vec<Vec<String>> = Vec::new();

    blocks.push(vec![format!(
        "/* Generated by dukbindc. Binding domain: {}. Do not edit. */",
        unit.domain.as_str()
    )]);

    if !unit.includes.is_empty() {
        blocks.push(
            unit.includes
                .iter()
                .map(|inc| format!("#include <{inc}>"))
                .collect(),
        );
    }
    blocks.push(vec!["#include \"dukbind.h\"".to_string()]);

    let mut decls = Vec::new();
    for (type_name, cat) in unit.types.iter() {
        decls.extend(pop_declaration(type_name, cat));
        decls.extend(push_declaration(type_name, cat));
    }
    if !decls.is_empty() {
        blocks.push(decls);
    }

    for (type_name, cat) in unit.types.iter() {
        let pop = pop_definition(unit, type_name, cat)?;
        if !pop.is_empty() {
            blocks.push(pop);
        }
        let push = push_definition(unit, type_name, cat)?;
        if !push.is_empty() {
            blocks.push(push);
        }
    }

    for (fn_name, contract) in unit.functions.iter() {
        blocks.push(emit_stub(unit, fn_name, contract)?);
    }

    let mut registration = vec!["DUKBIND_FN_DECL dukbind_fn_decls[] = {".to_string()];
    for decl in fn_decls(unit) {
        registration.push(format!(
            "\t{{ .name = \"{}\", .func = {}, .argc = {} }},",
            decl.name, decl.entry, decl.argc
        ));
    }
    registration.push("};".to_string());
    blocks.push(registration);

    blocks.push(vec![format!(
        "size_t dukbind_fn_decls_count = {};",
        unit.functions.len()
    )]);

    let mut out = String::new();
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for line in block {
            out.push_str(line);
            out.push('\n');
        }
    }
    Ok(out)
}
