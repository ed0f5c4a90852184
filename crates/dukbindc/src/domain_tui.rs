//! Terminal UI binding domain over ncurses. Most calls report failure as
//! ERR, window constructors as NULL; both raise the same script error.

use dukbind_domains::DomainId;

use crate::contract::{Argument, FunctionContract, ReturnSpec};
use crate::policy::{DomainGuard, Policy, PolicyRegistry};
use crate::table::BindingUnit;
use crate::types::{PrimKind, TypeCategory};

const CURSES_RAISE: [&str; 2] = [
    "duk_push_error_object(ctx, DUK_ERR_ERROR, \"ncurses call failed\");",
    "duk_throw(ctx);",
];

fn win_arg() -> Argument {
    Argument::new("WINDOW*", "win")
}

fn win_call() -> FunctionContract {
    FunctionContract::new(vec![win_arg()], Some(ReturnSpec::new("int")), "error")
}

pub fn unit() -> BindingUnit {
    let mut unit = BindingUnit::new(DomainId::Tui);

    unit.includes = ["curses.h", "stdlib.h", "string.h"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut policies = PolicyRegistry::new();
    policies.register("nothing", Policy::Nothing);
    policies.register(
        "error",
        Policy::Domain(DomainGuard::new("{v} == ERR", &CURSES_RAISE)),
    );
    policies.register(
        "error-on-null",
        Policy::Domain(DomainGuard::new("{v} == NULL", &CURSES_RAISE)),
    );
    unit.policies = policies;

    let types = &mut unit.types;
    types.insert("attr_t", TypeCategory::atomic(PrimKind::Int));
    types.insert("char*", TypeCategory::StringPtr);
    types.insert("int", TypeCategory::atomic(PrimKind::Int));
    types.insert("short", TypeCategory::atomic(PrimKind::Int));
    types.insert("CONSTANT", TypeCategory::Constant);
    types.insert("WINDOW*", TypeCategory::Opaque);

    let functions = &mut unit.functions;
    functions.insert(
        "curs_set",
        FunctionContract::new(
            vec![Argument::new("int", "visibility")],
            Some(ReturnSpec::new("int")),
            "error",
        ),
    );
    functions.insert("delwin", win_call());
    functions.insert(
        "endwin",
        FunctionContract::new(vec![], Some(ReturnSpec::new("int")), "error"),
    );
    // getmaxyx and getyx are curses macros assigning through bare lvalues,
    // so their outputs are neither popped nor passed by address.
    functions.insert(
        "getmaxyx",
        FunctionContract::new(
            vec![
                win_arg(),
                Argument::new("int", "y").out(),
                Argument::new("int", "x").out(),
            ],
            Some(ReturnSpec::new("int")),
            "error",
        ),
    );
    functions.insert(
        "getyx",
        FunctionContract::new(
            vec![
                win_arg(),
                Argument::new("int", "y").out(),
                Argument::new("int", "x").out(),
            ],
            Some(ReturnSpec::new("int")),
            "error",
        ),
    );
    functions.insert(
        "init_color",
        FunctionContract::new(
            vec![
                Argument::new("int", "color"),
                Argument::new("int", "r"),
                Argument::new("int", "g"),
                Argument::new("int", "b"),
            ],
            Some(ReturnSpec::new("int")),
            "error",
        ),
    );
    functions.insert(
        "init_pair",
        FunctionContract::new(
            vec![
                Argument::new("int", "pair"),
                Argument::new("int", "fg"),
                Argument::new("int", "bg"),
            ],
            Some(ReturnSpec::new("int")),
            "error",
        ),
    );
    functions.insert("initscr", FunctionContract::customized(0));
    functions.insert(
        "mvwin",
        FunctionContract::new(
            vec![
                win_arg(),
                Argument::new("int", "y"),
                Argument::new("int", "x"),
            ],
            Some(ReturnSpec::new("int")),
            "error",
        ),
    );
    functions.insert(
        "newwin",
        FunctionContract::new(
            vec![
                Argument::new("int", "nlines"),
                Argument::new("int", "ncols"),
                Argument::new("int", "y"),
                Argument::new("int", "x"),
            ],
            Some(ReturnSpec::new("WINDOW*")),
            "error-on-null",
        ),
    );
    functions.insert(
        "waddstr",
        FunctionContract::new(
            vec![win_arg(), Argument::new("char*", "str")],
            Some(ReturnSpec::new("int")),
            "error",
        ),
    );
    functions.insert(
        "wattr_get",
        FunctionContract::new(
            vec![
                win_arg(),
                Argument::new("attr_t", "attrs").out().by_reference(),
                Argument::new("short", "pair").out().by_reference(),
                Argument::new("CONSTANT", "NULL"),
            ],
            Some(ReturnSpec::new("int")),
            "error",
        ),
    );
    functions.insert(
        "wattr_set",
        FunctionContract::new(
            vec![
                win_arg(),
                Argument::new("attr_t", "attrs"),
                Argument::new("short", "pair"),
                Argument::new("CONSTANT", "NULL"),
            ],
            Some(ReturnSpec::new("int")),
            "error",
        ),
    );
    functions.insert("wclear", win_call());
    functions.insert("werase", win_call());
    functions.insert("wgetch", FunctionContract::customized(0));
    functions.insert(
        "winsstr",
        FunctionContract::new(
            vec![win_arg(), Argument::new("char*", "str")],
            Some(ReturnSpec::new("int")),
            "error",
        ),
    );
    functions.insert(
        "wmove",
        FunctionContract::new(
            vec![
                win_arg(),
                Argument::new("int", "y"),
                Argument::new("int", "x"),
            ],
            Some(ReturnSpec::new("int")),
            "error",
        ),
    );
    functions.insert("wrefresh", win_call());

    unit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate;

    #[test]
    fn table_is_valid_and_complete() {
        let unit = unit();
        assert!(validate::validate_unit(&unit).is_empty());
        assert_eq!(unit.functions.len(), 19);
    }

    #[test]
    fn window_constructors_guard_on_null() {
        let unit = unit();
        let newwin = unit.functions.get("newwin").unwrap();
        assert_eq!(newwin.throws, "error-on-null");
        let policy = unit.policies.get("error-on-null").unwrap();
        let lines = policy.guard_lines("ret_value", &[]);
        assert_eq!(lines[0], "if (ret_value == NULL) {");
    }

    #[test]
    fn position_macros_take_bare_outputs() {
        let unit = unit();
        let getyx = unit.functions.get("getyx").unwrap();
        let outs: Vec<&Argument> = getyx.out_args().collect();
        assert_eq!(outs.len(), 2);
        assert!(outs.iter().all(|a| !a.by_ref));
    }
}
