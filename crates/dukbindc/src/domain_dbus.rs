//! D-Bus binding domain. The bus calls are hand-implemented in the runtime,
//! so every contract is a customized placeholder; the table still drives the
//! registration list and carries the domain's error guard for the runtime's
//! own marshalling helpers.

use dukbind_domains::DomainId;

use crate::contract::FunctionContract;
use crate::policy::{DomainGuard, Policy, PolicyRegistry};
use crate::table::BindingUnit;
use crate::types::{PrimKind, TypeCategory};

pub fn unit() -> BindingUnit {
    let mut unit = BindingUnit::new(DomainId::Dbus);

    unit.includes = ["dbus/dbus.h", "stdlib.h", "string.h"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut policies = PolicyRegistry::new();
    policies.register("nothing", Policy::Nothing);
    policies.register(
        "error",
        Policy::Domain(DomainGuard::new(
            "dbus_error_is_set(&{v})",
            &[
                "duk_push_error_object(ctx, DUK_ERR_ERROR, {v}.message);",
                "dbus_error_free(&{v});",
                "duk_throw(ctx);",
            ],
        )),
    );
    unit.policies = policies;

    let types = &mut unit.types;
    types.insert("char*", TypeCategory::StringPtr);
    types.insert("int", TypeCategory::atomic(PrimKind::Int));
    types.insert("short", TypeCategory::atomic(PrimKind::Int));
    types.insert("CONSTANT", TypeCategory::Constant);
    types.insert("DBusConnection*", TypeCategory::Opaque);
    types.insert("DBusMessage*", TypeCategory::Opaque);

    let functions = &mut unit.functions;
    functions.insert("call", FunctionContract::customized(7));
    functions.insert("close", FunctionContract::customized(1));
    functions.insert("open", FunctionContract::customized(1));

    unit
}
