use dukbind_domains::{DomainId, ALL_DOMAINS};
use dukbindc::domain_config;
use dukbindc::generate;
use dukbindc::table::BindingUnit;
use dukbindc::types::TypeCategory;

fn artifact(domain: DomainId) -> String {
    generate::generate_unit(&domain_config::unit_for_domain(domain))
        .unwrap_or_else(|err| panic!("generate {domain}: {}", err.message))
        .c_src
}

fn block<'a>(src: &'a str, open: &str) -> &'a str {
    let start = src
        .find(open)
        .unwrap_or_else(|| panic!("missing block {open}"));
    let end = src[start..]
        .find("\n}\n")
        .map(|off| start + off + 2)
        .unwrap_or_else(|| panic!("unterminated block {open}"));
    &src[start..end]
}

fn stub<'a>(src: &'a str, name: &str) -> &'a str {
    block(
        src,
        &format!("static duk_ret_t _dukbind_{name}(duk_context* ctx) {{\n"),
    )
}

fn expected_releases(unit: &BindingUnit) -> usize {
    unit.functions
        .iter()
        .map(|(_, contract)| {
            let policy = unit.policies.get(&contract.throws).expect("known policy");
            if policy.is_nothing() {
                1
            } else {
                2
            }
        })
        .sum()
}

#[test]
fn every_function_gets_a_stub_and_registration_row() {
    for domain in ALL_DOMAINS {
        let unit = domain_config::unit_for_domain(domain);
        let src = artifact(domain);

        assert!(src.starts_with(&format!(
            "/* Generated by dukbindc. Binding domain: {domain}. Do not edit. */\n"
        )));
        assert!(src.contains("#include \"dukbind.h\""));

        for (name, contract) in unit.functions.iter() {
            let _ = stub(&src, name);
            let row = format!(
                "\t{{ .name = \"{name}\", .func = _dukbind_{name}, .argc = {} }},",
                contract.args.len()
            );
            assert!(src.contains(&row), "{domain}: missing row {row}");
        }
        assert!(src.contains(&format!(
            "size_t dukbind_fn_decls_count = {};",
            unit.functions.len()
        )));
    }
}

#[test]
fn one_release_per_exit_path() {
    for domain in ALL_DOMAINS {
        let unit = domain_config::unit_for_domain(domain);
        let src = artifact(domain);
        assert_eq!(
            src.matches("dukbind_arena_release(&arena);").count(),
            expected_releases(&unit),
            "{domain}: one release on the success path plus one inside each guard"
        );
        assert_eq!(
            src.matches("dukbind_arena_init(ctx);").count(),
            unit.functions.len()
        );
    }
}

#[test]
fn errno_reset_only_for_errno_policies() {
    let unit = domain_config::unit_for_domain(DomainId::Posix);
    let posix = artifact(DomainId::Posix);
    let resetting = unit
        .functions
        .iter()
        .filter(|(_, contract)| {
            unit.policies
                .get(&contract.throws)
                .expect("known policy")
                .resets_errno()
        })
        .count();
    assert!(resetting > 0);
    assert_eq!(posix.matches("errno = 0;").count(), resetting);

    assert!(!artifact(DomainId::Dbus).contains("errno = 0;"));
    assert!(!artifact(DomainId::Tui).contains("errno = 0;"));
}

#[test]
fn waitpid_stub_collects_status_then_value() {
    let src = artifact(DomainId::Posix);
    let text = stub(&src, "waitpid");
    assert!(text.contains("\tint wstatus;"));
    assert!(text.contains("\tret_value = waitpid(pid, &(wstatus), options);"));
    let status_prop = text
        .find("duk_put_prop_string(ctx, -2, \"wstatus\");")
        .expect("wstatus property");
    let value_prop = text
        .find("duk_put_prop_string(ctx, -2, \"value\");")
        .expect("value property");
    assert!(status_prop < value_prop);
    assert!(text.ends_with("\treturn 1;\n}"));
}

#[test]
fn exit_stub_pushes_nothing() {
    let src = artifact(DomainId::Posix);
    let text = stub(&src, "exit");
    assert!(text.contains("\texit(status);"));
    assert!(!text.contains("duk_push"));
    assert!(text.ends_with("\treturn 0;\n}"));
}

#[test]
fn pipe_round_trips_the_descriptor_array() {
    let src = artifact(DomainId::Posix);
    let text = stub(&src, "pipe");
    assert!(text.contains("\tdukbind_blk* fildes;"));
    assert!(text.contains("\tfildes = duk_get_int_arr(ctx, &arena, 0);"));
    assert!(text.contains("\tret_value = pipe((fildes == NULL ? NULL : (int*)fildes->data));"));
    assert!(text.contains("\tduk_push_int_arr(ctx, fildes);"));
    assert!(text.contains("duk_put_prop_string(ctx, -2, \"fildes\");"));
}

#[test]
fn readdir_returns_struct_pointer() {
    let src = artifact(DomainId::Posix);
    let text = stub(&src, "readdir");
    assert!(text.contains("\tstruct dirent* ret_value;"));
    assert!(text.contains("\tret_value = readdir(dirp);"));
    assert!(text.contains("\tif (ret_value == NULL) {"));
    assert!(text.contains("\tduk_push_struct_dirent(ctx, ret_value);"));
}

#[test]
fn errno_alone_guard_checks_errno_not_the_value() {
    let src = artifact(DomainId::Posix);
    let text = stub(&src, "crypt");
    assert!(text.contains("\tif (errno != 0) {"));
    assert!(text.contains("\t\tdukbind_throw_errno(ctx);"));
    assert!(text.contains("\tchar* ret_value;"));
    assert!(text.contains("\tduk_push_char_pt(ctx, ret_value);"));
}

#[test]
fn buffer_arguments_pop_raw_payloads() {
    let src = artifact(DomainId::Posix);
    let text = stub(&src, "read");
    assert!(text.contains("\tvoid* buf;"));
    assert!(text.contains("\tbuf = duk_get_void_pt(ctx, 1);"));
    assert!(src.contains(
        "#define duk_get_void_pt(ctx,idx) ((void*)duk_require_buffer_data((ctx),(idx),NULL))"
    ));
    assert!(
        src.contains("/* duk_push_void_pt: buffer payloads carry no length and are never pushed */")
    );
}

#[test]
fn string_array_arguments_use_arena_pops() {
    let src = artifact(DomainId::Posix);
    let text = stub(&src, "execv");
    assert!(text.contains("\targv = duk_get_char_pt_arr(ctx, &arena, 1);"));
    assert!(text.contains("\tret_value = execv(pathname, (argv == NULL ? NULL : (char**)argv->data));"));
}

#[test]
fn struct_helpers_walk_fields_in_declared_order() {
    let unit = domain_config::unit_for_domain(DomainId::Posix);
    let src = artifact(DomainId::Posix);
    let Some(TypeCategory::Struct { fields }) = unit.types.get("struct stat") else {
        panic!("struct stat must stay a struct");
    };

    let pop = block(
        &src,
        "static void duk_get_struct_stat(duk_context* ctx, dukbind_arena* arena, duk_idx_t idx, struct stat* value) {\n",
    );
    let push = block(
        &src,
        "static void duk_push_struct_stat(duk_context* ctx, struct stat* value) {\n",
    );
    let mut last_pop = 0;
    let mut last_push = 0;
    for field in fields {
        let quoted = format!("\"{}\"", field.name);
        let at_pop = pop
            .find(&quoted)
            .unwrap_or_else(|| panic!("pop helper missing {quoted}"));
        let at_push = push
            .find(&quoted)
            .unwrap_or_else(|| panic!("push helper missing {quoted}"));
        assert!(at_pop >= last_pop, "pop field order diverges at {quoted}");
        assert!(at_push >= last_push, "push field order diverges at {quoted}");
        last_pop = at_pop;
        last_push = at_push;
    }

    assert!(pop.contains("duk_get_struct_timespec(ctx, arena, -1, &(value->st_atim));"));
    assert!(push.contains("duk_push_struct_timespec(ctx, &(value->st_atim));"));
}

#[test]
fn constants_fill_call_sites_without_slots() {
    let src = artifact(DomainId::Tui);

    let set = stub(&src, "wattr_set");
    assert!(set.contains("\twin = duk_get_WINDOW_pt(ctx, 0);"));
    assert!(set.contains("\tattrs = duk_get_attr_t(ctx, 1);"));
    assert!(set.contains("\tpair = duk_get_short(ctx, 2);"));
    assert!(set.contains("\tret_value = wattr_set(win, attrs, pair, NULL);"));
    assert!(src.contains("{ .name = \"wattr_set\", .func = _dukbind_wattr_set, .argc = 4 },"));

    let get = stub(&src, "wattr_get");
    assert!(get.contains("\tret_value = wattr_get(win, &(attrs), &(pair), NULL);"));
    let attrs_prop = get
        .find("duk_put_prop_string(ctx, -2, \"attrs\");")
        .expect("attrs property");
    let value_prop = get
        .find("duk_put_prop_string(ctx, -2, \"value\");")
        .expect("value property");
    assert!(attrs_prop < value_prop);
}

#[test]
fn dbus_artifact_registers_customized_stubs() {
    let src = artifact(DomainId::Dbus);
    assert!(src.contains("#include <dbus/dbus.h>"));
    assert!(src.contains("size_t dukbind_fn_decls_count = 3;"));
    let text = stub(&src, "call");
    assert!(text.contains("\targ6 = duk_get_int(ctx, 6);"));
    assert!(text.contains("\tret_value = call(arg0, arg1, arg2, arg3, arg4, arg5, arg6);"));
}
