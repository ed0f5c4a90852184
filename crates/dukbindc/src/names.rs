//! Identifier derivation for generated C symbols.

/// Maps a C type spelling to the suffix used by generated marshalling helpers:
/// `char*[]` becomes `char_pt_arr`, `struct stat` becomes `struct_stat`.
pub fn sid(type_name: &str) -> String {
    type_name
        .replace("[]", "_arr")
        .replace('*', "_pt")
        .replace(' ', "_")
}

pub fn stub_name(fn_name: &str) -> String {
    format!("_dukbind_{fn_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sid_encodes_arrays_pointers_and_spaces() {
        assert_eq!(sid("int"), "int");
        assert_eq!(sid("pid_t"), "pid_t");
        assert_eq!(sid("char*"), "char_pt");
        assert_eq!(sid("const char*"), "const_char_pt");
        assert_eq!(sid("char[]"), "char_arr");
        assert_eq!(sid("char*[]"), "char_pt_arr");
        assert_eq!(sid("struct stat"), "struct_stat");
        assert_eq!(sid("struct pollfd[]"), "struct_pollfd_arr");
        assert_eq!(sid("unsigned int"), "unsigned_int");
    }

    #[test]
    fn stub_names_carry_the_generator_prefix() {
        assert_eq!(stub_name("waitpid"), "_dukbind_waitpid");
        assert_eq!(stub_name("wattr_get"), "_dukbind_wattr_get");
    }
}
