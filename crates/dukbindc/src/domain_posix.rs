//! POSIX binding domain: the process, file and directory calls exposed to
//! scripts, marshalled per the type table below. Table entries are declared
//! here in name order to match the emitted artifact.

use dukbind_domains::DomainId;

use crate::contract::{Argument, FunctionContract, ReturnSpec};
use crate::policy::PolicyRegistry;
use crate::table::BindingUnit;
use crate::types::{PrimKind, StructField, TypeCategory};

pub fn unit() -> BindingUnit {
    let mut unit = BindingUnit::new(DomainId::Posix);

    unit.includes = [
        "crypt.h",
        "dirent.h",
        "errno.h",
        "fcntl.h",
        "poll.h",
        "signal.h",
        "stdio.h",
        "stdlib.h",
        "string.h",
        "sys/random.h",
        "sys/stat.h",
        "sys/types.h",
        "sys/wait.h",
        "unistd.h",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    unit.policies = PolicyRegistry::errno_family();

    let types = &mut unit.types;
    types.insert("blkcnt_t", TypeCategory::atomic(PrimKind::Int));
    types.insert("blksize_t", TypeCategory::atomic(PrimKind::Int));
    types.insert("char[]", TypeCategory::FixedString);
    types.insert("char*", TypeCategory::StringPtr);
    types.insert("const char*", TypeCategory::StringPtr);
    types.insert("dev_t", TypeCategory::atomic(PrimKind::Int));
    types.insert("gid_t", TypeCategory::atomic(PrimKind::Int));
    types.insert("mode_t", TypeCategory::atomic(PrimKind::Int));
    types.insert("nfds_t", TypeCategory::atomic(PrimKind::Int));
    types.insert("nlink_t", TypeCategory::atomic(PrimKind::Int));
    types.insert("ino_t", TypeCategory::atomic(PrimKind::Int));
    types.insert("int", TypeCategory::builtin(PrimKind::Int));
    // Wider than the scripting engine's 32-bit int coercion.
    types.insert("long", TypeCategory::atomic(PrimKind::Number));
    types.insert("off_t", TypeCategory::atomic(PrimKind::Number));
    types.insert("pid_t", TypeCategory::atomic(PrimKind::Int));
    types.insert("size_t", TypeCategory::atomic(PrimKind::Int));
    types.insert("ssize_t", TypeCategory::atomic(PrimKind::Int));
    types.insert("short int", TypeCategory::atomic(PrimKind::Int));
    types.insert("uid_t", TypeCategory::atomic(PrimKind::Int));
    types.insert("unsigned", TypeCategory::atomic(PrimKind::Int));
    types.insert("unsigned char", TypeCategory::atomic(PrimKind::Int));
    types.insert("unsigned int", TypeCategory::atomic(PrimKind::Int));

    types.insert("DIR*", TypeCategory::Opaque);

    types.insert("void*", TypeCategory::Buffer);

    types.insert("char*[]", TypeCategory::array("char*"));
    types.insert("int[]", TypeCategory::array("int"));
    types.insert("struct pollfd[]", TypeCategory::array("struct pollfd"));

    types.insert(
        "struct dirent",
        TypeCategory::struct_of(vec![
            StructField::new("ino_t", "d_ino"),
            StructField::new("off_t", "d_off"),
            StructField::new("unsigned int", "d_reclen"),
            StructField::new("unsigned char", "d_type"),
            StructField::with_length("char[]", "d_name", 256),
        ]),
    );
    types.insert(
        "struct stat",
        TypeCategory::struct_of(vec![
            StructField::new("dev_t", "st_dev"),
            StructField::new("ino_t", "st_ino"),
            StructField::new("mode_t", "st_mode"),
            StructField::new("nlink_t", "st_nlink"),
            StructField::new("uid_t", "st_uid"),
            StructField::new("gid_t", "st_gid"),
            StructField::new("dev_t", "st_rdev"),
            StructField::new("off_t", "st_size"),
            StructField::new("blksize_t", "st_blksize"),
            StructField::new("blkcnt_t", "st_blocks"),
            StructField::new("struct timespec", "st_atim"),
            StructField::new("struct timespec", "st_mtim"),
            StructField::new("struct timespec", "st_ctim"),
        ]),
    );
    types.insert(
        "struct pollfd",
        TypeCategory::struct_of(vec![
            StructField::new("int", "fd"),
            StructField::new("short int", "events"),
            StructField::new("short int", "revents"),
        ]),
    );
    types.insert(
        "struct timespec",
        TypeCategory::struct_of(vec![
            StructField::new("long", "tv_nsec"),
            StructField::new("long", "tv_sec"),
        ]),
    );

    let functions = &mut unit.functions;
    functions.insert(
        "alarm",
        FunctionContract::new(
            vec![Argument::new("int", "seconds")],
            Some(ReturnSpec::new("unsigned")),
            "nothing",
        ),
    );
    functions.insert(
        "chdir",
        FunctionContract::new(
            vec![Argument::new("char*", "path")],
            Some(ReturnSpec::new("int")),
            "errno",
        ),
    );
    functions.insert(
        "close",
        FunctionContract::new(
            vec![Argument::new("int", "fd")],
            Some(ReturnSpec::new("int")),
            "errno",
        ),
    );
    functions.insert(
        "closedir",
        FunctionContract::new(
            vec![Argument::new("DIR*", "dirp")],
            Some(ReturnSpec::new("int")),
            "errno",
        ),
    );
    functions.insert(
        "crypt",
        FunctionContract::new(
            vec![
                Argument::new("char*", "phrase"),
                Argument::new("char*", "setting"),
            ],
            Some(ReturnSpec::new("char*")),
            "errno-alone",
        ),
    );
    functions.insert(
        "dup",
        FunctionContract::new(
            vec![Argument::new("int", "fildes")],
            Some(ReturnSpec::new("int")),
            "errno",
        ),
    );
    functions.insert(
        "dup2",
        FunctionContract::new(
            vec![
                Argument::new("int", "fildes"),
                Argument::new("int", "fildes2"),
            ],
            Some(ReturnSpec::new("int")),
            "errno",
        ),
    );
    functions.insert(
        "execv",
        FunctionContract::new(
            vec![
                Argument::new("char*", "pathname"),
                Argument::new("char*[]", "argv"),
            ],
            Some(ReturnSpec::new("int")),
            "errno",
        ),
    );
    functions.insert(
        "execvp",
        FunctionContract::new(
            vec![
                Argument::new("char*", "file"),
                Argument::new("char*[]", "argv"),
            ],
            Some(ReturnSpec::new("int")),
            "errno",
        ),
    );
    functions.insert(
        "exit",
        FunctionContract::new(vec![Argument::new("int", "status")], None, "nothing"),
    );
    functions.insert(
        "fork",
        FunctionContract::new(vec![], Some(ReturnSpec::new("pid_t")), "errno"),
    );
    // The uid_t returns for the gid calls match the native headers' own
    // aliasing on the supported platforms.
    functions.insert(
        "getegid",
        FunctionContract::new(vec![], Some(ReturnSpec::new("uid_t")), "errno"),
    );
    functions.insert(
        "getenv",
        FunctionContract::new(
            vec![Argument::new("char*", "name")],
            Some(ReturnSpec::new("char*")),
            "nothing",
        ),
    );
    functions.insert(
        "geteuid",
        FunctionContract::new(vec![], Some(ReturnSpec::new("uid_t")), "errno"),
    );
    functions.insert(
        "getgid",
        FunctionContract::new(vec![], Some(ReturnSpec::new("uid_t")), "errno"),
    );
    functions.insert(
        "getpid",
        FunctionContract::new(vec![], Some(ReturnSpec::new("pid_t")), "errno"),
    );
    functions.insert(
        "getppid",
        FunctionContract::new(vec![], Some(ReturnSpec::new("pid_t")), "errno"),
    );
    functions.insert(
        "getrandom",
        FunctionContract::new(
            vec![
                Argument::new("void*", "buf"),
                Argument::new("size_t", "buflen"),
                Argument::new("unsigned int", "flags"),
            ],
            Some(ReturnSpec::new("ssize_t")),
            "errno",
        ),
    );
    functions.insert(
        "getuid",
        FunctionContract::new(vec![], Some(ReturnSpec::new("uid_t")), "errno"),
    );
    functions.insert(
        "kill",
        FunctionContract::new(
            vec![Argument::new("pid_t", "pid"), Argument::new("int", "sig")],
            Some(ReturnSpec::new("int")),
            "errno",
        ),
    );
    functions.insert(
        "lseek",
        FunctionContract::new(
            vec![
                Argument::new("int", "fildes"),
                Argument::new("off_t", "offset"),
                Argument::new("int", "whence"),
            ],
            Some(ReturnSpec::new("off_t")),
            "errno",
        ),
    );
    functions.insert(
        "lstat",
        FunctionContract::new(
            vec![
                Argument::new("char*", "pathname"),
                Argument::new("struct stat", "statbuf").out().by_reference(),
            ],
            Some(ReturnSpec::new("int")),
            "errno",
        ),
    );
    functions.insert(
        "mkdir",
        FunctionContract::new(
            vec![
                Argument::new("char*", "pathname"),
                Argument::new("mode_t", "mode"),
            ],
            Some(ReturnSpec::new("int")),
            "errno",
        ),
    );
    functions.insert(
        "mkfifo",
        FunctionContract::new(
            vec![
                Argument::new("char*", "pathname"),
                Argument::new("mode_t", "mode"),
            ],
            Some(ReturnSpec::new("int")),
            "errno",
        ),
    );
    functions.insert(
        "open",
        FunctionContract::new(
            vec![
                Argument::new("char*", "pathname"),
                Argument::new("int", "flags"),
                Argument::new("mode_t", "mode"),
            ],
            Some(ReturnSpec::new("int")),
            "errno",
        ),
    );
    functions.insert(
        "opendir",
        FunctionContract::new(
            vec![Argument::new("char*", "name")],
            Some(ReturnSpec::new("DIR*")),
            "errno-on-null",
        ),
    );
    functions.insert(
        "pipe",
        FunctionContract::new(
            vec![Argument::new("int[]", "fildes").in_out()],
            Some(ReturnSpec::new("int")),
            "errno",
        ),
    );
    functions.insert(
        "poll",
        FunctionContract::new(
            vec![
                Argument::new("struct pollfd[]", "fds").in_out(),
                Argument::new("nfds_t", "nfds"),
                Argument::new("int", "timeout"),
            ],
            Some(ReturnSpec::new("int")),
            "errno",
        ),
    );
    functions.insert(
        "read",
        FunctionContract::new(
            vec![
                Argument::new("int", "fd"),
                Argument::new("void*", "buf"),
                Argument::new("size_t", "count"),
            ],
            Some(ReturnSpec::new("ssize_t")),
            "errno",
        ),
    );
    functions.insert(
        "readdir",
        FunctionContract::new(
            vec![Argument::new("DIR*", "dirp")],
            Some(ReturnSpec::new("struct dirent").by_reference()),
            "errno-on-null",
        ),
    );
    functions.insert(
        "readlink",
        FunctionContract::new(
            vec![
                Argument::new("char*", "pathname"),
                Argument::new("void*", "buf"),
                Argument::new("size_t", "bufsiz"),
            ],
            Some(ReturnSpec::new("int")),
            "errno",
        ),
    );
    functions.insert(
        "rmdir",
        FunctionContract::new(
            vec![Argument::new("char*", "pathname")],
            Some(ReturnSpec::new("int")),
            "errno",
        ),
    );
    functions.insert(
        "setenv",
        FunctionContract::new(
            vec![
                Argument::new("char*", "name"),
                Argument::new("char*", "value"),
                Argument::new("int", "overwrite"),
            ],
            Some(ReturnSpec::new("int")),
            "errno",
        ),
    );
    functions.insert(
        "setsid",
        FunctionContract::new(vec![], Some(ReturnSpec::new("pid_t")), "errno"),
    );
    functions.insert(
        "sleep",
        FunctionContract::new(
            vec![Argument::new("unsigned int", "seconds")],
            Some(ReturnSpec::new("unsigned int")),
            "errno",
        ),
    );
    functions.insert(
        "unlink",
        FunctionContract::new(
            vec![Argument::new("char*", "pathname")],
            Some(ReturnSpec::new("int")),
            "errno",
        ),
    );
    functions.insert(
        "unsetenv",
        FunctionContract::new(
            vec![Argument::new("char*", "name")],
            Some(ReturnSpec::new("int")),
            "errno",
        ),
    );
    functions.insert(
        "waitpid",
        FunctionContract::new(
            vec![
                Argument::new("pid_t", "pid"),
                Argument::new("int", "wstatus").out().by_reference(),
                Argument::new("int", "options"),
            ],
            Some(ReturnSpec::new("pid_t")),
            "errno",
        ),
    );
    functions.insert(
        "write",
        FunctionContract::new(
            vec![
                Argument::new("int", "fd"),
                Argument::new("void*", "buf"),
                Argument::new("size_t", "count"),
            ],
            Some(ReturnSpec::new("ssize_t")),
            "errno",
        ),
    );

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
        assert_eq!(unit.functions.len(), 39);
        assert_eq!(unit.types.len(), 31);
        assert!(!unit.types.is_empty());
        assert!(unit.functions.get("waitpid").is_some());
        assert!(unit.functions.get("crypt").is_some());
    }

    #[test]
    fn exit_is_the_only_void_contract() {
        let unit = unit();
        let voids: Vec<&str> = unit
            .functions
            .iter()
            .filter(|(_, c)| c.returns.is_none())
            .map(|(name, _)| name)
            .collect();
        assert_eq!(voids, ["exit"]);
    }
}
