//! Error-detection policies. A policy inspects the governing value after the
//! native call and decides whether the stub raises a script error instead of
//! returning. Raising must release the call arena first, so every guard body
//! receives the cleanup lines to run before it throws.

use std::collections::BTreeMap;

/// Domain-supplied guard. `{v}` in `test` and `raise` is replaced with the
/// governing value's variable name at emission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainGuard {
    pub test: String,
    pub raise: Vec<String>,
}

impl DomainGuard {
    pub fn new(test: &str, raise: &[&str]) -> Self {
        Self {
            test: test.to_string(),
            raise: raise.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Policy {
    /// The call cannot fail, or failure is not reported through the return
    /// value. No guard is emitted.
    Nothing,
    /// Failure reported as -1 with errno set.
    Errno,
    /// Failure reported as NULL with errno set.
    ErrnoOnNull,
    /// No in-band failure value; errno alone distinguishes failure, so the
    /// stub clears it before the call and tests it after.
    ErrnoAlone,
    Domain(DomainGuard),
}

impl Policy {
    /// Errno-family policies reset `errno` to 0 before invoking the native
    /// function so a stale value cannot read as a failure.
    pub fn resets_errno(&self) -> bool {
        matches!(
            self,
            Policy::Errno | Policy::ErrnoOnNull | Policy::ErrnoAlone
        )
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, Policy::Nothing)
    }

    /// Guard block for one stub: test on the governing value, cleanup, then
    /// the raise sequence. Empty for `Nothing`. Body lines carry one level of
    /// embedded indentation; the caller tabifies the whole block.
    pub fn guard_lines(&self, governing: &str, cleanup: &[String]) -> Vec<String> {
        let (test, raise): (String, Vec<String>) = match self {
            Policy::Nothing => return Vec::new(),
            Policy::Errno => (
                format!("{governing} == -1"),
                vec!["dukbind_throw_errno(ctx);".to_string()],
            ),
            Policy::ErrnoOnNull => (
                format!("{governing} == NULL"),
                vec!["dukbind_throw_errno(ctx);".to_string()],
            ),
            Policy::ErrnoAlone => (
                "errno != 0".to_string(),
                vec!["dukbind_throw_errno(ctx);".to_string()],
            ),
            Policy::Domain(guard) => (
                guard.test.replace("{v}", governing),
                guard
                    .raise
                    .iter()
                    .map(|line| line.replace("{v}", governing))
                    .collect(),
            ),
        };
        let mut lines = Vec::new();
        lines.push(format!("if ({test}) {{"));
        for line in cleanup {
            lines.push(format!("\t{line}"));
        }
        for line in &raise {
            lines.push(format!("\t{line}"));
        }
        lines.push("}".to_string());
        lines
    }
}

/// Named policies one binding domain recognizes. Contracts refer to policies
/// by name; an unknown name is a generation error, not a fallback.
#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    entries: BTreeMap<String, Policy>,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four policies shared by every POSIX-style domain.
    pub fn errno_family() -> Self {
        let mut registry = Self::new();
        registry.register("nothing", Policy::Nothing);
        registry.register("errno", Policy::Errno);
        registry.register("errno-on-null", Policy::ErrnoOnNull);
        registry.register("errno-alone", Policy::ErrnoAlone);
        registry
    }

    pub fn register(&mut self, name: &str, policy: Policy) {
        self.entries.insert(name.to_string(), policy);
    }

    pub fn get(&self, name: &str) -> Option<&Policy> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
