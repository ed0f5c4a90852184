//! Native-function contracts: the per-function rows of a domain's table.

/// Which way a value crosses the boundary. IN arguments are read from the
/// dynamic call, OUT arguments are produced by the native call and returned
/// to the caller inside the result object, IN_OUT arguments do both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    In,
    Out,
    InOut,
}

impl Direction {
    pub fn is_in(self) -> bool {
        matches!(self, Direction::In | Direction::InOut)
    }

    pub fn is_out(self) -> bool {
        matches!(self, Direction::Out | Direction::InOut)
    }
}

/// One declared argument of a native function.
///
/// `by_ref` is a calling-convention fact, independent of direction: it makes
/// the stub pass `&x` at the call site (and nothing else). `size` is a C
/// length expression, required when an OUT-only array or an embedded string
/// argument needs its storage sized before the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub type_name: String,
    pub name: String,
    pub direction: Direction,
    pub by_ref: bool,
    pub size: Option<String>,
}

impl Argument {
    pub fn new(type_name: &str, name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            name: name.to_string(),
            direction: Direction::In,
            by_ref: false,
            size: None,
        }
    }

    pub fn out(mut self) -> Self {
        self.direction = Direction::Out;
        self
    }

    pub fn in_out(mut self) -> Self {
        self.direction = Direction::InOut;
        self
    }

    pub fn by_reference(mut self) -> Self {
        self.by_ref = true;
        self
    }

    pub fn with_size(mut self, expr: &str) -> Self {
        self.size = Some(expr.to_string());
        self
    }
}

/// The produced value of a native call. `None` on the contract means void.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnSpec {
    pub type_name: String,
    pub name: String,
    pub by_ref: bool,
}

impl ReturnSpec {
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            name: "ret_value".to_string(),
            by_ref: false,
        }
    }

    pub fn by_reference(mut self) -> Self {
        self.by_ref = true;
        self
    }
}

/// One function's contract. Contracts are keyed by function name in the
/// domain's table; `throws` names the error policy guarding the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionContract {
    pub args: Vec<Argument>,
    pub returns: Option<ReturnSpec>,
    pub throws: String,
}

impl FunctionContract {
    pub fn new(args: Vec<Argument>, returns: Option<ReturnSpec>, throws: &str) -> Self {
        Self {
            args,
            returns,
            throws: throws.to_string(),
        }
    }

    /// Trivial contract: `argc` untyped int arguments, int return, never
    /// throws.
    pub fn customized(argc: usize) -> Self {
        let args = (0..argc)
            .map(|i| Argument::new("int", &format!("arg{i}")))
            .collect();
        Self {
            args,
            returns: Some(ReturnSpec::new("int")),
            throws: "nothing".to_string(),
        }
    }

    pub fn in_args(&self) -> impl Iterator<Item = &Argument> {
        self.args.iter().filter(|a| a.direction.is_in())
    }

    pub fn out_args(&self) -> impl Iterator<Item = &Argument> {
        self.args.iter().filter(|a| a.direction.is_out())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_defaults_to_in() {
        let arg = Argument::new("int", "fd");
        assert_eq!(arg.direction, Direction::In);
        assert!(arg.direction.is_in());
        assert!(!arg.direction.is_out());
        assert!(!arg.by_ref);
        assert!(arg.size.is_none());
    }

    #[test]
    fn in_out_is_both_directions() {
        let arg = Argument::new("int[]", "fildes").in_out();
        assert!(arg.direction.is_in());
        assert!(arg.direction.is_out());
    }

    #[test]
    fn customized_builds_trivial_scalar_contract() {
        let c = FunctionContract::customized(3);
        assert_eq!(c.args.len(), 3);
        assert_eq!(c.args[0].name, "arg0");
        assert_eq!(c.args[2].name, "arg2");
        assert!(c.args.iter().all(|a| a.type_name == "int"));
        assert_eq!(c.returns.as_ref().map(|r| r.type_name.as_str()), Some("int"));
        assert_eq!(c.throws, "nothing");
        assert!(c.out_args().next().is_none());
    }

    #[test]
    fn return_name_defaults_to_ret_value() {
        let ret = ReturnSpec::new("pid_t");
        assert_eq!(ret.name, "ret_value");
        assert!(!ret.by_ref);
        assert!(ReturnSpec::new("struct dirent").by_reference().by_ref);
    }

    #[test]
    fn out_arg_filters_split_by_direction() {
        let c = FunctionContract::new(
            vec![
                Argument::new("pid_t", "pid"),
                Argument::new("int", "wstatus").out().by_reference(),
                Argument::new("int", "options"),
            ],
            Some(ReturnSpec::new("pid_t")),
            "errno",
        );
        let ins: Vec<&str> = c.in_args().map(|a| a.name.as_str()).collect();
        let outs: Vec<&str> = c.out_args().map(|a| a.name.as_str()).collect();
        assert_eq!(ins, ["pid", "options"]);
        assert_eq!(outs, ["wstatus"]);
    }
}
