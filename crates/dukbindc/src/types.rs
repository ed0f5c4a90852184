//! The closed set of marshalling strategies a type table can assign to a
//! C type name.

/// Host scalar coercion kind. Selects the `duk_require_*` / `duk_push_*`
/// primitive a scalar type aliases to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimKind {
    Boolean,
    Int,
    Number,
}

impl PrimKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PrimKind::Boolean => "boolean",
            PrimKind::Int => "int",
            PrimKind::Number => "number",
        }
    }
}

/// One named field of a STRUCT category. Field order is load-bearing: pops
/// and pushes enumerate fields exactly as declared, matching native layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    pub type_name: String,
    pub name: String,
    /// Capacity of embedded `char[]` fields.
    pub length: Option<usize>,
}

impl StructField {
    pub fn new(type_name: &str, name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            name: name.to_string(),
            length: None,
        }
    }

    pub fn with_length(type_name: &str, name: &str, length: usize) -> Self {
        Self {
            type_name: type_name.to_string(),
            name: name.to_string(),
            length: Some(length),
        }
    }
}

/// How values of one type name cross the dynamic/native boundary.
///
/// Capabilities differ per category (some cannot be pushed, some consume no
/// call slot, some reject pointer use); the checks live in `validate` and the
/// emission code, keyed off the classification methods below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeCategory {
    /// Scalar aliased to a host coercion primitive. Nullable atomics map
    /// dynamic null/undefined to the native NULL sentinel.
    Atomic { prim: PrimKind, nullable: bool },
    /// Scalar the host API already covers; emits no helper declarations.
    Builtin { prim: PrimKind },
    /// Zero-copy view of a dynamic binary payload. Pop only: raw buffers
    /// carry no length, so a push could not round-trip safely.
    Buffer,
    /// Fixed-size handle copied byte-for-byte through a dynamic buffer.
    Opaque,
    /// Embedded `char[N]` with CESU-8/UTF-8 conversion. Legal only under the
    /// `char[]` type name, and only with a declared length.
    FixedString,
    /// Arena-allocated NUL-terminated string copy; dynamic null/undefined
    /// pop to native NULL.
    StringPtr,
    /// Arena-backed block of `elem` values, marshalled element by element.
    Array { elem: String },
    /// Field-by-field marshalling in declared order.
    Struct { fields: Vec<StructField> },
    /// Literal supplied by the contract itself; never reads a call slot.
    Constant,
}

impl TypeCategory {
    pub fn atomic(prim: PrimKind) -> Self {
        TypeCategory::Atomic {
            prim,
            nullable: false,
        }
    }

    pub fn atomic_nullable(prim: PrimKind) -> Self {
        TypeCategory::Atomic {
            prim,
            nullable: true,
        }
    }

    pub fn builtin(prim: PrimKind) -> Self {
        TypeCategory::Builtin { prim }
    }

    pub fn array(elem: &str) -> Self {
        TypeCategory::Array {
            elem: elem.to_string(),
        }
    }

    pub fn struct_of(fields: Vec<StructField>) -> Self {
        TypeCategory::Struct { fields }
    }

    /// False only for categories whose pop reads no dynamic call slot.
    pub fn consumes_slot(&self) -> bool {
        !matches!(self, TypeCategory::Constant)
    }

    pub fn supports_push(&self) -> bool {
        !matches!(self, TypeCategory::Buffer | TypeCategory::Constant)
    }

    /// Categories whose values may be declared or marshalled through a
    /// pointer (by-reference returns, `&x` call sites).
    pub fn supports_pointer(&self) -> bool {
        matches!(
            self,
            TypeCategory::Atomic { .. }
                | TypeCategory::Builtin { .. }
                | TypeCategory::StringPtr
                | TypeCategory::Struct { .. }
        )
    }

    /// Categories legal as a return type. Buffers cannot be pushed, constants
    /// are call-site literals, embedded strings and arena blocks have no
    /// by-value C return representation.
    pub fn supports_return(&self) -> bool {
        matches!(
            self,
            TypeCategory::Atomic { .. }
                | TypeCategory::Builtin { .. }
                | TypeCategory::Opaque
                | TypeCategory::StringPtr
                | TypeCategory::Struct { .. }
        )
    }

}
