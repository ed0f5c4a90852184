//! Per-domain binding tables. Both tables key by name through a `BTreeMap`,
//! so iteration order (and therefore every generated artifact) is the
//! lexicographic order of the declared names.

use std::collections::BTreeMap;

use dukbind_domains::DomainId;

use crate::contract::FunctionContract;
use crate::policy::PolicyRegistry;
use crate::types::TypeCategory;

/// C type name to marshalling category.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    entries: BTreeMap<String, TypeCategory>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, type_name: &str, category: TypeCategory) {
        self.entries.insert(type_name.to_string(), category);
    }

    pub fn get(&self, type_name: &str) -> Option<&TypeCategory> {
        self.entries.get(type_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeCategory)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Native function name to call contract.
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    entries: BTreeMap<String, FunctionContract>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, fn_name: &str, contract: FunctionContract) {
        self.entries.insert(fn_name.to_string(), contract);
    }

    pub fn get(&self, fn_name: &str) -> Option<&FunctionContract> {
        self.entries.get(fn_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FunctionContract)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything generation needs for one domain: the headers its artifact
/// includes, its type and function tables, and its policy registry.
#[derive(Debug, Clone)]
pub struct BindingUnit {
    pub domain: DomainId,
    pub includes: Vec<String>,
    pub types: TypeTable,
    pub functions: FunctionTable,
    pub policies: PolicyRegistry,
}

impl BindingUnit {
    pub fn new(domain: DomainId) -> Self {
        Self {
            domain,
            includes: Vec::new(),
            types: TypeTable::new(),
            functions: FunctionTable::new(),
            policies: PolicyRegistry::new(),
        }
    }
}
