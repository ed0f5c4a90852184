//! Shared binding-domain registry helpers.
//!
//! This crate exists so both:
//! - the binding generator (Rust)
//! - host build tooling (Rust)
//!
//! can share an authoritative list of binding domains and the fixed file names
//! of the artifacts generated for each.

use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DomainId {
    #[default]
    Posix,
    Dbus,
    Tui,
}

pub const ALL_DOMAINS: [DomainId; 3] = [DomainId::Posix, DomainId::Dbus, DomainId::Tui];

impl DomainId {
    pub fn as_str(self) -> &'static str {
        match self {
            DomainId::Posix => "posix",
            DomainId::Dbus => "dbus",
            DomainId::Tui => "tui",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "posix" => Some(DomainId::Posix),
            "dbus" => Some(DomainId::Dbus),
            "tui" => Some(DomainId::Tui),
            _ => None,
        }
    }

    /// File name of the generated C artifact for this domain.
    pub fn artifact_file_name(self) -> &'static str {
        match self {
            DomainId::Posix => "dukbind_posix.c",
            DomainId::Dbus => "dukbind_dbus.c",
            DomainId::Tui => "dukbind_tui.c",
        }
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct DomainIdParseError {
    value: String,
}

impl fmt::Display for DomainIdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid binding domain {:?} (expected one of: posix, dbus, tui)",
            self.value
        )
    }
}

impl std::error::Error for DomainIdParseError {}

impl FromStr for DomainId {
    type Err = DomainIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DomainId::parse(s).ok_or_else(|| DomainIdParseError {
            value: s.to_string(),
        })
    }
}

#[cfg(feature = "clap")]
impl clap::ValueEnum for DomainId {
    fn value_variants<'a>() -> &'a [Self] {
        &ALL_DOMAINS
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}
