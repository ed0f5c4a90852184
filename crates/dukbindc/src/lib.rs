pub mod c_emit;
pub mod contract;
pub mod diagnostics;
pub mod domain_config;
pub mod domain_dbus;
pub mod domain_posix;
pub mod domain_tui;
pub mod generate;
pub mod manifest;
pub mod names;
pub mod policy;
pub mod table;
pub mod types;
pub mod validate;
