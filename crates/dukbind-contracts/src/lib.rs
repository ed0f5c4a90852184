//! Shared, version-pinned protocol identifiers.
//!
//! These constants are the single source of truth for schema/version strings
//! that appear in machine-readable I/O produced by the dukbind toolchain.

pub const DUKBINDC_REPORT_SCHEMA_VERSION: &str = "dukbindc.report@0.1.0";
pub const DUKBIND_DIAG_SCHEMA_VERSION: &str = "dukbind.diag@0.1.0";
pub const DUKBIND_MANIFEST_SCHEMA_VERSION: &str = "dukbind.manifest@0.1.0";
