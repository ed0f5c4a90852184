use dukbind_contracts::DUKBIND_MANIFEST_SCHEMA_VERSION;
use dukbind_domains::DomainId;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::generate::{FnDecl, GenOutput};

/// Machine-readable summary of one generated binding artifact.
///
/// Host build tooling consumes this to decide whether the checked-in C
/// artifact for a domain is stale without re-reading the artifact itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingManifest {
    pub schema_version: String,
    pub domain: String,
    pub artifact: String,
    pub artifact_sha256: String,
    pub fn_decls: Vec<FnDecl>,
}

pub fn manifest_for(domain: DomainId, output: &GenOutput) -> BindingManifest {
    BindingManifest {
        schema_version: DUKBIND_MANIFEST_SCHEMA_VERSION.to_string(),
        domain: domain.as_str().to_string(),
        artifact: domain.artifact_file_name().to_string(),
        artifact_sha256: sha256_hex(output.c_src.as_bytes()),
        fn_decls: output.fn_decls.clone(),
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    let digest = h.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_config;

    #[test]
    fn sha256_hex_matches_known_vector() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn manifest_pins_domain_artifact_and_digest() {
        let unit = domain_config::unit_for_domain(DomainId::Tui);
        let output = crate::generate::generate_unit(&unit).unwrap();
        let manifest = manifest_for(DomainId::Tui, &output);
        assert_eq!(manifest.schema_version, DUKBIND_MANIFEST_SCHEMA_VERSION);
        assert_eq!(manifest.domain, "tui");
        assert_eq!(manifest.artifact, "dukbind_tui.c");
        assert_eq!(manifest.artifact_sha256, sha256_hex(output.c_src.as_bytes()));
        assert_eq!(manifest.fn_decls.len(), unit.functions.len());
        let json = serde_json::to_string(&manifest).unwrap();
        assert!(json.contains("\"argc\""));
        assert!(json.contains("_dukbind_initscr"));
    }
}
