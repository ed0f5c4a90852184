use dukbind_domains::ALL_DOMAINS;
use dukbindc::domain_config;
use dukbindc::generate;
use dukbindc::manifest;

#[test]
fn identical_tables_produce_identical_artifacts() {
    for domain in ALL_DOMAINS {
        let first = generate::generate_unit(&domain_config::unit_for_domain(domain))
            .unwrap_or_else(|err| panic!("generate {domain}: {}", err.message));
        let second = generate::generate_unit(&domain_config::unit_for_domain(domain))
            .unwrap_or_else(|err| panic!("generate {domain}: {}", err.message));

        assert_eq!(
            first.c_src, second.c_src,
            "artifact for {domain} must be byte-stable across runs"
        );
        assert_eq!(first.fn_decls, second.fn_decls);
        assert_eq!(
            manifest::manifest_for(domain, &first),
            manifest::manifest_for(domain, &second)
        );
    }
}

#[test]
fn registration_follows_table_order() {
    for domain in ALL_DOMAINS {
        let unit = domain_config::unit_for_domain(domain);
        let output = generate::generate_unit(&unit)
            .unwrap_or_else(|err| panic!("generate {domain}: {}", err.message));

        let table_names: Vec<&str> = unit.functions.iter().map(|(name, _)| name).collect();
        let decl_names: Vec<&str> = output.fn_decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(decl_names, table_names);

        let mut sorted = decl_names.clone();
        sorted.sort_unstable();
        assert_eq!(
            decl_names, sorted,
            "{domain} registration must be lexicographic"
        );
    }
}

#[test]
fn manifest_digest_tracks_artifact_bytes() {
    for domain in ALL_DOMAINS {
        let output = generate::generate_unit(&domain_config::unit_for_domain(domain))
            .unwrap_or_else(|err| panic!("generate {domain}: {}", err.message));
        let manifest = manifest::manifest_for(domain, &output);
        assert_eq!(
            manifest.artifact_sha256,
            manifest::sha256_hex(output.c_src.as_bytes())
        );
        assert_eq!(manifest.artifact, domain.artifact_file_name());
    }
}
