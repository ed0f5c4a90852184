use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use dukbind_contracts::DUKBINDC_REPORT_SCHEMA_VERSION;
use dukbind_domains::DomainId;
use dukbindc::diagnostics;
use dukbindc::domain_config;
use dukbindc::generate;
use dukbindc::manifest;
use dukbindc::validate;

#[derive(Parser)]
#[command(name = "dukbindc")]
#[command(about = "Duktape binding generator (contract tables -> C).", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Generate the C binding artifact for one domain.
    Gen {
        #[arg(long, value_enum)]
        domain: DomainId,
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, value_name = "PATH")]
        emit_manifest: Option<PathBuf>,
        #[arg(long)]
        report_json: bool,
    },
    /// Validate one domain's binding tables without emitting anything.
    Check {
        #[arg(long, value_enum)]
        domain: DomainId,
        #[arg(long)]
        report_json: bool,
    },
    /// List known domains and their artifact file names.
    Domains,
}

#[derive(Debug, Serialize)]
struct DukbindcToolReport {
    schema_version: &'static str,
    command: &'static str,
    ok: bool,
    domain: String,
    diagnostics_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    diagnostics: Vec<diagnostics::Diagnostic>,
    exit_code: u8,
}

fn main() -> std::process::ExitCode {
    match try_main() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            std::process::ExitCode::from(2)
        }
    }
}

fn try_main() -> Result<std::process::ExitCode> {
    let cli = Cli::parse();

    match cli.cmd {
        Cmd::Gen {
            domain,
            out,
            emit_manifest,
            report_json,
        } => {
            let unit = domain_config::unit_for_domain(domain);

            let findings = validate::validate_unit(&unit);
            if !findings.is_empty() {
                if report_json {
                    let diagnostics: Vec<diagnostics::Diagnostic> = findings
                        .iter()
                        .map(diagnostics::Diagnostic::from_gen_error)
                        .collect();
                    let report = DukbindcToolReport {
                        schema_version: DUKBINDC_REPORT_SCHEMA_VERSION,
                        command: "gen",
                        ok: false,
                        domain: domain.as_str().to_string(),
                        diagnostics_count: diagnostics.len(),
                        diagnostics,
                        exit_code: 2,
                    };
                    print_json(&report)?;
                    return Ok(std::process::ExitCode::from(2));
                }
                anyhow::bail!(
                    "generate {}: {} validation findings; first: {}",
                    domain,
                    findings.len(),
                    findings[0].message
                );
            }

            let output = match generate::generate_unit(&unit) {
                Ok(output) => output,
                Err(err) => {
                    if report_json {
                        let report = DukbindcToolReport {
                            schema_version: DUKBINDC_REPORT_SCHEMA_VERSION,
                            command: "gen",
                            ok: false,
                            domain: domain.as_str().to_string(),
                            diagnostics_count: 1,
                            diagnostics: vec![diagnostics::Diagnostic::from_gen_error(&err)],
                            exit_code: 2,
                        };
                        print_json(&report)?;
                        return Ok(std::process::ExitCode::from(2));
                    }
                    return Err(anyhow::anyhow!(
                        "generate {}: {:?}: {}",
                        domain,
                        err.kind,
                        err.message
                    ));
                }
            };

            match out {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)
                            .with_context(|| format!("create output dir: {}", parent.display()))?;
                    }
                    std::fs::write(&path, output.c_src.as_bytes())
                        .with_context(|| format!("write: {}", path.display()))?;
                }
                None => {
                    print!("{}", output.c_src);
                }
            }

            if let Some(path) = emit_manifest {
                let manifest = manifest::manifest_for(domain, &output);
                write_json_file(&path, &manifest)
                    .with_context(|| format!("write manifest: {}", path.display()))?;
            }

            if report_json {
                let report = DukbindcToolReport {
                    schema_version: DUKBINDC_REPORT_SCHEMA_VERSION,
                    command: "gen",
                    ok: true,
                    domain: domain.as_str().to_string(),
                    diagnostics_count: 0,
                    diagnostics: Vec::new(),
                    exit_code: 0,
                };
                print_json(&report)?;
            }

            Ok(std::process::ExitCode::SUCCESS)
        }
        Cmd::Check {
            domain,
            report_json,
        } => {
            let unit = domain_config::unit_for_domain(domain);
            let diagnostics: Vec<diagnostics::Diagnostic> = validate::validate_unit(&unit)
                .iter()
                .map(diagnostics::Diagnostic::from_gen_error)
                .collect();
            let report = diagnostics::Report::ok().with_diagnostics(diagnostics);

            if report_json {
                let tool_report = DukbindcToolReport {
                    schema_version: DUKBINDC_REPORT_SCHEMA_VERSION,
                    command: "check",
                    ok: report.ok,
                    domain: domain.as_str().to_string(),
                    diagnostics_count: report.diagnostics.len(),
                    diagnostics: report.diagnostics,
                    exit_code: if report.ok { 0 } else { 1 },
                };
                print_json(&tool_report)?;
                return Ok(std::process::ExitCode::from(tool_report.exit_code));
            }

            let out = serde_json::to_string(&report)?;
            println!("{out}");
            Ok(if report.ok {
                std::process::ExitCode::SUCCESS
            } else {
                std::process::ExitCode::from(1)
            })
        }
        Cmd::Domains => {
            for domain in dukbind_domains::ALL_DOMAINS {
                println!("{}\t{}", domain.as_str(), domain.artifact_file_name());
            }
            Ok(std::process::ExitCode::SUCCESS)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

fn write_json_file(path: &Path, value: &impl Serialize) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir: {}", parent.display()))?;
    }

    let out = serde_json::to_string_pretty(value)? + "\n";
    std::fs::write(path, out.as_bytes()).with_context(|| format!("write: {}", path.display()))?;
    Ok(())
}
