use dukbind_contracts::DUKBIND_DIAG_SCHEMA_VERSION;
use serde::Serialize;

use crate::generate::{GenError, GenErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Validate,
    Emit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: String,
    pub severity: Severity,
    pub stage: Stage,
    pub message: String,
}

impl Diagnostic {
    pub fn from_gen_error(err: &GenError) -> Self {
        let (code, stage) = match err.kind {
            GenErrorKind::UnknownType => ("DUKBIND-VAL-0001", Stage::Validate),
            GenErrorKind::UnknownPolicy => ("DUKBIND-VAL-0002", Stage::Validate),
            GenErrorKind::UnsupportedCapability => ("DUKBIND-VAL-0003", Stage::Validate),
            GenErrorKind::MalformedContract => ("DUKBIND-VAL-0004", Stage::Validate),
            GenErrorKind::Internal => ("DUKBIND-GEN-0001", Stage::Emit),
        };
        Self {
            code: code.to_string(),
            severity: Severity::Error,
            stage,
            message: err.message.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub schema_version: String,
    pub ok: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn ok() -> Self {
        Self {
            schema_version: DUKBIND_DIAG_SCHEMA_VERSION.to_string(),
            ok: true,
            diagnostics: Vec::new(),
        }
    }

    pub fn with_diagnostics(mut self, mut diagnostics: Vec<Diagnostic>) -> Self {
        diagnostics.sort_by(|a, b| {
            a.code
                .cmp(&b.code)
                .then_with(|| a.message.cmp(&b.message))
        });
        self.ok = diagnostics.iter().all(|d| d.severity != Severity::Error);
        self.diagnostics = diagnostics;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gen_error_maps_to_stable_codes() {
        let cases = [
            (GenErrorKind::UnknownType, "DUKBIND-VAL-0001"),
            (GenErrorKind::UnknownPolicy, "DUKBIND-VAL-0002"),
            (GenErrorKind::UnsupportedCapability, "DUKBIND-VAL-0003"),
            (GenErrorKind::MalformedContract, "DUKBIND-VAL-0004"),
            (GenErrorKind::Internal, "DUKBIND-GEN-0001"),
        ];
        for (kind, code) in cases {
            let diag = Diagnostic::from_gen_error(&GenError::new(kind, "boom".to_string()));
            assert_eq!(diag.code, code);
            assert_eq!(diag.severity, Severity::Error);
        }
    }

    #[test]
    fn report_json_uses_lowercase_tags() {
        let report = Report::ok().with_diagnostics(vec![Diagnostic::from_gen_error(
            &GenError::new(GenErrorKind::UnknownType, "posix: unknown type".to_string()),
        )]);
        assert!(!report.ok);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"severity\":\"error\""));
        assert!(json.contains("\"stage\":\"validate\""));
        assert!(json.contains(DUKBIND_DIAG_SCHEMA_VERSION));
    }

    #[test]
    fn diagnostics_sort_by_code_then_message() {
        let report = Report::ok().with_diagnostics(vec![
            Diagnostic::from_gen_error(&GenError::new(
                GenErrorKind::Internal,
                "z last".to_string(),
            )),
            Diagnostic::from_gen_error(&GenError::new(
                GenErrorKind::UnknownType,
                "b second".to_string(),
            )),
            Diagnostic::from_gen_error(&GenError::new(
                GenErrorKind::UnknownType,
                "a first".to_string(),
            )),
        ]);
        let codes: Vec<&str> = report.diagnostics.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(
            codes,
            ["DUKBIND-GEN-0001", "DUKBIND-VAL-0001", "DUKBIND-VAL-0001"]
        );
        assert_eq!(report.diagnostics[1].message, "a first");
    }
}
