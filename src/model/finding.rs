use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One occurrence reported by a static-analysis rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub id: String,
    #[serde(default = "default_severity")]
    pub severity: f64,
    #[serde(default)]
    pub location: String,
}

fn default_severity() -> f64 {
    1.0
}

impl Finding {
    pub fn new(id: impl Into<String>, severity: f64, location: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            severity,
            location: location.into(),
        }
    }
}

/// Named bucket of findings produced by one detection rule.
///
/// `findings == None` means no tool reported this rule for the project,
/// which is kept apart from a rule that ran and found nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    name: String,
    findings: Option<Vec<Finding>>,
}

impl Diagnostic {
    /// A diagnostic that has not been matched by any tool output yet.
    pub fn unmatched(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            findings: None,
        }
    }

    pub fn with_findings(name: impl Into<String>, findings: Vec<Finding>) -> Self {
        Self {
            name: name.into(),
            findings: Some(findings),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_matched(&self) -> bool {
        self.findings.is_some()
    }

    pub fn findings(&self) -> &[Finding] {
        self.findings.as_deref().unwrap_or(&[])
    }

    pub fn count(&self) -> usize {
        self.findings().len()
    }

    pub fn push(&mut self, finding: Finding) {
        self.findings.get_or_insert_with(Vec::new).push(finding);
    }

    /// Replace this diagnostic's findings with the ones from `other`.
    pub fn replace_findings(&mut self, other: &Diagnostic) {
        self.findings = Some(other.findings().to_vec());
    }

    /// Drop all findings and return to the unmatched state.
    pub fn reset(&mut self) {
        self.findings = None;
    }
}

/// Tool output keyed by diagnostic name.
pub type DiagnosticSet = BTreeMap<String, Diagnostic>;

/// Fold `incoming` into `target`; findings of same-named diagnostics are concatenated.
pub fn extend_diagnostics(target: &mut DiagnosticSet, incoming: DiagnosticSet) {
    for (name, diagnostic) in incoming {
        match target.get_mut(&name) {
            Some(existing) => {
                for f in diagnostic.findings() {
                    existing.push(f.clone());
                }
                if !existing.is_matched() && diagnostic.is_matched() {
                    existing.replace_findings(&diagnostic);
                }
            }
            None => {
                target.insert(name, diagnostic);
            }
        }
    }
}

#[cfg(test)]
#[path = "finding_test.rs"]
mod tests;
