//! Patch checks.

use qw_core::{Content, ContentWarning};

use crate::finding::Finding;

/// Load-time warnings, reported as findings.
pub fn check_load_warnings(content: &Content, findings: &mut Vec<Finding>) {
    for warning in content.warnings() {
        let subject = match warning {
            ContentWarning::UnknownPatchTarget { patch, .. } => patch.clone(),
        };
        findings.push(Finding::warning(subject, warning.to_string()));
    }
}

/// Patches setting `replace` alongside `prepend` or `append`.
pub fn check_text_conflicts(content: &Content, findings: &mut Vec<Finding>) {
    for patch in content.patches.iter().filter(|p| p.has_text_conflict()) {
        findings.push(Finding::warning(
            patch.display_name(),
            "sets replace together with prepend/append; replace wins",
        ));
    }
}
