//! Static checks over Questweave content.
//!
//! [`lint`] runs every check and returns the findings in check order.
//! Errors mean the content is broken; warnings mean it plays but probably
//! not as intended. Nothing here affects runtime behavior.

/// Reachability and transition checks.
pub mod flow;
/// Lint findings and severities.
pub mod finding;
/// Option checks.
pub mod options;
/// Patch checks.
pub mod patches;
/// Option and tag sites across the content.
pub mod sites;
/// Tag vocabulary checks.
pub mod tags;
/// Interpolation variable checks.
pub mod vars;

pub use finding::{Finding, Severity};

use qw_core::{Content, StepGraph};

use crate::sites::{option_sites, tag_sites};
use crate::tags::TagUsage;

/// Run every check against `content`.
pub fn lint(content: &Content) -> Vec<Finding> {
    let mut findings = Vec::new();
    let options = option_sites(content);
    let tag_lists = tag_sites(content);
    let usage = TagUsage::collect(&tag_lists, &options);
    let graph = StepGraph::build(content);

    patches::check_load_warnings(content, &mut findings);
    options::check_targets(content, &options, &mut findings);
    options::check_skill_checks(&options, &mut findings);
    options::check_presets(content, &mut findings);
    options::check_skill_sources(&options, &usage.names, &mut findings);
    patches::check_text_conflicts(content, &mut findings);
    vars::check_variables(content, &options, &mut findings);
    flow::check_orphans(&graph, &mut findings);
    flow::check_dead_transitions(&graph, &mut findings);
    flow::check_duplicate_signatures(content, &mut findings);
    tags::check_progress_gates(&usage, &mut findings);
    tags::check_near_duplicates(&usage, &mut findings);
    tags::check_comparisons(content, &tag_lists, &mut findings);

    findings
}

/// Counts of errors and warnings.
pub fn tally(findings: &[Finding]) -> (usize, usize) {
    let errors = findings.iter().filter(|f| f.is_error()).count();
    (errors, findings.len() - errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_content_has_no_findings() {
        let content = Content::from_json(
            r#"{ "config": {}, "steps": [
                { "id": "A1", "text": "Square.", "options": ["Smithy::smithy"] },
                { "id": "smithy", "tags": ["!has_key", "+has_key"], "options": ["Back::A1"] },
                { "id": "smithy", "tags": ["@has_key"], "text": "Again.", "options": ["Back::A1"] }
            ] }"#,
        )
        .unwrap();
        assert_eq!(lint(&content), Vec::<Finding>::new());
    }

    #[test]
    fn broken_content_reports_errors() {
        let content = Content::from_json(
            r#"{ "config": {}, "steps": [
                { "id": "A1", "options": [
                    "Nowhere::void",
                    { "label": "Leap", "pass": "A1", "fail": "A1" }
                ] }
            ] }"#,
        )
        .unwrap();
        let findings = lint(&content);
        assert_eq!(tally(&findings), (2, 0));
    }
}
