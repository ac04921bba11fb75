//! Option checks: targets, skill checks, presets, and skill sources.

use std::collections::BTreeSet;

use qw_core::{Content, Stat, StepOptions};

use crate::finding::Finding;
use crate::sites::OptionSite;

/// Option targets naming no step.
pub fn check_targets(content: &Content, sites: &[OptionSite], findings: &mut Vec<Finding>) {
    for site in sites {
        for target in site.option.targets() {
            if !content.has_step(target) {
                findings.push(Finding::error(
                    &site.subject,
                    format!(
                        "option '{}' targets unknown step '{target}'",
                        site.option.label
                    ),
                ));
            }
        }
    }
}

/// Incomplete skill checks.
pub fn check_skill_checks(sites: &[OptionSite], findings: &mut Vec<Finding>) {
    for site in sites {
        let option = &site.option;
        if option.fail.is_some() && option.check().is_none() {
            findings.push(Finding::error(
                &site.subject,
                format!(
                    "option '{}' has a fail target but no skill check",
                    option.label
                ),
            ));
        }
        if option.skill.is_some() && option.dc.is_none() {
            findings.push(Finding::error(
                &site.subject,
                format!("option '{}' names a skill but no dc", option.label),
            ));
        }
    }
}

/// References to presets that do not exist.
pub fn check_presets(content: &Content, findings: &mut Vec<Finding>) {
    let references = content
        .steps
        .iter()
        .map(|s| (s.id.clone(), s.options.as_ref()))
        .chain(
            content
                .patches
                .iter()
                .map(|p| (p.display_name(), p.options.as_ref())),
        );
    for (subject, options) in references {
        if let Some(StepOptions::Preset(name)) = options
            && !content.option_presets.contains_key(name)
        {
            findings.push(Finding::warning(
                subject,
                format!("unknown option preset '{name}'"),
            ));
        }
    }
}

/// Skill sources that are neither a stat nor a tag used anywhere.
pub fn check_skill_sources(
    sites: &[OptionSite],
    known_tags: &BTreeSet<String>,
    findings: &mut Vec<Finding>,
) {
    for site in sites {
        let Some(skill) = &site.option.skill else {
            continue;
        };
        for source in skill.names() {
            if Stat::parse(source).is_none() && !known_tags.contains(source) {
                findings.push(Finding::warning(
                    &site.subject,
                    format!(
                        "skill source '{source}' in option '{}' is neither a stat nor a known tag",
                        site.option.label
                    ),
                ));
            }
        }
    }
}
