//! Every place in the content that carries options or tags.

use qw_core::{ChoiceOption, Content, StepOptions};

/// An authored option and where it lives.
#[derive(Debug, Clone)]
pub struct OptionSite {
    /// Step id, patch name, or `preset '<name>'`.
    pub subject: String,
    /// The expanded option.
    pub option: ChoiceOption,
}

/// Options written inline on steps and patches, plus every preset entry.
///
/// Preset references are not expanded, so each authored option appears once.
pub fn option_sites(content: &Content) -> Vec<OptionSite> {
    let mut sites = Vec::new();
    let mut push_inline = |subject: &str, options: Option<&StepOptions>| {
        if let Some(StepOptions::Inline(entries)) = options {
            sites.extend(entries.iter().map(|e| OptionSite {
                subject: subject.to_string(),
                option: e.to_choice(),
            }));
        }
    };
    for step in &content.steps {
        push_inline(&step.id, step.options.as_ref());
    }
    for patch in &content.patches {
        push_inline(&patch.display_name(), patch.options.as_ref());
    }
    for (name, entries) in &content.option_presets {
        sites.extend(entries.iter().map(|e| OptionSite {
            subject: format!("preset '{name}'"),
            option: e.to_choice(),
        }));
    }
    sites
}

/// Raw tag lists of every step, patch, and authored option, with subjects.
pub fn tag_sites(content: &Content) -> Vec<(String, Vec<String>)> {
    let steps = content
        .steps
        .iter()
        .map(|s| (s.id.clone(), s.tags.clone()));
    let patches = content
        .patches
        .iter()
        .map(|p| (p.display_name(), p.tags.clone()));
    let options = option_sites(content)
        .into_iter()
        .map(|site| (site.subject, site.option.tags));
    steps.chain(patches).chain(options).collect()
}
