//! Interpolation variable checks.

use std::collections::{BTreeMap, BTreeSet};

use qw_core::{Content, Stat, VarDefs};
use qw_engine::placeholders;

use crate::finding::Finding;
use crate::sites::OptionSite;

/// Placeholders always resolvable from player state.
const BUILTINS: [&str; 2] = ["experience", "steps"];

/// A declared variable and every name it binds.
struct Declaration {
    subject: String,
    binds: BTreeSet<String>,
}

fn declarations(content: &Content) -> BTreeMap<String, Declaration> {
    let mut declared: BTreeMap<String, Declaration> = BTreeMap::new();
    let defs = content
        .steps
        .iter()
        .map(|s| (s.id.clone(), Some(&s.vars)))
        .chain(
            content
                .patches
                .iter()
                .map(|p| (p.display_name(), p.vars.as_ref())),
        );
    for (subject, vars) in defs {
        for (name, candidates) in vars.into_iter().flat_map(VarDefs::iter) {
            let Some(candidates) = candidates else {
                continue;
            };
            let entry = declared
                .entry(name.clone())
                .or_insert_with(|| Declaration {
                    subject: subject.clone(),
                    binds: BTreeSet::new(),
                });
            entry.binds.insert(name.clone());
            for fields in candidates.iter().filter_map(|c| c.as_object()) {
                for field in fields.keys() {
                    entry.binds.insert(format!("{name}.{field}"));
                    entry.binds.insert(field.clone());
                }
            }
        }
    }
    declared
}

/// Every text that is interpolated, with its subject.
fn texts<'a>(content: &'a Content, sites: &'a [OptionSite]) -> Vec<(String, &'a str)> {
    let mut out = Vec::new();
    for step in &content.steps {
        out.push((step.id.clone(), step.text.as_str()));
        if let Some(log) = &step.log {
            out.push((step.id.clone(), log.as_str()));
        }
    }
    for patch in &content.patches {
        let fields = [&patch.prepend, &patch.append, &patch.replace, &patch.log];
        for text in fields.into_iter().flatten() {
            out.push((patch.display_name(), text.as_str()));
        }
    }
    for site in sites {
        out.push((site.subject.clone(), site.option.label.as_str()));
    }
    out
}

/// Placeholders nothing defines, and declared variables nothing reads.
pub fn check_variables(content: &Content, sites: &[OptionSite], findings: &mut Vec<Finding>) {
    let declared = declarations(content);
    let defined: BTreeSet<&str> = declared
        .values()
        .flat_map(|d| d.binds.iter().map(String::as_str))
        .collect();

    let mut used = BTreeSet::new();
    for (subject, text) in texts(content, sites) {
        for name in placeholders(text) {
            let known = defined.contains(name.as_str())
                || Stat::parse(&name).is_some()
                || BUILTINS.contains(&name.as_str());
            if !known {
                findings.push(Finding::warning(
                    &subject,
                    format!("placeholder '{{{{{name}}}}}' is never defined; it renders empty"),
                ));
            }
            used.insert(name);
        }
    }

    for (name, declaration) in &declared {
        if !declaration.binds.iter().any(|b| used.contains(b)) {
            findings.push(Finding::warning(
                &declaration.subject,
                format!("variable '{name}' is never used"),
            ));
        }
    }
}
