use std::path::Path;

use colored::Colorize;

use qw_lint::{Severity, lint, tally};

use super::plural;

pub fn run(path: &Path, deny_warnings: bool, as_json: bool) -> Result<(), String> {
    let content = super::load(path)?;
    let mut findings = lint(&content);
    findings.sort_by_key(|f| f.severity);
    let (errors, warnings) = tally(&findings);

    if as_json {
        let rendered = serde_json::to_string_pretty(&findings)
            .map_err(|e| format!("JSON serialization error: {e}"))?;
        println!("{rendered}");
        return verdict(errors, warnings, deny_warnings);
    }

    for finding in &findings {
        let level = match finding.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow(),
        };
        println!("  {level}: {}: {}", finding.subject.bold(), finding.message);
    }

    if findings.is_empty() {
        println!("  No problems found in '{}'.", path.display());
    } else {
        println!(
            "  {}, {}",
            plural(errors, "error", "errors"),
            plural(warnings, "warning", "warnings")
        );
    }

    verdict(errors, warnings, deny_warnings)
}

fn verdict(errors: usize, warnings: usize, deny_warnings: bool) -> Result<(), String> {
    if errors > 0 {
        Err("lint failed with errors".into())
    } else if deny_warnings && warnings > 0 {
        Err("lint failed with warnings (--deny-warnings)".into())
    } else {
        Ok(())
    }
}
