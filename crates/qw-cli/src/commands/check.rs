use std::path::Path;

use colored::Colorize;
use serde_json::json;

use qw_core::Content;

use super::plural;

pub fn run(path: &Path, as_json: bool) -> Result<(), String> {
    if as_json {
        return run_json(path);
    }

    let content = super::load(path)?;

    for warning in content.warnings() {
        println!("  {}: {warning}", "warning".yellow());
    }

    println!("  Loaded '{}'.", path.display());
    println!(
        "  {}, {}, {}, {}",
        plural(content.steps.len(), "step", "steps"),
        plural(content.step_ids().len(), "location", "locations"),
        plural(content.patches.len(), "patch", "patches"),
        plural(content.option_presets.len(), "preset", "presets"),
    );
    if let Some(start) = content.start_location() {
        println!("  Start: {start}");
    }

    Ok(())
}

/// Print a summary document, or the `{"error": ...}` document on failure.
fn run_json(path: &Path) -> Result<(), String> {
    let (document, failed) = match Content::from_path(path) {
        Ok(content) => {
            let warnings: Vec<String> = content.warnings().iter().map(|w| w.to_string()).collect();
            let summary = json!({
                "steps": content.steps.len(),
                "locations": content.step_ids(),
                "patches": content.patches.len(),
                "presets": content.option_presets.len(),
                "start": content.start_location(),
                "warnings": warnings,
            });
            (summary, false)
        }
        Err(e) => (e.error_document(), true),
    };

    let rendered = serde_json::to_string_pretty(&document)
        .map_err(|e| format!("JSON serialization error: {e}"))?;
    println!("{rendered}");

    if failed {
        Err("content failed to load".into())
    } else {
        Ok(())
    }
}
