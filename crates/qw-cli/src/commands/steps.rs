use std::path::Path;

use comfy_table::{ContentArrangement, Table};

use qw_core::StepOptions;

const TEXT_WIDTH: usize = 48;

pub fn run(path: &Path, location: Option<&str>) -> Result<(), String> {
    let content = super::load(path)?;
    let filter = location.map(|l| content.resolve_location(l));

    let steps: Vec<_> = content
        .steps
        .iter()
        .filter(|s| filter.is_none_or(|id| s.id == id))
        .collect();

    if steps.is_empty() {
        println!("  No steps found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Signature", "Kind", "Options", "Text"]);

    for step in &steps {
        let signature = step.signature_key();
        let kind = if step.is_virtual() {
            "virtual"
        } else {
            "coordinate"
        };
        let options = match &step.options {
            Some(StepOptions::Preset(name)) => format!("preset '{name}'"),
            _ => content.options_for(step).len().to_string(),
        };
        table.add_row(vec![
            step.id.clone(),
            if signature.is_empty() {
                "-".to_string()
            } else {
                signature
            },
            kind.to_string(),
            options,
            truncate(&step.text),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {}", super::plural(steps.len(), "step variant", "step variants"));

    Ok(())
}

fn truncate(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() > TEXT_WIDTH {
        let cut: String = line.chars().take(TEXT_WIDTH - 3).collect();
        format!("{cut}...")
    } else if line.is_empty() {
        "-".to_string()
    } else {
        line.to_string()
    }
}
