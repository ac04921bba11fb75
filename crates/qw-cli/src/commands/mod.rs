pub mod check;
pub mod graph;
pub mod lint;
pub mod play;
pub mod roll;
pub mod steps;

use std::path::Path;

use qw_core::Content;

/// Load a content bundle, turning load errors into CLI messages.
fn load(path: &Path) -> Result<Content, String> {
    let content = Content::from_path(path).map_err(|e| e.to_string())?;
    tracing::debug!(
        path = %path.display(),
        steps = content.steps.len(),
        patches = content.patches.len(),
        "loaded content"
    );
    Ok(content)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}
