//! Load a search index and make it active.

use super::describe;
use crate::config::expand_tilde;
use crate::discover::resolve_index_path;
use crate::state::{IndexState, LoadedIndex};
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LoadIndexRequest {
    /// Path to search_index.js, or to a built documentation directory containing one
    pub path: String,
}

/// Load the index and make it the one later requests use by default.
pub async fn handle_load_index(
    state: &Arc<IndexState>,
    request: LoadIndexRequest,
) -> Result<String, String> {
    let expanded = expand_tilde(&request.path);
    let path: PathBuf = resolve_index_path(Path::new(expanded.as_ref()))
        .map_err(|e| format!("Failed to load index: {:#}", e))?;

    let loaded = state.activate(&path).await?;
    Ok(format_response(&loaded))
}

/// Summary of a freshly loaded index.
pub fn format_response(loaded: &LoadedIndex) -> String {
    let index = &loaded.index;
    let report = index.validate();

    let mut output = format!("Loaded search index {}\n\n", describe(loaded));
    let _ = writeln!(output, "Records: {}", report.records);
    let _ = writeln!(output, "Pages: {}", report.pages);
    for (category, count) in &report.categories {
        let _ = writeln!(output, "  {}: {}", category, count);
    }

    if !report.malformed.is_empty() {
        let _ = writeln!(
            output,
            "\n⚠ {} malformed entr{} will not show up in searches (run validate_index for details)",
            report.malformed.len(),
            if report.malformed.len() == 1 { "y" } else { "ies" }
        );
    }
    if !report.duplicate_locations.is_empty() {
        let _ = writeln!(
            output,
            "\n⚠ {} location(s) are used more than once on the same page",
            report.duplicate_locations.len()
        );
    }

    output
}
