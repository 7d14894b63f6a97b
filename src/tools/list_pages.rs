//! Page and section outline of an index.

use super::{describe, resolve_index};
use crate::index::deep_link;
use crate::state::IndexState;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ListPagesRequest {
    /// Only outline the page with this title
    #[serde(default)]
    pub page: Option<String>,
    /// Outline this index file instead of the active one
    #[serde(default)]
    pub index: Option<String>,
}

/// List pages with their section headings and anchors.
pub async fn handle_list_pages(
    state: &Arc<IndexState>,
    request: ListPagesRequest,
) -> Result<String, String> {
    let loaded = resolve_index(state, request.index.as_deref()).await?;
    let index = &loaded.index;
    let base_url = state.config().base_url.as_deref();

    let outline = match request.page.as_deref() {
        Some(title) => match index.page(title) {
            Some(page) => vec![page],
            None => {
                let mut msg = format!("Page '{}' not found in {}.", title, describe(&loaded));
                if let Some((best, _)) = index.suggest_pages(title).first() {
                    let _ = write!(msg, " Did you mean '{}'?", best);
                }
                return Err(msg);
            }
        },
        None => index.outline(),
    };

    let mut output = format!("Pages in {}:\n\n", describe(&loaded));
    for page in &outline {
        let _ = writeln!(
            output,
            "# {} ({} sections, {} records)",
            page.title,
            page.sections.len(),
            page.record_count()
        );
        for section in &page.sections {
            let _ = write!(output, "  • {} `{}`", section.heading.title, section.heading.location);
            if let Some(base_url) = base_url {
                let _ = write!(output, " → {}", deep_link(base_url, section.heading));
            }
            output.push('\n');
        }
        output.push('\n');
    }

    Ok(output)
}
