//! Read the prose under one section heading.

use super::{describe, resolve_index};
use crate::index::deep_link;
use crate::state::IndexState;
use rapidfuzz::distance::jaro_winkler;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReadSectionRequest {
    /// Anchor of the section heading, e.g. "#Usage". Empty reads the page introduction.
    pub location: String,
    /// Title of the page the section is on (required when the anchor is ambiguous or empty)
    #[serde(default)]
    pub page: Option<String>,
    /// Read from this index file instead of the active one
    #[serde(default)]
    pub index: Option<String>,
}

/// Return a section heading with the body records that follow it.
pub async fn handle_read_section(
    state: &Arc<IndexState>,
    request: ReadSectionRequest,
) -> Result<String, String> {
    let loaded = resolve_index(state, request.index.as_deref()).await?;
    let index = &loaded.index;
    let page = request.page.as_deref();

    if request.location.is_empty() {
        let Some(title) = page else {
            return Err("An empty location reads a page introduction; give the page title too.".to_string());
        };
        let outline = index
            .page(title)
            .ok_or_else(|| format!("Page '{}' not found in {}.", title, describe(&loaded)))?;
        let intro: Vec<&str> = outline
            .intro
            .iter()
            .map(|(_, record)| record.text.as_str())
            .filter(|text| !text.is_empty())
            .collect();
        return Ok(format!("# {}\n\n{}\n", outline.title, intro.join("\n\n")));
    }

    let Some(section) = index.section(page, &request.location) else {
        // Not a heading: maybe a plain record with that anchor.
        if let Some((_, record)) = index.find(page, &request.location) {
            return Ok(format!("# {}\n\n{}\n", record.headline(), record.text));
        }
        return Err(not_found_message(&loaded.index, &request.location, &describe(&loaded)));
    };

    let mut output = format!("# {}\n", section.heading.title);
    let _ = writeln!(output, "Page: {}", section.heading.page);
    if let Some(base_url) = state.config().base_url.as_deref() {
        let _ = writeln!(output, "Link: {}", deep_link(base_url, section.heading));
    }
    output.push('\n');

    let body = section.body_text();
    if body.is_empty() {
        output.push_str("(This section has no prose of its own.)\n");
    } else {
        output.push_str(&body);
        output.push('\n');
    }

    Ok(output)
}

/// Unknown anchor: offer the closest section anchors.
fn not_found_message(index: &crate::index::SearchIndex, location: &str, source: &str) -> String {
    let wanted = location.trim_start_matches('#').to_lowercase();
    let mut candidates: Vec<(f64, &str)> = index
        .records()
        .filter(|(_, record)| record.category.is_heading())
        .map(|(_, record)| {
            let anchor = record.location.trim_start_matches('#').to_lowercase();
            (
                jaro_winkler::similarity(wanted.chars(), anchor.chars()),
                record.location.as_str(),
            )
        })
        .filter(|(score, _)| *score > 0.8)
        .collect();
    candidates.sort_by(|(a, _), (b, _)| b.total_cmp(a));

    let mut msg = format!("Location '{}' not found in {}.", location, source);
    if !candidates.is_empty() {
        msg.push_str("\n\nDid you mean:\n");
        for (_, anchor) in candidates.into_iter().take(5) {
            let _ = writeln!(msg, "• {}", anchor);
        }
    }
    msg
}
