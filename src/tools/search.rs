//! Search handler for documentation records.

use super::{describe, one_line, resolve_index};
use crate::index::deep_link;
use crate::record::Category;
use crate::search::{MatchField, SearchHit, SearchMode, SearchQuery};
use crate::state::IndexState;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;

/// Characters of body text shown per result.
const SNIPPET_CHARS: usize = 160;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchRequest {
    /// Text to look for in section titles and prose
    pub query: String,
    /// "substring" (default): case-insensitive substring, title matches first.
    /// "terms": stemmed keyword search ranked by relevance.
    #[serde(default)]
    pub mode: Option<SearchMode>,
    /// Only return records with this category (e.g. "section", "page")
    #[serde(default)]
    pub category: Option<String>,
    /// Only return records from the page with this title
    #[serde(default)]
    pub page: Option<String>,
    /// Maximum number of results to return (default: 10)
    #[serde(default)]
    pub limit: Option<usize>,
    /// Search this index file instead of the active one
    #[serde(default)]
    pub index: Option<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            mode: None,
            category: None,
            page: None,
            limit: None,
            index: None,
        }
    }
}

/// Execute a search against the requested or active index.
pub async fn handle_search(state: &Arc<IndexState>, request: SearchRequest) -> Result<String, String> {
    let loaded = resolve_index(state, request.index.as_deref()).await?;
    let index = &loaded.index;

    if let Some(page) = request.page.as_deref()
        && !index.has_page(page)
    {
        // No such page means no matching records, which is an answer, not a failure.
        let mut msg = format!(
            "No results found for '{}' in {}: there is no page '{}'.\n",
            request.query,
            describe(&loaded),
            page
        );
        let suggestions = index.suggest_pages(page);
        if suggestions.is_empty() {
            let _ = writeln!(msg, "\nAvailable pages: {}", index.page_titles().join(", "));
        } else {
            msg.push_str("\nDid you mean:\n");
            for (title, _) in suggestions.into_iter().take(5) {
                let _ = writeln!(msg, "• {}", title);
            }
        }
        return Ok(msg);
    }

    let mut query = SearchQuery::new(request.query.clone())
        .mode(request.mode.unwrap_or_default())
        .limit(request.limit.unwrap_or(state.config().default_limit));
    if let Some(category) = request.category.as_deref() {
        query = query.category(Category::from(category));
    }
    if let Some(page) = request.page.clone() {
        query = query.page(page);
    }

    let hits = match query.mode {
        SearchMode::Substring => query.run(index, None),
        SearchMode::Terms => {
            let cache_dir = state.cache_dir();
            let terms = loaded.terms(cache_dir.as_deref()).await;
            query.run(index, Some(terms))
        }
    };

    tracing::debug!("Search '{}' ({:?}) returned {} hit(s)", request.query, query.mode, hits.len());

    if hits.is_empty() {
        let mut msg = format!("No results found for '{}' in {}.\n\n", request.query, describe(&loaded));
        msg.push_str("Search tips:\n");
        msg.push_str("• Try a shorter or more general term\n");
        if query.mode == SearchMode::Substring {
            msg.push_str("• Try mode \"terms\" to match word forms: 'deconvolve' finds 'deconvolution'\n");
        }
        if query.category.is_some() || query.page.is_some() {
            msg.push_str("• Remove the category or page filter\n");
        }
        return Ok(msg);
    }

    Ok(format_search_results(
        &hits,
        &request.query,
        &describe(&loaded),
        state.config().base_url.as_deref(),
    ))
}

/// Format search results into a readable string output.
fn format_search_results(
    hits: &[SearchHit<'_>],
    query: &str,
    source: &str,
    base_url: Option<&str>,
) -> String {
    let mut output = format!("Search results for '{}' in {}:\n\n", query, source);

    for (idx, hit) in hits.iter().enumerate() {
        let record = hit.record;
        let _ = writeln!(
            output,
            "{}. {} [{}] on page '{}' - {} match, relevance: {}%",
            idx + 1,
            display_location(&record.location, record.headline()),
            record.category,
            record.page,
            hit.field,
            hit.relevance
        );

        if let Some(base_url) = base_url {
            let _ = writeln!(output, "   {}", deep_link(base_url, record));
        }

        if !record.text.is_empty() {
            let snippet = match hit.field {
                MatchField::Text => snippet_around(&record.text, query, SNIPPET_CHARS),
                MatchField::Title | MatchField::Terms => one_line(&record.text, SNIPPET_CHARS),
            };
            let _ = writeln!(output, "   {}", snippet);
        }

        output.push('\n');
    }

    output
}

fn display_location(location: &str, headline: &str) -> String {
    if location.is_empty() {
        format!("\"{}\"", one_line(headline, 60))
    } else {
        format!("`{}`", location)
    }
}

/// A window of `text` around the first case-insensitive occurrence of `query`.
fn snippet_around(text: &str, query: &str, width: usize) -> String {
    let flat: Vec<char> = text.split_whitespace().collect::<Vec<_>>().join(" ").chars().collect();
    let haystack: String = flat.iter().collect::<String>().to_lowercase();
    let needle = query.trim().to_lowercase();

    let Some(byte_pos) = haystack.find(&needle) else {
        return one_line(text, width);
    };
    // Lowercasing can change lengths; clamp rather than trust offsets exactly.
    let match_char = haystack[..byte_pos].chars().count().min(flat.len());
    let start = match_char.saturating_sub(width / 3);
    let end = (start + width).min(flat.len());

    let mut snippet: String = flat[start..end].iter().collect();
    if start > 0 {
        snippet.insert(0, '…');
    }
    if end < flat.len() {
        snippet.push('…');
    }
    snippet
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn snippet_centres_on_match() {
        let text = "a ".repeat(100) + "Wiener filter" + &" b".repeat(100);
        let snippet = snippet_around(&text, "wiener", 40);
        check!(snippet.starts_with('…'));
        check!(snippet.ends_with('…'));
        check!(snippet.contains("Wiener"));
    }

    #[test]
    fn snippet_without_match_is_the_start() {
        check!(snippet_around("short text", "absent", 40) == "short text");
    }

    #[test]
    fn page_level_records_show_their_headline() {
        check!(display_location("", "Deconvolution.jl") == "\"Deconvolution.jl\"");
        check!(display_location("#Usage", "Usage") == "`#Usage`");
    }
}
