//! Case-insensitive substring scan over titles and text.

use super::query::{MatchField, SearchHit};
use super::scoring::calculate_relevance;
use crate::index::SearchIndex;
use crate::record::DocRecord;

/// Every record whose title or text contains `needle`, ignoring case.
///
/// Title hits come first, then text hits, each in array order. A record that
/// matches in both places is reported once, as a title hit. An empty needle
/// matches nothing.
pub(crate) fn scan<'a>(
    index: &'a SearchIndex,
    needle: &str,
    accept: impl Fn(&DocRecord) -> bool,
) -> Vec<SearchHit<'a>> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut title_hits = Vec::new();
    let mut text_hits = Vec::new();

    for (id, record) in index.records().filter(|(_, record)| accept(record)) {
        if let Some(relevance) = calculate_relevance(&record.title, &needle) {
            title_hits.push(SearchHit {
                id,
                record,
                field: MatchField::Title,
                relevance,
            });
        } else if let Some(relevance) = calculate_relevance(&record.text, &needle) {
            text_hits.push(SearchHit {
                id,
                record,
                field: MatchField::Text,
                relevance,
            });
        }
    }

    title_hits.extend(text_hits);
    title_hits
}
