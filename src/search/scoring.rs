//! Display relevance for search hits.

/// Calculate simple text relevance score, ignoring case.
///
/// Returns a score based on how well the query matches the text:
/// - 100: Exact match
/// - 50: Text starts with query
/// - 10: Text contains query
/// - None: No match
///
/// `query` must already be lowercase.
pub fn calculate_relevance(text: &str, query: &str) -> Option<u32> {
    let text = text.to_lowercase();
    if text == query {
        Some(100)
    } else if text.starts_with(query) {
        Some(50)
    } else if text.contains(query) {
        Some(10)
    } else {
        None
    }
}

/// Scale a keyword score to a percentage of the best score in the result set.
pub fn relative_relevance(score: f32, best: f32) -> u32 {
    if best <= 0.0 {
        return 0;
    }
    ((score / best) * 100.0).round().clamp(0.0, 100.0) as u32
}
