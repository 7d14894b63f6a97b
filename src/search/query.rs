//! Search requests over a loaded index.

use super::scoring::relative_relevance;
use super::substring;
use super::terms::TermIndex;
use crate::index::{SearchIndex, same_page};
use crate::record::{Category, DocRecord, RecordId};
use rmcp::schemars;
use serde::Deserialize;
use std::fmt;

/// Default number of results returned by a search.
pub const DEFAULT_LIMIT: usize = 10;

/// How query text is matched against records.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, schemars::JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Case-insensitive substring of title or text; title matches first.
    #[default]
    Substring,
    /// Stemmed keyword search ranked by TF-IDF.
    Terms,
}

/// Where a hit matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchField {
    Title,
    Text,
    /// Keyword hit, possibly spanning title and text.
    Terms,
}

impl fmt::Display for MatchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Title => "title",
            Self::Text => "text",
            Self::Terms => "keywords",
        })
    }
}

/// One search result.
#[derive(Debug, Clone)]
pub struct SearchHit<'a> {
    pub id: RecordId,
    pub record: &'a DocRecord,
    pub field: MatchField,
    /// 0-100, for display only; ordering is decided by the search mode.
    pub relevance: u32,
}

/// A search over one index.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub text: String,
    pub mode: SearchMode,
    pub category: Option<Category>,
    /// Exact page title, compared case-insensitively.
    pub page: Option<String>,
    pub limit: usize,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mode: SearchMode::default(),
            category: None,
            page: None,
            limit: DEFAULT_LIMIT,
        }
    }

    #[must_use]
    pub const fn mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub fn page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Whether a record passes the category and page filters.
    pub fn accepts(&self, record: &DocRecord) -> bool {
        self.category.as_ref().is_none_or(|c| &record.category == c)
            && self.page.as_deref().is_none_or(|p| same_page(&record.page, p))
    }

    /// Run the query.
    ///
    /// Keyword mode uses `terms` when given and builds a throwaway keyword index
    /// otherwise.
    pub fn run<'a>(&self, index: &'a SearchIndex, terms: Option<&TermIndex>) -> Vec<SearchHit<'a>> {
        let mut hits = match self.mode {
            SearchMode::Substring => substring::scan(index, &self.text, |record| self.accepts(record)),
            SearchMode::Terms => match terms {
                Some(terms) => self.run_terms(index, terms),
                None => self.run_terms(index, &TermIndex::build(index)),
            },
        };
        hits.truncate(self.limit);
        hits
    }

    fn run_terms<'a>(&self, index: &'a SearchIndex, terms: &TermIndex) -> Vec<SearchHit<'a>> {
        if terms.fingerprint() != index.fingerprint() {
            tracing::warn!("Keyword index does not match the loaded payload; rebuilding");
            return self.run_terms(index, &TermIndex::build(index));
        }

        let scored: Vec<(&'a DocRecord, RecordId, f32)> = terms
            .search(&self.text)
            .into_iter()
            .filter_map(|(id, score)| index.get(id).map(|record| (record, id, score)))
            .filter(|(record, _, _)| self.accepts(record))
            .collect();

        let best = scored.first().map_or(0.0, |(_, _, score)| *score);
        scored
            .into_iter()
            .map(|(record, id, score)| SearchHit {
                id,
                record,
                field: MatchField::Terms,
                relevance: relative_relevance(score, best),
            })
            .collect()
    }
}
