//! In-memory search index: the ordered entries of one payload.
//!
//! A [`SearchIndex`] is built once from a payload and never mutated. A rebuild
//! of the documentation produces a new payload, which is loaded as a new index.

pub mod pages;
pub mod payload;
pub mod validate;

pub use pages::{PageOutline, Section, deep_link};
pub use payload::{Binding, Layout};
pub use validate::{DuplicateLocation, ValidationReport};

use crate::error::LoadError;
use crate::fingerprint::Fingerprint;
use crate::record::{DocRecord, Entry, RecordId};
use std::path::{Path, PathBuf};

/// A loaded search-index payload.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    path: Option<PathBuf>,
    fingerprint: Fingerprint,
    binding: Option<Binding>,
    layout: Layout,
    entries: Vec<Entry>,
}

impl SearchIndex {
    /// Parse an index from payload text.
    pub fn parse(source: &str) -> Result<Self, LoadError> {
        let payload = payload::parse(source)?;
        Ok(Self {
            path: None,
            fingerprint: Fingerprint::of_bytes(source.as_bytes()),
            binding: payload.binding,
            layout: payload.layout,
            entries: payload.entries,
        })
    }

    /// Read and parse a payload file.
    pub async fn load(path: &Path) -> Result<Self, LoadError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LoadError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                LoadError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let source = String::from_utf8(bytes).map_err(|e| LoadError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;

        let start = std::time::Instant::now();
        let mut index = Self::parse(&source)?;
        index.path = Some(path.to_path_buf());

        tracing::info!(
            "Loaded search index {} ({} records, {} malformed) in {:?}",
            path.display(),
            index.record_count(),
            index.malformed_count(),
            start.elapsed()
        );

        Ok(index)
    }

    /// File the index was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub const fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    pub const fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }

    /// Every array element, valid or not, in original order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Valid records with their array positions, in original order.
    pub fn records(&self) -> impl Iterator<Item = (RecordId, &DocRecord)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(id, entry)| entry.record().map(|record| (id, record)))
    }

    pub fn get(&self, id: RecordId) -> Option<&DocRecord> {
        self.entries.get(id).and_then(Entry::record)
    }

    pub fn record_count(&self) -> usize {
        self.records().count()
    }

    pub fn malformed_count(&self) -> usize {
        self.entries.len() - self.record_count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a deep-link target.
    ///
    /// `location` is matched exactly. When `page` is given only that page
    /// (compared case-insensitively) is considered; otherwise the first record
    /// with the location wins. An empty location matches page-level prose, so
    /// it resolves to the first such record rather than the page's heading.
    pub fn find(&self, page: Option<&str>, location: &str) -> Option<(RecordId, &DocRecord)> {
        self.records().find(|(_, record)| {
            record.location == location && page.is_none_or(|p| same_page(&record.page, p))
        })
    }

    /// Distinct page titles in first-appearance order.
    pub fn page_titles(&self) -> Vec<&str> {
        let mut seen = ahash::AHashSet::new();
        self.records()
            .map(|(_, record)| record.page.as_str())
            .filter(|page| seen.insert(*page))
            .collect()
    }

    /// Whether a page with this title exists (case-insensitive).
    pub fn has_page(&self, title: &str) -> bool {
        self.records().any(|(_, record)| same_page(&record.page, title))
    }

    /// Re-emit the payload text.
    pub fn to_js(&self) -> String {
        payload::emit(self.binding.as_ref(), self.layout, &self.entries)
    }

    /// Re-emit the payload under the generator's own binding, whatever the input framing.
    pub fn to_documenter_js(&self) -> String {
        payload::emit(Some(&Binding::documenter()), Layout::Wrapped, &self.entries)
    }
}

/// Page titles compare case-insensitively.
pub(crate) fn same_page(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Category;
    use assert2::{check, let_assert};

    const SMALL: &str = r##"var documenterSearchIndex = {"docs":
[{"location":"#Usage","page":"Guide","title":"Usage","text":"","category":"section"},{"location":"","page":"Guide","title":"Guide","text":"Call it.","category":"page"},{"location":"#Usage","page":"Reference","title":"Usage","text":"","category":"section"},{"page":"Broken"}]
}
"##;

    #[test]
    fn records_skip_malformed_entries() {
        let index = SearchIndex::parse(SMALL).unwrap();
        check!(index.entries().len() == 4);
        check!(index.record_count() == 3);
        check!(index.malformed_count() == 1);
        check!(index.get(3).is_none());
        check!(index.get(1).map(|r| r.category.clone()) == Some(Category::Page));
    }

    #[test]
    fn find_respects_page_filter() {
        let index = SearchIndex::parse(SMALL).unwrap();
        let_assert!(Some((id, record)) = index.find(Some("reference"), "#Usage"));
        check!(id == 2);
        check!(record.page == "Reference");

        let_assert!(Some((first, _)) = index.find(None, "#Usage"));
        check!(first == 0);
        check!(index.find(None, "#Missing").is_none());
    }

    #[test]
    fn page_titles_in_first_appearance_order() {
        let index = SearchIndex::parse(SMALL).unwrap();
        check!(index.page_titles() == vec!["Guide", "Reference"]);
        check!(index.has_page("GUIDE"));
        check!(!index.has_page("Broken"));
    }

    #[test]
    fn re_emits_malformed_entries_in_place() {
        let index = SearchIndex::parse(SMALL).unwrap();
        check!(index.to_js() == SMALL);
    }

    #[test]
    fn documenter_framing_wraps_bare_arrays() {
        let index =
            SearchIndex::parse(r#"[{"location":"","page":"A","title":"","text":"","category":"page"}]"#)
                .unwrap();
        check!(index.to_documenter_js().starts_with("var documenterSearchIndex = {\"docs\":\n["));
        check!(index.to_js().starts_with('['));
    }

    #[tokio::test]
    async fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let_assert!(
            Err(LoadError::NotFound { .. }) = SearchIndex::load(&dir.path().join("nope.js")).await
        );
    }
}
