//! Data-shape checks over a loaded index.
//!
//! Nothing here rejects an index. The report lists what a consumer would find
//! unsearchable or ambiguous.

use super::SearchIndex;
use crate::record::{Entry, Malformed, RecordId};
use ahash::AHashMap;
use std::collections::BTreeMap;
use std::fmt;

/// A non-empty location used more than once on the same page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateLocation {
    pub page: String,
    pub location: String,
    pub ids: Vec<RecordId>,
}

/// Result of checking an index against the record invariants.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub entries: usize,
    pub records: usize,
    pub pages: usize,
    /// Entries that cannot be read as records, by array position.
    pub malformed: Vec<(RecordId, Malformed)>,
    pub duplicate_locations: Vec<DuplicateLocation>,
    /// Record counts per category tag.
    pub categories: BTreeMap<String, usize>,
}

impl ValidationReport {
    /// Whether every entry is a record and every anchor is unique within its page.
    pub fn is_clean(&self) -> bool {
        self.malformed.is_empty() && self.duplicate_locations.is_empty()
    }
}

impl SearchIndex {
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport {
            entries: self.entries().len(),
            pages: self.page_titles().len(),
            ..ValidationReport::default()
        };

        let mut anchors: AHashMap<(&str, &str), Vec<RecordId>> = AHashMap::new();
        let mut anchor_order: Vec<(&str, &str)> = Vec::new();

        for (id, entry) in self.entries().iter().enumerate() {
            match entry {
                Entry::Record { record, .. } => {
                    report.records += 1;
                    *report
                        .categories
                        .entry(record.category.as_str().to_string())
                        .or_insert(0) += 1;

                    if !record.is_page_level() {
                        let key = (record.page.as_str(), record.location.as_str());
                        let ids = anchors.entry(key).or_default();
                        if ids.is_empty() {
                            anchor_order.push(key);
                        }
                        ids.push(id);
                    }
                }
                Entry::Malformed { reason, .. } => {
                    tracing::debug!("Entry {} is malformed: {}", id, reason);
                    report.malformed.push((id, reason.clone()));
                }
            }
        }

        report.duplicate_locations = anchor_order
            .into_iter()
            .filter_map(|key| {
                let ids = anchors.remove(&key)?;
                (ids.len() > 1).then(|| DuplicateLocation {
                    page: key.0.to_string(),
                    location: key.1.to_string(),
                    ids,
                })
            })
            .collect();

        report
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} entries, {} records across {} page(s)",
            self.entries, self.records, self.pages
        )?;

        for (category, count) in &self.categories {
            writeln!(f, "  {}: {}", category, count)?;
        }

        if self.is_clean() {
            return writeln!(f, "No problems found.");
        }

        if !self.malformed.is_empty() {
            writeln!(f, "\nMalformed entries ({}):", self.malformed.len())?;
            for (id, reason) in &self.malformed {
                writeln!(f, "  #{}: {}", id, reason)?;
            }
        }

        if !self.duplicate_locations.is_empty() {
            writeln!(f, "\nDuplicate locations:")?;
            for duplicate in &self.duplicate_locations {
                writeln!(
                    f,
                    "  '{}' on page '{}' at entries {:?}",
                    duplicate.location, duplicate.page, duplicate.ids
                )?;
            }
        }

        Ok(())
    }
}
