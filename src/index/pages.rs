//! Page and section outline of an index.
//!
//! Body records carry no pointer to their heading. They belong to the nearest
//! preceding `section` record on the same page, in array order.

use super::{SearchIndex, same_page};
use crate::record::{DocRecord, RecordId};
use ahash::AHashMap;
use rapidfuzz::distance::jaro_winkler;

/// Minimum similarity for a page title to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// A section heading and the body records that follow it.
#[derive(Debug, Clone)]
pub struct Section<'a> {
    pub id: RecordId,
    pub heading: &'a DocRecord,
    pub body: Vec<(RecordId, &'a DocRecord)>,
}

impl Section<'_> {
    /// Body prose joined by blank lines, skipping empty records.
    pub fn body_text(&self) -> String {
        self.body
            .iter()
            .map(|(_, record)| record.text.as_str())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// All records of one page grouped under their headings.
#[derive(Debug, Clone)]
pub struct PageOutline<'a> {
    pub title: &'a str,
    /// Body records that appear before the first heading.
    pub intro: Vec<(RecordId, &'a DocRecord)>,
    pub sections: Vec<Section<'a>>,
}

impl PageOutline<'_> {
    pub fn record_count(&self) -> usize {
        self.intro.len()
            + self
                .sections
                .iter()
                .map(|section| 1 + section.body.len())
                .sum::<usize>()
    }
}

impl SearchIndex {
    /// Outline of every page, in first-appearance order.
    pub fn outline(&self) -> Vec<PageOutline<'_>> {
        let mut pages: Vec<PageOutline<'_>> = Vec::new();
        let mut by_title: AHashMap<&str, usize> = AHashMap::new();

        for (id, record) in self.records() {
            let slot = *by_title.entry(record.page.as_str()).or_insert_with(|| {
                pages.push(PageOutline {
                    title: &record.page,
                    intro: Vec::new(),
                    sections: Vec::new(),
                });
                pages.len() - 1
            });
            let page = &mut pages[slot];

            if record.category.is_heading() {
                page.sections.push(Section {
                    id,
                    heading: record,
                    body: Vec::new(),
                });
            } else if let Some(section) = page.sections.last_mut() {
                section.body.push((id, record));
            } else {
                page.intro.push((id, record));
            }
        }

        pages
    }

    /// Outline of a single page (title compared case-insensitively).
    pub fn page(&self, title: &str) -> Option<PageOutline<'_>> {
        self.outline()
            .into_iter()
            .find(|page| same_page(page.title, title))
    }

    /// The section whose heading has `location`, optionally limited to one page.
    pub fn section(&self, page: Option<&str>, location: &str) -> Option<Section<'_>> {
        self.outline()
            .into_iter()
            .filter(|outline| page.is_none_or(|p| same_page(outline.title, p)))
            .flat_map(|outline| outline.sections)
            .find(|section| section.heading.location == location)
    }

    /// Page titles resembling `query`, most similar first.
    pub fn suggest_pages(&self, query: &str) -> Vec<(&str, f64)> {
        let query = query.to_lowercase();
        let mut suggestions: Vec<(&str, f64)> = self
            .page_titles()
            .into_iter()
            .map(|title| {
                let score =
                    jaro_winkler::similarity(query.chars(), title.to_lowercase().chars());
                (title, score)
            })
            .filter(|(_, score)| *score > SUGGESTION_THRESHOLD)
            .collect();
        suggestions.sort_by(|(_, a), (_, b)| b.total_cmp(a));
        suggestions
    }
}

/// Join a site base URL and a record's location into a link.
///
/// Locations are relative to the site root: `#Usage` on the index page,
/// `man/guide/#Usage` elsewhere, and empty for page-level prose.
pub fn deep_link(base_url: &str, record: &DocRecord) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), record.location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Category;
    use assert2::{check, let_assert};

    const GUIDE: &str = r##"[
        {"location":"","page":"Guide","title":"Guide","text":"Intro paragraph.","category":"page"},
        {"location":"#Install","page":"Guide","title":"Install","text":"","category":"section"},
        {"location":"","page":"Guide","title":"Guide","text":"pkg> add Thing","category":"page"},
        {"location":"api/#Reference","page":"API","title":"Reference","text":"","category":"section"},
        {"location":"","page":"Guide","title":"Guide","text":"","category":"page"},
        {"location":"","page":"Guide","title":"Guide","text":"Then restart.","category":"page"},
        {"location":"#Usage","page":"Guide","title":"Usage","text":"","category":"section"}
    ]"##;

    #[test]
    fn groups_body_records_under_preceding_heading() {
        let index = SearchIndex::parse(GUIDE).unwrap();
        let outline = index.outline();
        check!(outline.len() == 2);

        let guide = &outline[0];
        check!(guide.title == "Guide");
        check!(guide.intro.len() == 1);
        check!(guide.sections.len() == 2);
        check!(guide.sections[0].heading.title == "Install");
        // Records of another page in between do not interrupt the section.
        check!(guide.sections[0].body.iter().map(|(id, _)| *id).collect::<Vec<_>>() == vec![2, 4, 5]);
        check!(guide.sections[1].body.is_empty());
        check!(guide.record_count() == 6);
    }

    #[test]
    fn section_body_text_skips_empty_records() {
        let index = SearchIndex::parse(GUIDE).unwrap();
        let_assert!(Some(section) = index.section(Some("guide"), "#Install"));
        check!(section.body_text() == "pkg> add Thing\n\nThen restart.");
        check!(index.section(Some("API"), "#Install").is_none());
    }

    #[test]
    fn suggests_similar_page_titles() {
        let index = SearchIndex::parse(GUIDE).unwrap();
        let suggestions = index.suggest_pages("guid");
        check!(suggestions.first().map(|(title, _)| *title) == Some("Guide"));
        check!(index.suggest_pages("zzzzzz").is_empty());
    }

    #[test]
    fn deep_links_join_base_and_location() {
        let record = DocRecord {
            location: "#Usage".to_string(),
            page: "Deconvolution.jl".to_string(),
            title: "Usage".to_string(),
            text: String::new(),
            category: Category::Section,
        };
        check!(deep_link("https://example.org/docs/dev/", &record) == "https://example.org/docs/dev/#Usage");
        check!(deep_link("https://example.org/docs/dev", &record) == "https://example.org/docs/dev/#Usage");
    }
}
