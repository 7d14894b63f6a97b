//! Keyword index over record titles and text, cached on disk by fingerprint.

use super::tokenize::{TEXT_WEIGHT, TITLE_WEIGHT, TermBuilder, TermHash, hash_term, tokenize_and_stem};
use crate::fingerprint::Fingerprint;
use crate::index::SearchIndex;
use crate::record::RecordId;
use postcard::{from_io, to_io};
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A TF-IDF inverted index for one payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermIndex {
    /// Payload the index was built from
    fingerprint: Fingerprint,
    /// term hash → (record, score), sorted by score descending
    terms: HashMap<TermHash, Vec<(RecordId, f32)>>,
    documents: usize,
}

impl TermIndex {
    pub(super) const fn new(
        fingerprint: Fingerprint,
        terms: HashMap<TermHash, Vec<(RecordId, f32)>>,
        documents: usize,
    ) -> Self {
        Self {
            fingerprint,
            terms,
            documents,
        }
    }

    /// Build the index for every valid record of `index`.
    pub fn build(index: &SearchIndex) -> Self {
        let mut builder = TermBuilder::default();
        let mut documents = 0;
        for (id, record) in index.records() {
            documents += 1;
            builder.add_terms(&record.title, id, TITLE_WEIGHT);
            builder.add_terms(&record.text, id, TEXT_WEIGHT);
        }
        builder.finalize(index.fingerprint(), documents)
    }

    /// Load the cached index for this payload, or build and cache it.
    ///
    /// Cache files are named by fingerprint, so a rebuilt payload never picks up
    /// a stale index.
    pub async fn load_or_build(index: &SearchIndex, cache_dir: Option<&Path>) -> Self {
        let Some(cache_dir) = cache_dir else {
            return Self::build(index);
        };

        let path = cache_path(cache_dir, index.fingerprint());
        if let Some(terms) = Self::load(&path, index.fingerprint()).await {
            tracing::debug!(
                "Loaded cached keyword index {} ({} terms)",
                path.display(),
                terms.term_count()
            );
            return terms;
        }

        let terms = Self::build(index);
        terms.store(&path).await;
        terms
    }

    /// Records matching the query terms, best first.
    ///
    /// The query goes through the same tokenizer as the records. Scores of
    /// several query terms add up; equal scores keep array order.
    pub fn search(&self, query: &str) -> Vec<(RecordId, f32)> {
        let stemmer = Stemmer::create(Algorithm::English);
        let tokens = tokenize_and_stem(query, &stemmer);

        let mut combined: HashMap<RecordId, f32> = HashMap::new();
        for token in &tokens {
            if let Some(postings) = self.terms.get(&hash_term(token)) {
                for (doc, score) in postings {
                    *combined.entry(*doc).or_insert(0.0) += score;
                }
            }
        }

        let mut results: Vec<(RecordId, f32)> = combined.into_iter().collect();
        results.sort_by(|(a_doc, a), (b_doc, b)| b.total_cmp(a).then(a_doc.cmp(b_doc)));
        results
    }

    pub const fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub const fn document_count(&self) -> usize {
        self.documents
    }

    async fn load(path: &Path, expected: Fingerprint) -> Option<Self> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let mut file = std::fs::File::open(&path).ok()?;
            let mut buf = [0u8; 8192];
            match from_io::<Self, _>((&mut file, &mut buf[..])) {
                Ok((terms, _)) if terms.fingerprint == expected => Some(terms),
                Ok(_) => {
                    tracing::warn!("Cached keyword index {} belongs to another payload", path.display());
                    None
                }
                Err(e) => {
                    tracing::warn!("Failed to deserialize cached index at {}: {}", path.display(), e);
                    let _ = std::fs::remove_file(&path);
                    None
                }
            }
        })
        .await
        .ok()?
    }

    async fn store(&self, path: &Path) {
        let path = path.to_path_buf();
        let terms = self.clone();

        let result = tokio::task::spawn_blocking(move || {
            if let Some(parent) = path.parent()
                && let Err(e) = std::fs::create_dir_all(parent)
            {
                tracing::warn!("Failed to create cache directory {}: {}", parent.display(), e);
                return;
            }

            match std::fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&path)
            {
                Ok(mut file) => {
                    if let Err(e) = to_io(&terms, &mut file) {
                        tracing::warn!("Failed to write keyword index to {}: {}", path.display(), e);
                        let _ = std::fs::remove_file(&path);
                    } else {
                        tracing::debug!("Cached keyword index to {}", path.display());
                    }
                }
                Err(e) if e.kind() != std::io::ErrorKind::AlreadyExists => {
                    tracing::warn!("Failed to create index file {}: {}", path.display(), e);
                }
                _ => {
                    // Another process built the same payload's index first.
                    tracing::debug!("Index file already exists at {}", path.display());
                }
            }
        })
        .await;

        if let Err(e) = result {
            tracing::error!("Keyword index store task failed: {}", e);
        }
    }
}

fn cache_path(cache_dir: &Path, fingerprint: Fingerprint) -> PathBuf {
    cache_dir.join(format!("{}.terms", fingerprint.as_hex()))
}
