//! Text tokenization and stemming for keyword search.

use super::terms::TermIndex;
use crate::fingerprint::Fingerprint;
use crate::record::RecordId;
use ahash::{AHashMap, AHasher};
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Common English stop words to filter out from indexing.
/// These high-frequency words add little value to search relevance.
pub(crate) const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "that", "the", "to", "was", "will", "with",
];

/// Weight of a term found in a record title.
pub(crate) const TITLE_WEIGHT: f32 = 2.0;
/// Weight of a term found in record text.
pub(crate) const TEXT_WEIGHT: f32 = 1.0;

/// Term hash for fast lookup
pub(crate) type TermHash = u64;

/// Accumulates weighted term frequencies per record before TF-IDF finalization.
pub(crate) struct TermBuilder {
    /// (term, record) → raw weighted TF
    term_docs: HashMap<(TermHash, RecordId), f32>,
    /// record → number of indexed tokens
    doc_lengths: HashMap<RecordId, usize>,
    stemmer: Stemmer,
}

impl Default for TermBuilder {
    fn default() -> Self {
        Self {
            term_docs: HashMap::default(),
            doc_lengths: HashMap::default(),
            stemmer: Stemmer::create(Algorithm::English),
        }
    }
}

impl TermBuilder {
    /// Tokenize `text` and add each term to `doc` with the given weight.
    pub(crate) fn add_terms(&mut self, text: &str, doc: RecordId, weight: f32) {
        let words = tokenize_and_stem(text, &self.stemmer);

        let mut word_counts: AHashMap<String, usize> = AHashMap::with_capacity(words.len());
        for word in words {
            *word_counts.entry(word).or_insert(0) += 1;
        }

        let doc_len: usize = word_counts.values().sum();
        *self.doc_lengths.entry(doc).or_insert(0) += doc_len;

        for (word, count) in word_counts {
            *self
                .term_docs
                .entry((hash_term(&word), doc))
                .or_insert(0.0) += (count as f32) * weight;
        }
    }

    /// Compute TF-IDF scores and produce the searchable index.
    ///
    /// score = ln(1 + tf / length_norm) * ln(1 + docs / doc_freq), where
    /// length_norm is the record's token count relative to the average.
    pub(crate) fn finalize(self, fingerprint: Fingerprint, documents: usize) -> TermIndex {
        let start = std::time::Instant::now();
        let total_docs = documents.max(1) as f32;

        let total_length: usize = self.doc_lengths.values().sum();
        let avg_doc_length = if self.doc_lengths.is_empty() {
            1.0
        } else {
            total_length as f32 / self.doc_lengths.len() as f32
        };

        let pairs = self.term_docs.len();
        let mut grouped: HashMap<TermHash, Vec<(RecordId, f32)>> = HashMap::new();
        for ((term, doc), tf) in self.term_docs {
            grouped.entry(term).or_default().push((doc, tf));
        }

        let terms: HashMap<TermHash, Vec<(RecordId, f32)>> = grouped
            .into_iter()
            .map(|(term, docs)| {
                let idf = (1.0 + total_docs / docs.len() as f32).ln();
                let mut scored: Vec<(RecordId, f32)> = docs
                    .into_iter()
                    .map(|(doc, tf)| {
                        let doc_length = self.doc_lengths.get(&doc).copied().unwrap_or(1) as f32;
                        let length_norm = (doc_length / avg_doc_length).max(0.5);
                        (doc, (1.0 + tf / length_norm).ln() * idf)
                    })
                    .collect();
                scored.sort_by(|(a_doc, a), (b_doc, b)| b.total_cmp(a).then(a_doc.cmp(b_doc)));
                (term, scored)
            })
            .collect();

        let index = TermIndex::new(fingerprint, terms, documents);

        tracing::info!(
            "Built keyword index: {} unique terms, {} records, {} term-record pairs in {:?}",
            index.term_count(),
            documents,
            pairs,
            start.elapsed()
        );

        index
    }
}

/// Split text into lowercase, stemmed search terms.
///
/// Words are runs of alphabetic characters. A camelCase word contributes each
/// of its parts as well as the whole word, so `RichardsonLucy` yields
/// `richardson`, `luci` and `richardsonluci`.
pub(crate) fn tokenize_and_stem(text: &str, stemmer: &Stemmer) -> Vec<String> {
    let mut tokens = Vec::new();

    for word in text.split(|c: char| !c.is_alphabetic()).filter(|w| !w.is_empty()) {
        let parts = camel_case_parts(word);
        if parts.len() > 1 {
            for part in parts {
                push_token(part, &mut tokens, stemmer);
            }
        }
        push_token(word, &mut tokens, stemmer);
    }

    tokens
}

/// Split a word at lowercase → uppercase transitions.
fn camel_case_parts(word: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut previous_lower = false;

    for (i, c) in word.char_indices() {
        if previous_lower && c.is_uppercase() {
            parts.push(&word[start..i]);
            start = i;
        }
        previous_lower = c.is_lowercase();
    }
    parts.push(&word[start..]);
    parts
}

/// Lowercase, drop stop words, stem.
fn push_token(token: &str, tokens: &mut Vec<String>, stemmer: &Stemmer) {
    let lowercase = token.to_lowercase();
    if STOP_WORDS.contains(&lowercase.as_str()) {
        return;
    }
    tokens.push(stemmer.stem(&lowercase).into_owned());
}

/// Hashes a term for fast lookup (case-insensitive).
pub(crate) fn hash_term(term: &str) -> TermHash {
    let mut hasher = AHasher::default();
    term.to_lowercase().hash(&mut hasher);
    hasher.finish()
}
