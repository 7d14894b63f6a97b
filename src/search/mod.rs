//! Search over documentation records.
//!
//! Two modes share one request type: the substring scan a documentation site's
//! search box performs, and a stemmed TF-IDF keyword index.

// Module declarations
pub(crate) mod query;
pub(crate) mod scoring;
pub(crate) mod substring;
pub(crate) mod terms;
pub(crate) mod tokenize;

// Public re-exports (used via lib.rs)
pub use query::{DEFAULT_LIMIT, MatchField, SearchHit, SearchMode, SearchQuery};
pub use scoring::calculate_relevance;
pub use terms::TermIndex;
