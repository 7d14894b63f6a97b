pub mod cli;
pub mod config;
pub mod discover;
pub mod error;
pub mod fingerprint;
pub mod index;
pub mod record;
pub mod search;
pub mod server;
pub mod state;
pub mod tools;
pub mod tracing;

pub use config::Config;
pub use error::{ConfigError, LoadError, Result};
pub use index::SearchIndex;
pub use record::{Category, DocRecord, Entry};
pub use search::{SearchMode, SearchQuery};
pub use state::{IndexState, LoadedIndex};
