pub mod list_pages;
pub mod load_index;
pub mod read_section;
pub mod search;
pub mod validate;

pub use list_pages::*;
pub use load_index::*;
pub use read_section::*;
pub use search::*;
pub use validate::*;

use crate::config::expand_tilde;
use crate::discover::resolve_index_path;
use crate::state::{IndexState, LoadedIndex};
use std::path::Path;
use std::sync::Arc;

/// Find the index a request refers to.
///
/// An explicit path (file or documentation directory) is loaded without
/// changing the active index. Otherwise the active index is used, falling back
/// to the configured one, which then becomes active.
pub(crate) async fn resolve_index(
    state: &Arc<IndexState>,
    path: Option<&str>,
) -> Result<Arc<LoadedIndex>, String> {
    if let Some(path) = path {
        let expanded = expand_tilde(path);
        let resolved = resolve_index_path(Path::new(expanded.as_ref())).map_err(|e| format!("{:#}", e))?;
        return state.load(&resolved).await;
    }

    if let Some(active) = state.active().await {
        return Ok(active);
    }

    if let Some(configured) = state.config().index.clone() {
        let resolved = resolve_index_path(&configured).map_err(|e| format!("{:#}", e))?;
        return state.activate(&resolved).await;
    }

    Err("No search index loaded.\n\n\
         To load one:\n\
         • Use load_index with a path to search_index.js or a built documentation directory\n\
         • Or set `index` in the config file / DOCINDEX_INDEX"
        .to_string())
}

/// Short name of an index for headings: its page count and source file.
pub(crate) fn describe(loaded: &LoadedIndex) -> String {
    let source = loaded
        .index
        .path()
        .map_or_else(|| "<memory>".to_string(), |p| p.display().to_string());
    match loaded.index.page_titles().as_slice() {
        [single] => format!("'{}' ({})", single, source),
        pages => format!("{} pages ({})", pages.len(), source),
    }
}

/// First `max_chars` characters of `text` on one line, with an ellipsis if cut.
pub(crate) fn one_line(text: &str, max_chars: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}…", cut.trim_end())
    }
}
