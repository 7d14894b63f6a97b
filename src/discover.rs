//! Locating search-index payloads inside a built documentation tree.

use crate::error::Result;
use anyhow::{Context, bail};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// File names the generator writes its search index to.
pub const INDEX_FILE_NAMES: &[&str] = &["search_index.js"];

/// Build output is usually git-ignored, so ignore files are not honoured, but
/// the walk is bounded.
const MAX_DEPTH: usize = 6;

/// A payload found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovered {
    pub path: PathBuf,
    /// Name of the directory holding the payload (`dev`, `stable`, `v1.2.0`, ...).
    pub version: Option<String>,
}

/// Find every search-index payload under `root`, sorted by path.
pub fn discover(root: &Path) -> Vec<Discovered> {
    let mut found: Vec<Discovered> = WalkBuilder::new(root)
        .max_depth(Some(MAX_DEPTH))
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .ignore(false)
        .build()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| INDEX_FILE_NAMES.contains(&name))
        })
        .map(|entry| {
            let path = entry.into_path();
            let version = path
                .parent()
                .filter(|parent| *parent != root)
                .and_then(Path::file_name)
                .map(|name| name.to_string_lossy().into_owned());
            Discovered { path, version }
        })
        .collect();

    found.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!("Discovered {} search index file(s) under {}", found.len(), root.display());
    found
}

/// Turn a user-supplied path into a payload file.
///
/// Files are taken as-is. For a directory, a payload directly inside it wins;
/// otherwise the tree must contain exactly one payload, or one under `dev`.
pub fn resolve_index_path(path: &Path) -> Result<PathBuf> {
    let path = path
        .canonicalize()
        .with_context(|| format!("Failed to resolve path '{}'", path.display()))?;

    if path.is_file() {
        return Ok(path);
    }

    if let Some(direct) = INDEX_FILE_NAMES
        .iter()
        .map(|name| path.join(name))
        .find(|candidate| candidate.is_file())
    {
        return Ok(direct);
    }

    let found = discover(&path);
    match found.as_slice() {
        [] => bail!("No search index found under {}", path.display()),
        [single] => Ok(single.path.clone()),
        many => {
            if let Some(dev) = many.iter().find(|d| d.version.as_deref() == Some("dev")) {
                return Ok(dev.path.clone());
            }
            let listing: Vec<String> = many.iter().map(|d| d.path.display().to_string()).collect();
            bail!(
                "Several search indices under {}; pick one:\n  {}",
                path.display(),
                listing.join("\n  ")
            )
        }
    }
}
