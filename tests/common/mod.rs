//! Shared test fixtures and utilities for integration tests.
//!
//! # Test Isolation Strategy
//!
//! Each test gets a fresh temporary directory holding a copy of the reference
//! payload, and its own `IndexState` whose keyword cache lives inside that
//! directory. Nothing is read from or written to the user's cache.
//!
//! # Available Fixtures
//!
//! - `isolated_index`: state plus the copied reference payload, not yet loaded

use docindex_mcp::{Config, IndexState};
use rstest::fixture;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Returns the project root directory (where Cargo.toml lives).
pub fn project_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// The Deconvolution.jl search index shipped as a fixture.
#[allow(dead_code)] // Used by some integration test crates only
pub fn reference_payload() -> PathBuf {
    project_root().join("tests/fixtures/deconvolution_search_index.js")
}

/// A temporary workspace directory for test isolation.
///
/// Provides basic filesystem operations within a temp directory that is
/// automatically cleaned up when dropped.
#[allow(dead_code)] // Methods used across different integration test crates
pub struct TempWorkspace {
    _temp: TempDir,
    root: PathBuf,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl TempWorkspace {
    /// Creates a new empty temporary workspace.
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        Self { _temp: temp, root }
    }

    /// Returns the root path of this workspace.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Creates a file with the given content within this workspace.
    ///
    /// Parent directories are created automatically if they don't exist.
    ///
    /// # Panics
    /// Panics if file creation fails.
    pub fn create_file(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("Failed to create parent directory for '{}': {}", path, e)
            });
        }
        std::fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", path, e));
        full_path
    }

    /// Copies a file from the real filesystem into this workspace.
    ///
    /// # Panics
    /// Panics if copying fails.
    pub fn copy_file(&self, source: &Path, dest_relative: &str) -> PathBuf {
        let dest = self.root.join(dest_relative);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!(
                    "Failed to create parent directory for '{}': {}",
                    dest_relative, e
                )
            });
        }
        std::fs::copy(source, &dest).unwrap_or_else(|e| {
            panic!(
                "Failed to copy '{}' to '{}': {}",
                source.display(),
                dest.display(),
                e
            )
        });
        dest
    }
}

/// A built documentation tree with its own index state.
#[allow(dead_code)]
pub struct IsolatedIndex {
    pub workspace: TempWorkspace,
    /// `<workspace>/build/search_index.js`
    pub payload: PathBuf,
    pub state: Arc<IndexState>,
}

/// State over a copy of the reference payload, nothing loaded yet.
#[fixture]
pub fn isolated_index() -> IsolatedIndex {
    let workspace = TempWorkspace::new();
    let payload = workspace.copy_file(&reference_payload(), "build/search_index.js");

    let config = Config {
        cache_dir: Some(workspace.path().join("cache")),
        reload_interval_secs: 0,
        ..Config::default()
    };

    IsolatedIndex {
        state: Arc::new(IndexState::new(config)),
        workspace,
        payload,
    }
}
