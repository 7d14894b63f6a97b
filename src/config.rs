//! Configuration file and environment overrides.
//!
//! Lookup order for the file: `--config`, then `$DOCINDEX_CONFIG`, then
//! `<config dir>/docindex-mcp/config.toml`. A missing default file is not an
//! error. `DOCINDEX_INDEX` and `DOCINDEX_BASE_URL` override the file.

use crate::error::ConfigError;
use crate::search::DEFAULT_LIMIT;
use serde::Deserialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "docindex-mcp";
const CONFIG_ENV: &str = "DOCINDEX_CONFIG";
const INDEX_ENV: &str = "DOCINDEX_INDEX";
const BASE_URL_ENV: &str = "DOCINDEX_BASE_URL";

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Payload to load at startup.
    pub index: Option<PathBuf>,
    /// Site root used to build deep links.
    pub base_url: Option<String>,
    /// Results per search when the request gives no limit.
    pub default_limit: usize,
    /// Where keyword indices are cached. Defaults to the user cache directory.
    pub cache_dir: Option<PathBuf>,
    /// Seconds between checks of the active payload for a rebuild. 0 disables.
    pub reload_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index: None,
            base_url: None,
            default_limit: DEFAULT_LIMIT,
            cache_dir: None,
            reload_interval_secs: 5,
        }
    }
}

impl Config {
    /// Load configuration from the first file found and apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);

        let mut config = match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::from_file(&path)?,
            None => match default_config_path().filter(|path| path.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(text)?;
        config.index = config.index.map(|p| expand_path(&p));
        config.cache_dir = config.cache_dir.map(|p| expand_path(&p));
        Ok(config)
    }

    /// Apply environment-style overrides from `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(index) = lookup(INDEX_ENV).filter(|v| !v.is_empty()) {
            self.index = Some(PathBuf::from(expand_tilde(&index).as_ref()));
        }
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|v| !v.is_empty()) {
            self.base_url = Some(base_url);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_limit == 0 {
            return Err(ConfigError::Invalid {
                key: "default_limit",
                message: "must be at least 1".to_string(),
            });
        }
        if let Some(url) = &self.base_url
            && !(url.starts_with("http://") || url.starts_with("https://") || url.starts_with('/'))
        {
            return Err(ConfigError::Invalid {
                key: "base_url",
                message: format!("'{}' is not an http(s) URL or absolute path", url),
            });
        }
        Ok(())
    }

    /// Directory for cached keyword indices, if one is available.
    pub fn cache_dir(&self) -> Option<PathBuf> {
        self.cache_dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join(APP_DIR)))
    }

    /// Interval for the reload watcher, or `None` when disabled.
    pub const fn reload_interval(&self) -> Option<Duration> {
        match self.reload_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(expand_tilde(s).as_ref()),
        None => path.to_path_buf(),
    }
}

/// Expands tilde (`~`) in a path to the user's home directory.
///
/// - `~/foo` becomes `/home/user/foo`
/// - `~` becomes `/home/user`
/// - Other paths are returned unchanged
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use std::collections::HashMap;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        check!(config == Config::default());
        check!(config.reload_interval() == Some(Duration::from_secs(5)));
    }

    #[test]
    fn reads_all_keys() {
        let config = Config::from_toml(
            r#"
index = "/srv/docs/dev/search_index.js"
base_url = "https://example.org/Deconvolution.jl/dev"
default_limit = 25
cache_dir = "/tmp/docindex"
reload_interval_secs = 0
"#,
        )
        .unwrap();
        check!(config.index == Some(PathBuf::from("/srv/docs/dev/search_index.js")));
        check!(config.default_limit == 25);
        check!(config.cache_dir() == Some(PathBuf::from("/tmp/docindex")));
        check!(config.reload_interval().is_none());
    }

    #[test]
    fn rejects_unknown_keys() {
        check!(Config::from_toml("colour = true").is_err());
    }

    #[test]
    fn environment_overrides_file() {
        let mut config = Config::from_toml(r#"index = "/a.js""#).unwrap();
        let env: HashMap<&str, &str> = [
            (INDEX_ENV, "/b.js"),
            (BASE_URL_ENV, "https://docs.example.org"),
        ]
        .into();
        config.apply_overrides(|key| env.get(key).map(|v| (*v).to_string()));
        check!(config.index == Some(PathBuf::from("/b.js")));
        check!(config.base_url.as_deref() == Some("https://docs.example.org"));
    }

    #[test]
    fn validation_catches_bad_values() {
        let config = Config {
            default_limit: 0,
            ..Config::default()
        };
        let_assert!(Err(ConfigError::Invalid { key: "default_limit", .. }) = config.validate());

        let config = Config {
            base_url: Some("example.org".to_string()),
            ..Config::default()
        };
        let_assert!(Err(ConfigError::Invalid { key: "base_url", .. }) = config.validate());
    }

    #[test]
    fn from_file_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let_assert!(Err(ConfigError::Read { .. }) = Config::from_file(&dir.path().join("none.toml")));
    }

    #[test]
    fn tilde_expansion_leaves_other_paths() {
        check!(expand_tilde("/abs/path") == "/abs/path");
        check!(expand_tilde("relative") == "relative");
    }
}
