use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

use super::source::Source;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to read modification time of {}", .path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize cache snapshot")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write cache file {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// On-disk entry as read back; every field may be missing or malformed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedEntry {
    is_module: Option<Value>,
    modified_dates: Option<u64>,
    provides: Option<Vec<String>>,
    requires: Option<Vec<String>>,
}

/// On-disk entry as written by [`SourceCache::save`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotEntry<'a> {
    is_module: bool,
    modified_dates: u64,
    provides: &'a [String],
    requires: &'a [String],
}

/// Extraction results keyed by file path, validated against file mtimes.
///
/// Records and timestamps live in separate maps. A timestamp is only
/// recorded when an entry is loaded from disk, so a record added with
/// [`SourceCache::set_source`] is not fresh until it has gone through
/// [`SourceCache::save`] and a reload.
pub struct SourceCache {
    file: PathBuf,
    sources: HashMap<PathBuf, Source>,
    modified_dates: HashMap<PathBuf, u64>,
}

impl SourceCache {
    /// Load the cache backed by `file`. Any failure yields an empty cache.
    pub fn load(file: impl Into<PathBuf>) -> Self {
        let mut cache = Self::empty(file);

        let content = match fs::read_to_string(&cache.file) {
            Ok(content) => content,
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    warn!(file = %cache.file.display(), error = %err, "ignoring unreadable cache file");
                }
                return cache;
            }
        };

        let entries = match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(entries)) => entries,
            Ok(_) => {
                warn!(file = %cache.file.display(), "ignoring cache file without a top-level object");
                return cache;
            }
            Err(err) => {
                warn!(file = %cache.file.display(), error = %err, "ignoring corrupt cache file");
                return cache;
            }
        };

        let total = entries.len();
        for (key, value) in entries {
            let Ok(entry) = serde_json::from_value::<PersistedEntry>(value) else {
                debug!(path = %key, "skipping malformed cache entry");
                continue;
            };
            let (Some(provides), Some(requires), Some(modified)) =
                (entry.provides, entry.requires, entry.modified_dates.filter(|m| *m != 0))
            else {
                debug!(path = %key, "skipping incomplete cache entry");
                continue;
            };

            let path = PathBuf::from(key);
            let source = Source::new(
                path.clone(),
                provides,
                requires,
                entry.is_module.as_ref().is_some_and(is_truthy),
            );
            cache.sources.insert(path.clone(), source);
            cache.modified_dates.insert(path, modified);
        }

        debug!(
            file = %cache.file.display(),
            loaded = cache.sources.len(),
            skipped = total - cache.sources.len(),
            "loaded source cache"
        );
        cache
    }

    /// A cache backed by `file` that ignores whatever the file holds now.
    pub fn empty(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            sources: HashMap::new(),
            modified_dates: HashMap::new(),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.sources.contains_key(path)
    }

    /// Return the cached record for `path` if the file is unchanged on disk.
    ///
    /// A stale or never-timestamped entry is evicted and reported as a miss.
    /// Failing to read the file's mtime is an error, not a miss.
    pub fn get_source(&mut self, path: &Path) -> Result<Option<&Source>, CacheError> {
        if !self.sources.contains_key(path) {
            return Ok(None);
        }

        let current = modified_millis(path).map_err(|source| CacheError::Stat {
            path: path.to_path_buf(),
            source,
        })?;

        if self.modified_dates.get(path) == Some(&current) {
            debug!(path = %path.display(), "source cache hit");
            return Ok(self.sources.get(path));
        }

        debug!(path = %path.display(), "evicting stale source cache entry");
        self.remove_source(path);
        Ok(None)
    }

    /// Insert or replace the record for `path`. Its timestamp is left untouched.
    pub fn set_source(&mut self, path: impl Into<PathBuf>, source: Source) {
        self.sources.insert(path.into(), source);
    }

    pub fn remove_source(&mut self, path: &Path) {
        self.modified_dates.remove(path);
        self.sources.remove(path);
    }

    /// Persist every record whose file still exists, stamped with its
    /// current mtime. The in-memory state is not modified.
    pub fn save(&self) -> Result<(), CacheError> {
        let snapshot = self.snapshot()?;
        let json = serde_json::to_string(&snapshot)?;

        write_atomically(&self.file, json.as_bytes()).map_err(|source| CacheError::Write {
            path: self.file.clone(),
            source,
        })?;

        debug!(
            file = %self.file.display(),
            entries = snapshot.len(),
            dropped = self.sources.len() - snapshot.len(),
            "saved source cache"
        );
        Ok(())
    }

    fn snapshot(&self) -> Result<BTreeMap<&Path, SnapshotEntry<'_>>, CacheError> {
        let mut snapshot = BTreeMap::new();

        for (path, source) in &self.sources {
            if !path.exists() {
                continue;
            }

            let modified_dates = modified_millis(path).map_err(|source| CacheError::Stat {
                path: path.clone(),
                source,
            })?;

            snapshot.insert(
                path.as_path(),
                SnapshotEntry {
                    is_module: source.is_module(),
                    modified_dates,
                    provides: source.provides(),
                    requires: source.requires(),
                },
            );
        }

        Ok(snapshot)
    }
}

/// Modification time of `path` in milliseconds since the Unix epoch.
pub fn modified_millis(path: &Path) -> io::Result<u64> {
    let modified = fs::metadata(path)?.modified()?;
    Ok(modified
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64)
}

/// JavaScript truthiness of a JSON value.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Write through a temp file in the target directory, then rename over `target`.
fn write_atomically(target: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(target).map_err(|err| err.error)?;
    Ok(())
}
