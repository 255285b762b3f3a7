use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::scanner::{FileScanner, DEFAULT_EXTENSIONS};
use crate::parsers::{CacheError, ExtractError, Source, SourceCache};

/// Outcome of one analysis run.
#[derive(Debug)]
pub struct Analysis {
    /// Extracted or cached records, sorted by path.
    pub sources: Vec<Source>,
    /// Files that could not be extracted; the run continued without them.
    pub failures: Vec<ExtractError>,
    pub cache_hits: usize,
}

/// Scans an input tree, serving unchanged files from the cache and
/// extracting the rest.
pub struct DependencyAnalyzer {
    file_scanner: FileScanner,
    cache: Option<SourceCache>,
    extensions: Vec<String>,
    save_syntax_tree: bool,
}

impl DependencyAnalyzer {
    pub fn new(cache: Option<SourceCache>) -> Self {
        Self {
            file_scanner: FileScanner::new(),
            cache,
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            save_syntax_tree: false,
        }
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_syntax_tree(mut self, save: bool) -> Self {
        self.save_syntax_tree = save;
        self
    }

    pub fn analyze(&mut self, root: &Path) -> Result<Analysis> {
        let extensions: Vec<&str> = self.extensions.iter().map(String::as_str).collect();
        let files = self.file_scanner.scan(root, &extensions)?;
        info!(root = %root.display(), files = files.len(), "scanned input");

        let mut sources = Vec::with_capacity(files.len());
        let mut misses: Vec<PathBuf> = Vec::new();

        // Cache lookups stay sequential on the single cache instance.
        for path in files {
            let Some(cache) = self.cache.as_mut() else {
                misses.push(path);
                continue;
            };

            match cache.get_source(&path) {
                // A syntax tree is never cached, so a hit cannot satisfy a request for one.
                Ok(Some(source)) if !self.save_syntax_tree => sources.push(source.clone()),
                Ok(_) => misses.push(path),
                Err(CacheError::Stat { path, source }) => {
                    warn!(path = %path.display(), error = %source, "file vanished during scan");
                    cache.remove_source(&path);
                }
                Err(err) => return Err(err.into()),
            }
        }
        let cache_hits = sources.len();

        let save_syntax_tree = self.save_syntax_tree;
        let extracted: Vec<Result<Source, ExtractError>> = misses
            .par_iter()
            .map(|path| Source::from_file(path, save_syntax_tree))
            .collect();

        let mut failures = Vec::new();
        for result in extracted {
            match result {
                Ok(source) => {
                    if let Some(cache) = self.cache.as_mut() {
                        cache.set_source(source.path().to_path_buf(), source.clone());
                    }
                    sources.push(source);
                }
                Err(err) => {
                    warn!(path = %err.path().display(), error = %err, "skipping file");
                    failures.push(err);
                }
            }
        }

        sources.sort_by(|a, b| a.path().cmp(b.path()));
        debug!(
            cache_hits,
            extracted = sources.len() - cache_hits,
            failed = failures.len(),
            "analysis complete"
        );

        Ok(Analysis {
            sources,
            failures,
            cache_hits,
        })
    }

    /// Persist the cache, if any. Nothing is saved implicitly.
    pub fn save_cache(&self) -> Result<()> {
        if let Some(cache) = &self.cache {
            cache
                .save()
                .with_context(|| format!("Failed to save cache {}", cache.file().display()))?;
        }
        Ok(())
    }
}
