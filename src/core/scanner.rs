use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const DEFAULT_EXTENSIONS: &[&str] = &["js"];

pub struct FileScanner;

impl FileScanner {
    pub fn new() -> Self {
        Self
    }

    /// List the files under `root` whose extension is one of `extensions`.
    ///
    /// A file given as `root` is returned as-is. Output is sorted.
    pub fn scan(&self, root: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
        let metadata = std::fs::metadata(root)
            .with_context(|| format!("Failed to read input path {}", root.display()))?;
        if metadata.is_file() {
            return Ok(vec![root.to_path_buf()]);
        }

        // Collect all entries first for parallel processing
        let entries: Vec<_> = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file())
            .collect();

        let mut files: Vec<PathBuf> = entries
            .par_iter()
            .filter_map(|entry| {
                let path = entry.path();
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .filter(|ext| extensions.iter().any(|wanted| wanted.eq_ignore_ascii_case(ext)))
                    .map(|_| path.to_path_buf())
            })
            .collect();

        files.sort();
        Ok(files)
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}
