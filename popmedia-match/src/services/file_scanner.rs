//! Media asset enumerator
//!
//! Walks the media root and snapshots every file with a recognized media
//! extension. The snapshot is taken once, before any planning, and comes
//! back in a deterministic order: directories sorted, then files sorted
//! within each directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

use crate::models::MediaAsset;

/// Media scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Media file scanner
pub struct FileScanner {
    extensions: Vec<String>,
    ignore_patterns: Vec<String>,
    excluded_roots: Vec<PathBuf>,
}

impl FileScanner {
    /// Create scanner for the given extensions (without leading dot)
    ///
    /// Ignores system files like .DS_Store, Thumbs.db, .git, etc.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            ignore_patterns: vec![
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
                ".git".to_string(),
                ".svn".to_string(),
            ],
            excluded_roots: Vec::new(),
        }
    }

    /// Skip everything below `root` (e.g. a backup root nested in the media root)
    pub fn exclude(mut self, root: impl Into<PathBuf>) -> Self {
        self.excluded_roots.push(root.into());
        self
    }

    /// Enumerate media assets below `media_root`
    pub fn scan(&self, media_root: &Path) -> Result<Vec<MediaAsset>, ScanError> {
        if !media_root.exists() {
            return Err(ScanError::PathNotFound(media_root.to_path_buf()));
        }

        if !media_root.is_dir() {
            return Err(ScanError::NotADirectory(media_root.to_path_buf()));
        }

        let walker = WalkDir::new(media_root)
            .follow_links(false) // Don't follow symlinks automatically
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e));

        // Group by directory so each directory's files stay together
        let mut by_directory: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.is_media_file(entry.path()) {
                        let dir = entry
                            .path()
                            .parent()
                            .map(Path::to_path_buf)
                            .unwrap_or_default();
                        by_directory
                            .entry(dir)
                            .or_default()
                            .push(entry.path().to_path_buf());
                    }
                }
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                    // Continue scanning, don't abort
                }
            }
        }

        let mut assets = Vec::new();
        for (dir, mut files) in by_directory {
            files.sort();
            tracing::debug!(
                "Found {} media files in directory: {}",
                files.len(),
                dir.display()
            );
            for file in files {
                match MediaAsset::from_path(&file) {
                    Some(asset) => assets.push(asset),
                    None => {
                        tracing::warn!("Skipping file with non UTF-8 name: {}", file.display())
                    }
                }
            }
        }

        tracing::info!(
            "Enumerated {} media assets under {}",
            assets.len(),
            media_root.display()
        );

        Ok(assets)
    }

    /// Check if entry should be processed
    fn should_process_entry(&self, entry: &DirEntry) -> bool {
        let file_name = entry.file_name().to_string_lossy();

        // Skip ignored patterns
        for pattern in &self.ignore_patterns {
            if file_name.contains(pattern.as_str()) {
                return false;
            }
        }

        !self
            .excluded_roots
            .iter()
            .any(|root| entry.path().starts_with(root))
    }

    /// Check if the file carries a recognized media extension
    fn is_media_file(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .is_some_and(|ext| self.extensions.iter().any(|known| *known == ext))
    }
}
