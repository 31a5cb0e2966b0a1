//! Scratch media trees
//!
//! A temporary PinUP layout with a media root and a sibling backup root.

use popmedia_match::services::{RunMode, SequenceRatio};
use popmedia_match::workflow::{Pipeline, PipelineConfig, RunOutput};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary media and backup roots
pub struct MediaTree {
    _temp_dir: TempDir,
    pub media_root: PathBuf,
    pub backup_root: PathBuf,
}

impl MediaTree {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let media_root = temp_dir.path().join("POPMedia");
        let backup_root = temp_dir.path().join("POPMediaBackup");
        fs::create_dir_all(&media_root).expect("create media root");

        Self {
            _temp_dir: temp_dir,
            media_root,
            backup_root,
        }
    }

    /// Create a media file (contents are its relative path)
    pub fn add(&self, relative: &str) -> PathBuf {
        let path = self.media_root.join(relative);
        write_file(&path, relative);
        path
    }

    /// Create a file under the backup root
    pub fn add_backup(&self, relative: &str) -> PathBuf {
        let path = self.backup_root.join(relative);
        write_file(&path, relative);
        path
    }

    pub fn media(&self, relative: &str) -> PathBuf {
        self.media_root.join(relative)
    }

    pub fn backup(&self, relative: &str) -> PathBuf {
        self.backup_root.join(relative)
    }

    /// Every file below the temp dir, relative and sorted
    pub fn snapshot(&self) -> Vec<String> {
        let root = self.media_root.parent().expect("media root has parent");
        let mut files: Vec<String> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                e.path()
                    .strip_prefix(root)
                    .expect("inside temp dir")
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        files.sort();
        files
    }

    pub fn config(&self, mode: RunMode) -> PipelineConfig {
        PipelineConfig {
            media_root: self.media_root.clone(),
            backup_root: self.backup_root.clone(),
            extensions: ["jpg", "mp4", "png", "apng"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            threshold: 0.90,
            strong_match_confidence: 95.0,
            mode,
        }
    }

    /// Run the pipeline with the default scorer
    pub fn run(&self, mode: RunMode, canonical_names: &[String]) -> RunOutput {
        Pipeline::new(self.config(mode), &SequenceRatio)
            .run(canonical_names)
            .expect("pipeline run")
    }
}

pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|name| name.to_string()).collect()
}

fn write_file(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().expect("file has parent")).expect("create parent");
    fs::write(path, contents).expect("write file");
}
