use std::path::{Path, PathBuf};
use log::{debug, info, warn};
use walkdir::WalkDir;

/// Media file extensions picked up in batch mode
const MEDIA_EXTENSIONS: &[&str] = &["mkv", "mp4", "m4v", "avi", "mov", "webm"];

fn is_media_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| MEDIA_EXTENSIONS.contains(&s.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Media files under a directory, in stable (sorted) walk order
pub fn find_media_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    if !root.exists() {
        warn!("Batch root does not exist: {}", root.display());
        return files;
    }

    info!("Scanning directory: {}", root.display());
    let walker = WalkDir::new(root).follow_links(false).sort_by_file_name();
    for entry in walker.into_iter() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Error reading directory entry: {}", e);
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() || !is_media_file(path) {
            continue;
        }

        debug!("Found media file: {}", path.display());
        files.push(path.to_path_buf());
    }

    info!("Found {} media file(s) in {}", files.len(), root.display());
    files
}

/// Per-run counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub planned: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.planned + self.failed
    }
}
