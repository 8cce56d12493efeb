//! Candidate enumeration over the content roots.
//!
//! Both the text indexer and the volume loader run as two stages: first the
//! matching paths are collected here, then each path is hashed or parsed.
//! Roots are visited in configured order and the paths found under each
//! root are sorted, so the candidate list does not depend on directory
//! iteration order.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Collect every regular file under `roots` for which `accept` returns true.
///
/// A root that does not exist contributes nothing. Entries that cannot be
/// read are skipped with a warning.
pub fn enumerate_files<F>(roots: &[PathBuf], mut accept: F) -> Vec<PathBuf>
where
    F: FnMut(&Path) -> bool,
{
    let mut paths = Vec::new();
    for root in roots {
        if !root.exists() {
            log::warn!("Content root {} does not exist, skipping", root.display());
            continue;
        }

        let mut candidates: Vec<PathBuf> = Vec::new();
        // Symlinked copies are content too; walkdir reports link cycles as errors.
        for entry in WalkDir::new(root).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };
            if entry.file_type().is_file() && accept(entry.path()) {
                candidates.push(entry.into_path());
            }
        }
        candidates.sort();
        paths.extend(candidates);
    }
    paths
}

/// True when the file extension starts with `prefix` (`txt` accepts `.txt`
/// and `.txt2` alike).
pub fn has_extension_prefix(path: &Path, prefix: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.starts_with(prefix))
        .unwrap_or(false)
}

/// True when the file name is exactly `name`.
pub fn has_file_name(path: &Path, name: &str) -> bool {
    path.file_name().map(|n| n == name).unwrap_or(false)
}
