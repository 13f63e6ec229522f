//! Lookup of a cached default voice in the voices directory.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

/// Extensions that count as a usable cached voice.
const WAV_EXTENSIONS: &[&str] = &["wav"];

/// Cached formats that are recognised but never converted.
const UNCONVERTED_EXTENSIONS: &[&str] = &["webm", "mp3", "m4a"];

/// First `.wav` file in `dir`, by file name.
///
/// Only the first match is used; further files are ignored. Non-WAV voices
/// are reported and skipped, so the caller falls back to the synthesized
/// default. A missing or unreadable directory yields `None`.
pub fn find_default_voice(dir: &Path) -> Option<PathBuf> {
    if !dir.is_dir() {
        return None;
    }

    let mut files: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|entry| {
                entry
                    .map_err(|e| {
                        warn!("Error reading directory entry: {e}");
                        e
                    })
                    .ok()
            })
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect(),
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot read voices directory");
            return None;
        }
    };
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    if let Some(wav) = files.iter().find(|p| has_extension(p, WAV_EXTENSIONS)) {
        info!(path = %wav.display(), "using existing WAV voice file as default");
        return Some(wav.clone());
    }

    if let Some(other) = files.iter().find(|p| has_extension(p, UNCONVERTED_EXTENSIONS)) {
        info!(
            path = %other.display(),
            "found non-WAV voice file, will create default speaker instead"
        );
    }
    None
}

fn has_extension(path: &Path, wanted: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .is_some_and(|ext| wanted.contains(&ext.as_str()))
}
