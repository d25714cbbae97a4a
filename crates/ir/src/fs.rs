//! File system helpers shared by the loaders

use seedsync_core::{SyncError, SyncResult};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Read a UTF-8 text file, dropping a leading byte-order mark.
pub fn read_text(path: impl AsRef<Path>) -> SyncResult<String> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| SyncError::read(path, e))?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

/// List the regular files directly inside `dir` whose names end with `suffix`
/// (compared case-insensitively).
///
/// A missing directory yields an empty list. Results are ordered by file name,
/// case-insensitively, with an ordinal tie-break.
pub fn list_files(dir: impl AsRef<Path>, suffix: &str) -> SyncResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| SyncError::read(dir, e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if ends_with_ignore_case(&name, suffix) {
            files.push(entry.into_path());
        }
    }

    files.sort_by_key(|path| {
        let name = file_name(path);
        (name.to_lowercase(), name)
    });
    Ok(files)
}

/// File name component as an owned string.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `name` with `suffix` removed when it ends with it, ignoring ASCII case.
pub fn strip_suffix_ignore_case<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    if !ends_with_ignore_case(name, suffix) {
        return None;
    }
    name.get(..name.len() - suffix.len())
}

fn ends_with_ignore_case(name: &str, suffix: &str) -> bool {
    name.len() >= suffix.len()
        && name
            .get(name.len() - suffix.len()..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
}

// ============================================================================
// Tests
// ============================================================================
