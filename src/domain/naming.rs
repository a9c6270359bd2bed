//! Output file naming: `<root>/<artist>/<album>/<title><ext>`

use crate::domain::metadata::{TrackTags, UNKNOWN_ALBUM, UNKNOWN_ARTIST, UNTITLED};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const MAX_NAME_CHARS: usize = 180;

fn forbidden_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r#"[\\/:*?"<>|]"#).unwrap())
}

fn whitespace_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Make a string safe to use as a single path component.
///
/// The result never contains a separator and is never `.` or `..`.
pub fn safe_filename(name: &str) -> String {
    let replaced = forbidden_regex().replace_all(name, "_");
    let collapsed = whitespace_regex().replace_all(&replaced, " ");
    let truncated: String = collapsed.trim().chars().take(MAX_NAME_CHARS).collect();
    if truncated.is_empty() {
        UNTITLED.to_string()
    } else if truncated.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        truncated
    }
}

fn component_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        safe_filename(fallback)
    } else {
        safe_filename(value)
    }
}

/// Destination for a track; `ext` includes its leading dot.
pub fn track_path(root: &Path, tags: &TrackTags, ext: &str) -> PathBuf {
    let artist_dir = component_or(&tags.artist, UNKNOWN_ARTIST);
    let album_dir = component_or(&tags.album, UNKNOWN_ALBUM);
    let song_name = component_or(&tags.title, UNTITLED);
    root.join(artist_dir)
        .join(album_dir)
        .join(format!("{}{}", song_name, ext))
}

/// Append ` (1)`, ` (2)`, ... to the stem until the path is free.
pub fn dedupe_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let suffix = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1..)
        .map(|i| path.with_file_name(format!("{} ({}){}", stem, i, suffix)))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}
