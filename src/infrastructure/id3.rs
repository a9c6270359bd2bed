//! ID3v2 tagging of downloaded MP3 files

use crate::domain::{RetagPolicy, TagOutcome, TrackTags};
use crate::error::{CdmError, Result};
use lofty::config::WriteOptions;
use lofty::file::TaggedFileExt;
use lofty::id3::v2::Id3v2Tag;
use lofty::read_from_path;
use lofty::tag::{ItemKey, Tag, TagExt, TagType};
use std::path::Path;

pub const SOURCE_URL_DESC: &str = "SOURCE_URL";
pub const CONTENTDM_ID_DESC: &str = "CONTENTDM_ID";

/// Writes tags into audio files
pub trait TagWriter {
    fn apply(&self, path: &Path, tags: &TrackTags, policy: RetagPolicy) -> Result<TagOutcome>;
}

/// `TagWriter` for MP3 files, backed by `lofty`
#[derive(Debug, Clone, Copy, Default)]
pub struct Id3Writer;

impl TagWriter for Id3Writer {
    fn apply(&self, path: &Path, tags: &TrackTags, policy: RetagPolicy) -> Result<TagOutcome> {
        apply_id3(path, tags, policy)
    }
}

fn tagging_error(path: &Path, message: impl ToString) -> CdmError {
    CdmError::Tagging {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

/// Set `key` to `value` unless the value is empty or (when not
/// overwriting) the tag already carries a non-empty value for it.
fn set_text(tag: &mut Tag, key: ItemKey, value: &str, overwrite: bool) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }
    let existing = tag
        .get_string(key.clone())
        .map(|current| !current.trim().is_empty())
        .unwrap_or(false);
    if overwrite || !existing {
        tag.insert_text(key, value.to_string());
    }
}

/// Tag `path` according to `policy`.
///
/// `Skip` leaves the file untouched. The `SOURCE_URL` and `CONTENTDM_ID`
/// user text frames are rewritten under both other policies.
pub fn apply_id3(path: &Path, tags: &TrackTags, policy: RetagPolicy) -> Result<TagOutcome> {
    if policy == RetagPolicy::Skip {
        return Ok(TagOutcome::Skipped);
    }
    let overwrite = policy == RetagPolicy::Overwrite;

    let tagged_file = read_from_path(path).map_err(|e| tagging_error(path, e))?;
    if tagged_file.file_type() != lofty::file::FileType::Mpeg {
        return Err(tagging_error(path, "not an MPEG audio file"));
    }

    let mut tag = tagged_file
        .tag(TagType::Id3v2)
        .cloned()
        .unwrap_or_else(|| Tag::new(TagType::Id3v2));

    set_text(&mut tag, ItemKey::TrackTitle, &tags.title, overwrite);
    set_text(&mut tag, ItemKey::TrackArtist, &tags.artist, overwrite);
    set_text(&mut tag, ItemKey::AlbumTitle, &tags.album, overwrite);
    set_text(&mut tag, ItemKey::Genre, &tags.genre, overwrite);
    set_text(&mut tag, ItemKey::Composer, &tags.composer, overwrite);
    set_text(&mut tag, ItemKey::RecordingDate, &tags.year, overwrite);
    set_text(&mut tag, ItemKey::Comment, &tags.comment, overwrite);

    let mut id3: Id3v2Tag = tag.into();
    for (description, content) in [
        (SOURCE_URL_DESC, &tags.source_url),
        (CONTENTDM_ID_DESC, &tags.cdm_id),
    ] {
        if overwrite {
            id3.remove_user_text(description);
        }
        if !content.is_empty() {
            id3.insert_user_text(description.to_string(), content.clone());
        }
    }

    id3.save_to_path(path, WriteOptions::default())
        .map_err(|e| tagging_error(path, e))?;

    Ok(if overwrite {
        TagOutcome::Overwritten
    } else {
        TagOutcome::Updated
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lofty::prelude::Accessor;
    use std::fs;
    use tempfile::TempDir;

    /// A few silent MPEG-1 Layer III frames (128 kbps, 44.1 kHz).
    fn silent_mp3() -> Vec<u8> {
        const FRAME_LEN: usize = 417;
        let mut bytes = Vec::with_capacity(FRAME_LEN * 12);
        for _ in 0..12 {
            let mut frame = vec![0u8; FRAME_LEN];
            frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x64]);
            bytes.extend_from_slice(&frame);
        }
        bytes
    }

    fn sample_tags(title: &str) -> TrackTags {
        TrackTags {
            title: title.to_string(),
            artist: "Jean Ritchie".to_string(),
            album: "Berea College Collection".to_string(),
            year: "1952".to_string(),
            genre: "Ballads".to_string(),
            composer: String::new(),
            comment: "Source: https://example.org/5".to_string(),
            source_url: "https://example.org/5".to_string(),
            cdm_id: "5".to_string(),
        }
    }

    fn read_title(path: &Path) -> Option<String> {
        let file = read_from_path(path).unwrap();
        file.tag(TagType::Id3v2)
            .and_then(|tag| tag.title().map(|t| t.into_owned()))
    }

    #[test]
    fn test_skip_leaves_file_untouched() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("song.mp3");
        fs::write(&path, silent_mp3()).unwrap();

        let outcome = apply_id3(&path, &sample_tags("Pretty Saro"), RetagPolicy::Skip).unwrap();
        assert_eq!(outcome, TagOutcome::Skipped);
        assert_eq!(fs::read(&path).unwrap(), silent_mp3());
    }

    #[test]
    fn test_update_writes_missing_frames() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("song.mp3");
        fs::write(&path, silent_mp3()).unwrap();

        let outcome = apply_id3(&path, &sample_tags("Pretty Saro"), RetagPolicy::Update).unwrap();
        assert_eq!(outcome, TagOutcome::Updated);

        let file = read_from_path(&path).unwrap();
        let tag = file.tag(TagType::Id3v2).unwrap();
        assert_eq!(tag.title().as_deref(), Some("Pretty Saro"));
        assert_eq!(tag.artist().as_deref(), Some("Jean Ritchie"));
        assert_eq!(tag.album().as_deref(), Some("Berea College Collection"));
    }

    #[test]
    fn test_update_keeps_existing_but_overwrite_replaces() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("song.mp3");
        fs::write(&path, silent_mp3()).unwrap();

        apply_id3(&path, &sample_tags("First"), RetagPolicy::Update).unwrap();
        apply_id3(&path, &sample_tags("Second"), RetagPolicy::Update).unwrap();
        assert_eq!(read_title(&path).as_deref(), Some("First"));

        let outcome = apply_id3(&path, &sample_tags("Third"), RetagPolicy::Overwrite).unwrap();
        assert_eq!(outcome, TagOutcome::Overwritten);
        assert_eq!(read_title(&path).as_deref(), Some("Third"));
    }

    #[test]
    fn test_rejects_non_audio() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.txt");
        fs::write(&path, b"this is not audio at all").unwrap();

        let err = apply_id3(&path, &sample_tags("x"), RetagPolicy::Update).unwrap_err();
        match err {
            CdmError::Tagging { .. } => {}
            other => panic!("Expected Tagging error, got {:?}", other),
        }
    }
}
