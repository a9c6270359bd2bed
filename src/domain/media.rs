//! Choosing the playable media file of a record
//!
//! A CONTENTdm record can expose its file three ways: a `downloadUri` on the
//! single-item JSON, a `streamUri` pointing at the dmwebservices byte
//! stream, or a classic `files` array on older installs.

use crate::domain::value;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::str::FromStr;

const AUDIO_EXTENSIONS: [&str; 10] = [
    ".mp3", ".m4a", ".mp4", ".wav", ".aac", ".aiff", ".aif", ".flac", ".ogg", ".oga",
];

/// Which media files are acceptable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaFilter {
    /// Any `audio/*` MIME type or known audio extension
    #[default]
    Audio,
    /// MPEG audio only
    Mp3,
}

impl MediaFilter {
    /// Does a file with this name and MIME type qualify?
    pub fn accepts(&self, name: &str, mime: &str) -> bool {
        let name = name.to_lowercase();
        let mime = mime.to_lowercase();
        match self {
            MediaFilter::Audio => {
                mime.starts_with("audio/") || AUDIO_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
            }
            MediaFilter::Mp3 => mime.contains("audio/mpeg") || name.ends_with(".mp3"),
        }
    }
}

impl FromStr for MediaFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "audio" => Ok(MediaFilter::Audio),
            "mp3" => Ok(MediaFilter::Mp3),
            _ => Err(format!(
                "Invalid media filter: '{}'. Valid filters are: audio, mp3",
                s
            )),
        }
    }
}

/// The file chosen for a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedMedia {
    pub url: String,
    pub suggested_name: String,
    pub mime: String,
}

impl PickedMedia {
    /// File extension (with leading dot) for the downloaded file.
    ///
    /// Taken from the suggested name when it has one; otherwise guessed from
    /// the MIME type, falling back to `.bin`.
    pub fn extension(&self, filter: MediaFilter) -> String {
        if let Some(ext) = Path::new(&self.suggested_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
        {
            return format!(".{}", ext.to_lowercase());
        }

        if filter == MediaFilter::Mp3 || self.mime.to_lowercase().contains("mpeg") {
            ".mp3".to_string()
        } else {
            ".bin".to_string()
        }
    }
}

/// Make a CONTENTdm-relative URL absolute.
///
/// The JSON API often returns `/api/...` paths that live under `/digital`.
pub fn absolute(base: &str, url: &str) -> String {
    if url.is_empty() || url.starts_with("http") {
        return url.to_string();
    }
    let base = base.trim_end_matches('/');
    if url.starts_with("/digital") {
        format!("{}{}", base, url)
    } else {
        format!("{}/digital{}", base, url)
    }
}

/// Raw byte stream for a dmwebservices URI (drops a trailing `/json`).
pub fn resolve_stream_url(stream_uri: &str) -> &str {
    stream_uri.strip_suffix("/json").unwrap_or(stream_uri)
}

/// Pick from a classic `files` array: first acceptable entry with a URL.
pub fn pick_from_files(files: Option<&Value>, filter: MediaFilter) -> Option<PickedMedia> {
    let files = files?.as_array()?;

    let candidates: Vec<PickedMedia> = files
        .iter()
        .filter_map(|file| {
            let name = value::field(file, "name").unwrap_or_default();
            let mime = value::field(file, "mime").unwrap_or_default();
            if !filter.accepts(&name, &mime) {
                return None;
            }
            let url = value::first_field(file, &["download", "file"])?;
            Some(PickedMedia {
                url,
                suggested_name: name,
                mime,
            })
        })
        .collect();

    log::debug!(
        "    files: {:?}",
        files
            .iter()
            .map(|f| (
                value::field(f, "name"),
                value::field(f, "mime"),
                f.get("download").is_some(),
                f.get("file").is_some()
            ))
            .collect::<Vec<_>>()
    );
    log::debug!(
        "    candidates: {:?}",
        candidates
            .iter()
            .map(|c| (&c.suggested_name, &c.mime))
            .collect::<Vec<_>>()
    );

    candidates.into_iter().next()
}

/// Pick from modern single-item JSON (`downloadUri`, then `streamUri`).
pub fn pick_from_single_item(meta: &Value, base: &str, filter: MediaFilter) -> Option<PickedMedia> {
    let name = value::field(meta, "filename").unwrap_or_default();
    let mime = value::field(meta, "contentType").unwrap_or_default();

    if let Some(download_uri) = value::field(meta, "downloadUri") {
        if filter.accepts(&name, &mime) {
            return Some(PickedMedia {
                url: absolute(base, &download_uri),
                suggested_name: name,
                mime,
            });
        }
    }

    let stream_uri = value::field(meta, "streamUri")?;
    let url = resolve_stream_url(&stream_uri).to_string();
    let suggested_name = if name.is_empty() {
        let without_query = url.split('?').next().unwrap_or_default();
        without_query
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or("audio")
            .to_string()
    } else {
        name
    };

    Some(PickedMedia {
        url,
        suggested_name,
        mime,
    })
}
