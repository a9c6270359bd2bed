//! Mapping CONTENTdm record metadata onto track tags
//!
//! Classic records carry Dublin Core style top-level keys (`title`,
//! `creator`, `subject`, ...). Modern single-item JSON instead has a
//! `fields` list of `{label, value}` pairs; those labels only fill gaps
//! left by the top-level keys.

use crate::domain::value::{self, first_nonempty};
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

pub const UNTITLED: &str = "Untitled";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";
const DEFAULT_ALBUM: &str = "CONTENTdm Audio";

fn year_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\b(1[89]\d{2}|20\d{2}|21\d{2})\b").unwrap())
}

/// Extract the first plausible four-digit year (1800-2199).
pub fn extract_year(text: &str) -> Option<String> {
    year_regex()
        .captures(text)
        .map(|captures| captures[1].to_string())
}

/// Tag values for one downloaded track; also drives its output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackTags {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: String,
    pub genre: String,
    pub composer: String,
    pub comment: String,
    pub source_url: String,
    pub cdm_id: String,
}

impl TrackTags {
    /// Build tags from a record's JSON.
    ///
    /// `album_override` (the "<College> Collection" label) wins over any
    /// album-like field in the record.
    pub fn from_metadata(
        meta: &Value,
        title_fallback: &str,
        source_url: &str,
        album_override: Option<&str>,
    ) -> Self {
        let mut title = first_nonempty([value::field(meta, "title"), Some(title_fallback.to_string())]);
        let mut artist = value::first_field(meta, &["creator", "contributor"]);
        let mut genre = value::field(meta, "subject");
        let mut description = value::field(meta, "description");
        let mut rights = value::field(meta, "rights");
        let mut album = album_override
            .map(str::to_string)
            .or_else(|| value::first_field(meta, &["collection", "publisher"]));
        let year = value::first_field(meta, &["date", "coverage"]).and_then(|d| extract_year(&d));
        let composer = value::field(meta, "creator");

        if let Some(labels) = labelled_fields(meta) {
            let label = |name: &str| labels.get(name).cloned();
            title = title.or_else(|| label("title"));
            artist = artist
                .or_else(|| label("primary performer / group"))
                .or_else(|| label("creator"));
            genre = genre.or_else(|| label("subject"));
            description = description.or_else(|| label("description"));
            rights = rights.or_else(|| label("rights"));
            album = album
                .or_else(|| label("relation"))
                .or_else(|| label("holding library"));
        }

        let mut comment_lines = Vec::new();
        if let Some(desc) = description {
            comment_lines.push(desc);
        }
        comment_lines.push(format!("Source: {}", source_url));
        if let Some(rights) = rights {
            comment_lines.push(format!("Rights: {}", rights));
        }

        TrackTags {
            title: title.unwrap_or_else(|| UNTITLED.to_string()),
            artist: artist.unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            album: album.unwrap_or_else(|| DEFAULT_ALBUM.to_string()),
            year: year.unwrap_or_default(),
            genre: genre.unwrap_or_default(),
            composer: composer.unwrap_or_default(),
            comment: comment_lines.join("\n"),
            source_url: source_url.to_string(),
            cdm_id: value::first_field(meta, &["id", "pointer"]).unwrap_or_default(),
        }
    }
}

/// Lower-cased `label` -> text `value` for the modern `fields` list.
fn labelled_fields(meta: &Value) -> Option<HashMap<String, String>> {
    let fields = meta.get("fields")?.as_array()?;
    let labels = fields
        .iter()
        .filter_map(|field| {
            let label = field.get("label")?.as_str()?.trim().to_lowercase();
            let text = value::field(field, "value")?;
            Some((label, text))
        })
        .collect();
    Some(labels)
}
