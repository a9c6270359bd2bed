//! Resolve a search result to one downloadable media file
//!
//! Order of attempts for a record:
//! 1. `downloadUri` / `streamUri` on its single-item JSON
//! 2. the classic `files` array
//! 3. the children of a compound object, first child with media wins

use crate::domain::media::{pick_from_files, pick_from_single_item};
use crate::domain::record::{child_alias_and_pointer, extract_alias_and_pointer};
use crate::domain::{value, MediaFilter, PickedMedia};
use crate::infrastructure::{DigitalLibrary, JsonDumper};
use serde_json::Value;

const FILES_PREVIEW_CHARS: usize = 800;

/// A record whose media file was found
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTrack {
    pub alias: String,
    pub pointer: String,
    pub title: String,
    /// Metadata used for tags and path; a compound child's when one matched
    pub meta: Value,
    pub media: PickedMedia,
}

impl ResolvedTrack {
    pub fn source_page(&self, base: &str) -> String {
        source_page(&self.meta, base, &self.alias, &self.pointer)
    }
}

/// Outcome of resolving one search result
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(ResolvedTrack),
    /// No pointer could be derived from the search result
    Unlocated { title: String, keys: Vec<String> },
    /// The record's single-item JSON could not be fetched
    FetchFailed {
        alias: String,
        pointer: String,
        title: String,
        error: String,
    },
    /// Fetched, but neither it nor its children expose acceptable media
    NoMedia {
        alias: String,
        pointer: String,
        title: String,
        meta: Value,
    },
}

impl Resolution {
    /// Multi-line explanation printed for records that are skipped.
    pub fn diagnostics(&self, base: &str) -> Option<String> {
        match self {
            Resolution::Resolved(_) => None,
            Resolution::Unlocated { title, keys } => Some(format!(
                "[skip] cannot extract pointer for title={:?}  item_keys={:?}",
                title, keys
            )),
            Resolution::FetchFailed {
                alias,
                pointer,
                title,
                error,
            } => Some(format!(
                "[error] singleitem fetch failed alias={} id={} title={:?}: {}",
                alias, pointer, title, error
            )),
            Resolution::NoMedia {
                alias,
                pointer,
                title,
                meta,
            } => {
                let files = match meta.get("files") {
                    Some(files) if !files.is_null() && files.as_array().map_or(true, |a| !a.is_empty()) => {
                        let pretty = serde_json::to_string_pretty(files).unwrap_or_default();
                        pretty.chars().take(FILES_PREVIEW_CHARS).collect()
                    }
                    _ => "none".to_string(),
                };
                Some(format!(
                    "[skip] alias={} id={}  title={:?}\n       files: {}\n       source: {}\n       \
                     hint: record may be streaming-only or restricted; rerun with --dump-json to inspect",
                    alias,
                    pointer,
                    title,
                    files,
                    source_page(meta, base, alias, pointer)
                ))
            }
        }
    }
}

/// Public page of a record: its `find` link when absolute, else the
/// standard `/digital/collection/<alias>/id/<pointer>` page.
pub fn source_page(meta: &Value, base: &str, alias: &str, pointer: &str) -> String {
    match value::field(meta, "find") {
        Some(find) if find.starts_with("http") => find,
        _ => format!("{}/digital/collection/{}/id/{}", base, alias, pointer),
    }
}

fn pick_media(meta: &Value, base: &str, filter: MediaFilter) -> Option<PickedMedia> {
    pick_from_single_item(meta, base, filter).or_else(|| pick_from_files(meta.get("files"), filter))
}

/// Resolve one search result.
pub fn resolve_record<L: DigitalLibrary + ?Sized>(
    library: &L,
    item: &Value,
    default_alias: &str,
    filter: MediaFilter,
    dumper: &JsonDumper,
) -> Resolution {
    let location = extract_alias_and_pointer(item, default_alias);
    let mut alias = location.alias;
    let mut title = value::field(item, "title").unwrap_or_else(|| {
        format!(
            "item_{}",
            location.pointer.as_deref().unwrap_or("UNKNOWN")
        )
    });

    let Some(mut pointer) = location.pointer else {
        dumper.unlocated_item(&title, item);
        return Resolution::Unlocated {
            title,
            keys: value::keys(item),
        };
    };

    let mut meta = match library.single_item(&alias, &pointer) {
        Ok(meta) => meta,
        Err(e) => {
            return Resolution::FetchFailed {
                alias,
                pointer,
                title,
                error: e.to_string(),
            }
        }
    };
    dumper.record(&alias, &pointer, &meta);

    log::debug!(
        "[meta] alias={} id={} downloadUri={:?} streamUri={:?}",
        alias,
        pointer,
        meta.get("downloadUri"),
        meta.get("streamUri")
    );

    let base = library.base();
    let mut picked = pick_media(&meta, base, filter);

    if picked.is_none() {
        let children = library.compound_children(&alias, &pointer);
        if !children.is_empty() {
            log::info!(
                "alias={} id={} title={:?}: compound object with {} child(ren)",
                alias,
                pointer,
                title,
                children.len()
            );
        }

        for (idx, child) in children.iter().enumerate() {
            let part = idx + 1;
            let child_location = child_alias_and_pointer(child, &alias);
            let Some(child_pointer) = child_location.pointer else {
                log::warn!("[child {}] no pointer; keys={:?}", part, value::keys(child));
                continue;
            };

            let child_meta = match library.single_item(&child_location.alias, &child_pointer) {
                Ok(child_meta) => child_meta,
                Err(e) => {
                    log::warn!(
                        "[child {}] fetch failed alias={} id={}: {}",
                        part,
                        child_location.alias,
                        child_pointer,
                        e
                    );
                    continue;
                }
            };
            dumper.record(&child_location.alias, &child_pointer, &child_meta);

            if let Some(media) = pick_media(&child_meta, base, filter) {
                let child_title = value::field(&child_meta, "title")
                    .or_else(|| value::field(child, "title"))
                    .unwrap_or_else(|| format!("{} (part {})", title, part));
                if !title.contains(&child_title) {
                    title = format!("{} - {}", title, child_title);
                }
                alias = child_location.alias;
                pointer = child_pointer;
                meta = child_meta;
                picked = Some(media);
                break;
            }
        }
    }

    match picked {
        Some(media) => Resolution::Resolved(ResolvedTrack {
            alias,
            pointer,
            title,
            meta,
            media,
        }),
        None => Resolution::NoMedia {
            alias,
            pointer,
            title,
            meta,
        },
    }
}
