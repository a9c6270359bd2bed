//! Locating records: collection alias and item pointer
//!
//! Search results and compound children identify their record in several
//! ways depending on the CONTENTdm version. Newer sites send
//! `collectionAlias` + `itemId`; older ones only carry a link to the item
//! page or a bare `id`/`pointer`/`dmrecord`.

use crate::domain::value;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

const LINK_KEYS: [&str; 4] = ["itemLink", "find", "link", "itemLinkUrl"];

fn item_link_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"/digital/collection/([^/]+)/id/(\d+)").unwrap())
}

/// Where a record lives: its collection alias and, when known, its pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLocation {
    pub alias: String,
    pub pointer: Option<String>,
}

impl RecordLocation {
    fn new(alias: impl Into<String>, pointer: Option<String>) -> Self {
        RecordLocation {
            alias: alias.into(),
            pointer,
        }
    }
}

/// Parse `/digital/collection/<alias>/id/<pointer>` out of any link field.
fn location_from_links(item: &Value) -> Option<RecordLocation> {
    LINK_KEYS.iter().find_map(|key| {
        let link = item.get(*key)?.as_str()?;
        let captures = item_link_regex().captures(link)?;
        Some(RecordLocation::new(
            &captures[1],
            Some(captures[2].to_string()),
        ))
    })
}

/// Locate a search result.
///
/// Preference order: `collectionAlias` + `itemId`, then a parsed item link,
/// then the alias (or `default_alias`) with a legacy `id`/`pointer`/`dmrecord`.
pub fn extract_alias_and_pointer(item: &Value, default_alias: &str) -> RecordLocation {
    let alias = value::field(item, "collectionAlias");
    let pointer = value::field(item, "itemId");
    if let (Some(alias), Some(pointer)) = (&alias, pointer) {
        return RecordLocation::new(alias.clone(), Some(pointer));
    }

    if let Some(location) = location_from_links(item) {
        return location;
    }

    let legacy = value::first_field(item, &["id", "pointer", "dmrecord"]);
    RecordLocation::new(alias.unwrap_or_else(|| default_alias.to_string()), legacy)
}

/// Locate a child of a compound object, inheriting the parent's alias.
pub fn child_alias_and_pointer(child: &Value, parent_alias: &str) -> RecordLocation {
    let alias = value::field(child, "collectionAlias").unwrap_or_else(|| parent_alias.to_string());
    if let Some(pointer) = value::first_field(child, &["itemId", "id", "dmrecord"]) {
        return RecordLocation::new(alias, Some(pointer));
    }

    location_from_links(child).unwrap_or_else(|| RecordLocation::new(alias, None))
}
