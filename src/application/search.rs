//! Paginated search use case

use crate::error::{CdmError, Result};
use crate::infrastructure::{DigitalLibrary, Settings};
use serde_json::Value;
use std::thread;

/// Collect search results page by page, up to `settings.max` items.
///
/// A failing first page is an error; a later failure ends pagination with
/// what has been collected so far.
pub fn search_items<L: DigitalLibrary + ?Sized>(library: &L, settings: &Settings) -> Result<Vec<Value>> {
    let mut items: Vec<Value> = Vec::new();
    let mut page = 1u32;

    loop {
        let batch = match library.search_page(&settings.collection, &settings.query, page, settings.size) {
            Ok(batch) => batch,
            Err(e) if page == 1 => return Err(CdmError::Search(e.to_string())),
            Err(e) => {
                log::warn!("search stopped at page {}: {}", page, e);
                break;
            }
        };

        let empty = batch.is_empty();
        items.extend(batch);
        if empty || items.len() >= settings.max {
            break;
        }

        page += 1;
        thread::sleep(settings.delay);
    }

    items.truncate(settings.max);
    Ok(items)
}
