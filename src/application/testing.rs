//! In-memory `DigitalLibrary` for use case tests

use crate::error::{CdmError, Result};
use crate::infrastructure::DigitalLibrary;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const FAKE_BASE: &str = "https://cdm.test";

#[derive(Default)]
pub struct FakeLibrary {
    pages: HashMap<u32, Vec<Value>>,
    fail_search_from: Option<u32>,
    items: HashMap<(String, String), Value>,
    children: HashMap<(String, String), Vec<Value>>,
    media: HashMap<String, Vec<u8>>,
    search_calls: Cell<u32>,
    downloads: RefCell<Vec<String>>,
}

impl FakeLibrary {
    pub fn new() -> Self {
        FakeLibrary::default()
    }

    pub fn with_page(mut self, page: u32, items: Vec<Value>) -> Self {
        self.pages.insert(page, items);
        self
    }

    pub fn failing_search_from(mut self, page: u32) -> Self {
        self.fail_search_from = Some(page);
        self
    }

    pub fn with_item(mut self, alias: &str, pointer: &str, meta: Value) -> Self {
        self.items
            .insert((alias.to_string(), pointer.to_string()), meta);
        self
    }

    pub fn with_children(mut self, alias: &str, pointer: &str, children: Vec<Value>) -> Self {
        self.children
            .insert((alias.to_string(), pointer.to_string()), children);
        self
    }

    pub fn with_media(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.media.insert(url.to_string(), bytes);
        self
    }

    pub fn search_calls(&self) -> u32 {
        self.search_calls.get()
    }

    pub fn downloads(&self) -> Vec<String> {
        self.downloads.borrow().clone()
    }
}

impl DigitalLibrary for FakeLibrary {
    fn base(&self) -> &str {
        FAKE_BASE
    }

    fn search_page(&self, _collection: &str, _query: &str, page: u32, _size: u32) -> Result<Vec<Value>> {
        self.search_calls.set(self.search_calls.get() + 1);
        if self.fail_search_from.is_some_and(|from| page >= from) {
            return Err(CdmError::HttpStatus {
                status: 500,
                url: format!("search page {}", page),
            });
        }
        Ok(self.pages.get(&page).cloned().unwrap_or_default())
    }

    fn single_item(&self, alias: &str, pointer: &str) -> Result<Value> {
        self.items
            .get(&(alias.to_string(), pointer.to_string()))
            .cloned()
            .ok_or_else(|| CdmError::HttpStatus {
                status: 404,
                url: format!("singleitem {}/{}", alias, pointer),
            })
    }

    fn compound_children(&self, alias: &str, pointer: &str) -> Vec<Value> {
        self.children
            .get(&(alias.to_string(), pointer.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        self.downloads.borrow_mut().push(url.to_string());
        let bytes = self.media.get(url).ok_or_else(|| CdmError::HttpStatus {
            status: 404,
            url: url.to_string(),
        })?;
        fs::write(dest, bytes)?;
        Ok(bytes.len() as u64)
    }
}
