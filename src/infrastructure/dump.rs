//! Raw JSON dumps for inspecting records that resolve badly

use crate::domain::naming::safe_filename;
use crate::error::Result;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes pretty-printed JSON into a dump directory when enabled.
///
/// Dump failures never stop a run; they are logged and ignored.
#[derive(Debug, Clone)]
pub struct JsonDumper {
    dir: Option<PathBuf>,
}

impl JsonDumper {
    /// A dumper that writes nothing
    pub fn disabled() -> Self {
        JsonDumper { dir: None }
    }

    /// A dumper writing into `dir`, created if needed
    pub fn enabled(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(JsonDumper {
            dir: Some(dir.to_path_buf()),
        })
    }

    /// Whether anything will be written
    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    /// All search results, as fetched
    pub fn search_items(&self, items: &[Value]) {
        self.write("_search_items.json", &Value::Array(items.to_vec()));
    }

    /// One fetched record (parent or compound child)
    pub fn record(&self, alias: &str, pointer: &str, meta: &Value) {
        let stem = safe_filename(&format!("{}_{}", alias, pointer));
        self.write(&format!("{}.json", stem), meta);
    }

    /// A search result we could not locate
    pub fn unlocated_item(&self, title: &str, item: &Value) {
        let stem: String = safe_filename(title).chars().take(60).collect();
        self.write(&format!("_search_item_{}.json", stem), item);
    }

    fn write(&self, file_name: &str, value: &Value) {
        let Some(dir) = &self.dir else {
            return;
        };
        let path = dir.join(file_name);
        let result = serde_json::to_string_pretty(value)
            .map_err(std::io::Error::from)
            .and_then(|json| fs::write(&path, json));
        if let Err(e) = result {
            log::warn!("could not write JSON dump {}: {}", path.display(), e);
        }
    }
}
