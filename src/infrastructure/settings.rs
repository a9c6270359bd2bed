//! Run settings: built-in defaults, optional TOML file, CLI overrides

use crate::domain::{MediaFilter, RetagPolicy};
use crate::error::{CdmError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE: &str = "https://dla.contentdm.oclc.org";
pub const CONFIG_ENV: &str = "CDM_AUDIO_CONFIG";

/// Values read from a settings file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub base: Option<String>,
    pub collection: Option<String>,
    pub size: Option<u32>,
    pub max: Option<usize>,
    pub delay: Option<f64>,
    pub output_root: Option<PathBuf>,
    pub college_name: Option<String>,
    pub retag: Option<RetagPolicy>,
    pub media: Option<MediaFilter>,
    pub retries: Option<u32>,
    pub dump_dir: Option<PathBuf>,
}

impl FileConfig {
    /// Load a settings file; a missing file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CdmError::Config(format!("config file not found: {}", path.display()))
            } else {
                CdmError::Io(e)
            }
        })?;

        Ok(toml::from_str(&contents)?)
    }

    /// Load from an explicit path, else from `CDM_AUDIO_CONFIG`, else nothing.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::load(Path::new(&path)),
            _ => Ok(FileConfig::default()),
        }
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base: String,
    pub collection: String,
    pub query: String,
    pub size: u32,
    pub max: usize,
    pub delay: Duration,
    pub output_root: PathBuf,
    pub college_name: String,
    pub print_urls: bool,
    pub aria2c_list: Option<PathBuf>,
    pub retag: RetagPolicy,
    pub dry_run: bool,
    pub media: MediaFilter,
    pub dump_json: bool,
    pub dump_dir: PathBuf,
    pub retries: u32,
}

impl Settings {
    /// Defaults for a query, before any file or CLI overrides.
    pub fn new(query: impl Into<String>) -> Self {
        Settings {
            base: DEFAULT_BASE.to_string(),
            collection: "berea".to_string(),
            query: query.into(),
            size: 100,
            max: 2000,
            delay: Duration::from_millis(200),
            output_root: PathBuf::from("output"),
            college_name: "Berea College".to_string(),
            print_urls: false,
            aria2c_list: None,
            retag: RetagPolicy::Update,
            dry_run: false,
            media: MediaFilter::Audio,
            dump_json: false,
            dump_dir: PathBuf::from("_debug_json"),
            retries: 2,
        }
    }

    /// Layer a settings file over the defaults.
    pub fn apply_file(&mut self, file: FileConfig) -> Result<()> {
        if let Some(base) = file.base {
            self.base = base;
        }
        if let Some(collection) = file.collection {
            self.collection = collection;
        }
        if let Some(size) = file.size {
            self.size = size;
        }
        if let Some(max) = file.max {
            self.max = max;
        }
        if let Some(delay) = file.delay {
            self.delay = delay_from_secs(delay)?;
        }
        if let Some(output_root) = file.output_root {
            self.output_root = output_root;
        }
        if let Some(college_name) = file.college_name {
            self.college_name = college_name;
        }
        if let Some(retag) = file.retag {
            self.retag = retag;
        }
        if let Some(media) = file.media {
            self.media = media;
        }
        if let Some(retries) = file.retries {
            self.retries = retries;
        }
        if let Some(dump_dir) = file.dump_dir {
            self.dump_dir = dump_dir;
        }
        Ok(())
    }

    /// Check ranges that clap and serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(CdmError::Config("size must be at least 1".to_string()));
        }
        if self.max == 0 {
            return Err(CdmError::Config("max must be at least 1".to_string()));
        }
        if self.query.trim().is_empty() {
            return Err(CdmError::Config("query must not be empty".to_string()));
        }
        if !self.base.starts_with("http://") && !self.base.starts_with("https://") {
            return Err(CdmError::Config(format!(
                "base must be an http(s) URL, got '{}'",
                self.base
            )));
        }
        Ok(())
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base.trim_end_matches('/')
    }

    /// `"<College Name> Collection"`, or `None` when no college name is set.
    pub fn album_override(&self) -> Option<String> {
        let college = self.college_name.trim();
        if college.is_empty() {
            None
        } else {
            Some(format!("{} Collection", college))
        }
    }
}

/// Convert a delay in (fractional) seconds, rejecting negative values.
pub fn delay_from_secs(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| CdmError::Config(format!("delay must be a non-negative number, got {}", secs)))
}
