//! CLI argument definitions

use crate::domain::{MediaFilter, RetagPolicy};
use crate::error::{CdmError, Result};
use crate::infrastructure::settings::delay_from_secs;
use crate::infrastructure::{FileConfig, Settings};
use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "cdm-audio")]
#[command(
    about = "Download audio from a CONTENTdm collection search (handles compound objects) and tag MP3s",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Search query string
    #[arg(long)]
    pub query: String,

    /// CONTENTdm base URL [default: https://dla.contentdm.oclc.org]
    #[arg(long)]
    pub base: Option<String>,

    /// Collection alias used for search (and as fallback alias) [default: berea]
    #[arg(long)]
    pub collection: Option<String>,

    /// Items per search page [default: 100]
    #[arg(long)]
    pub size: Option<u32>,

    /// Maximum number of records to scan [default: 2000]
    #[arg(long = "max", value_name = "MAX")]
    pub max_records: Option<usize>,

    /// Delay between requests, in seconds [default: 0.2]
    #[arg(long)]
    pub delay: Option<f64>,

    /// Root output directory [default: output]
    #[arg(long, value_name = "DIR")]
    pub output_root: Option<PathBuf>,

    /// College name; album becomes "<College Name> Collection" [default: Berea College]
    #[arg(long)]
    pub college_name: Option<String>,

    /// Print title and media URL per record, download nothing
    #[arg(long, alias = "print_urls")]
    pub print_urls: bool,

    /// Write collected media URLs to FILE as an aria2c input list
    #[arg(long, alias = "aria2c_list", value_name = "FILE")]
    pub aria2c_list: Option<PathBuf>,

    /// ID3 tag policy for MP3s (skip, update, overwrite) [default: update]
    #[arg(long)]
    pub retag: Option<String>,

    /// Do everything except write files
    #[arg(long)]
    pub dry_run: bool,

    /// Accept any audio (audio) or only MP3 (mp3) [default: audio]
    #[arg(long)]
    pub media: Option<String>,

    /// Extra logging (candidate decisions, requests)
    #[arg(short, long)]
    pub verbose: bool,

    /// Dump each raw JSON record into the dump directory
    #[arg(long)]
    pub dump_json: bool,

    /// Retries for transient HTTP failures [default: 2]
    #[arg(long)]
    pub retries: Option<u32>,

    /// TOML settings file (also read from CDM_AUDIO_CONFIG)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Resolve settings: flags over the settings file over defaults.
    pub fn settings(&self, file: FileConfig) -> Result<Settings> {
        let mut settings = Settings::new(self.query.clone());
        settings.apply_file(file)?;

        if let Some(base) = &self.base {
            settings.base = base.clone();
        }
        if let Some(collection) = &self.collection {
            settings.collection = collection.clone();
        }
        if let Some(size) = self.size {
            settings.size = size;
        }
        if let Some(max) = self.max_records {
            settings.max = max;
        }
        if let Some(delay) = self.delay {
            settings.delay = delay_from_secs(delay)?;
        }
        if let Some(output_root) = &self.output_root {
            settings.output_root = output_root.clone();
        }
        if let Some(college_name) = &self.college_name {
            settings.college_name = college_name.clone();
        }
        if let Some(retag) = &self.retag {
            settings.retag = RetagPolicy::from_str(retag).map_err(CdmError::Config)?;
        }
        if let Some(media) = &self.media {
            settings.media = MediaFilter::from_str(media).map_err(CdmError::Config)?;
        }
        if let Some(retries) = self.retries {
            settings.retries = retries;
        }
        settings.print_urls = self.print_urls;
        settings.aria2c_list = self.aria2c_list.clone();
        settings.dry_run = self.dry_run;
        settings.dump_json = self.dump_json;

        settings.validate()?;
        Ok(settings)
    }
}
