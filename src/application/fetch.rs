//! Download pipeline: search -> resolve -> fetch -> tag

use crate::application::resolve::{resolve_record, Resolution, ResolvedTrack};
use crate::application::search::search_items;
use crate::domain::media::absolute;
use crate::domain::naming::{dedupe_path, track_path};
use crate::domain::{RetagPolicy, TagOutcome, TrackTags};
use crate::error::Result;
use crate::infrastructure::{DigitalLibrary, JsonDumper, Settings, TagWriter};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

/// Tally of tagging outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagCounts {
    pub skipped: usize,
    pub updated: usize,
    pub overwritten: usize,
}

impl TagCounts {
    fn record(&mut self, outcome: TagOutcome) {
        match outcome {
            TagOutcome::Skipped => self.skipped += 1,
            TagOutcome::Updated => self.updated += 1,
            TagOutcome::Overwritten => self.overwritten += 1,
        }
    }
}

/// What a run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub found: usize,
    pub printed: usize,
    pub downloaded: usize,
    pub failed: usize,
    pub unresolved: usize,
    pub tagged: TagCounts,
    pub output_root: PathBuf,
    pub print_urls: bool,
    pub retag: RetagPolicy,
    pub aria2c_list: Option<PathBuf>,
}

impl RunReport {
    fn new(settings: &Settings, output_root: PathBuf) -> Self {
        RunReport {
            found: 0,
            printed: 0,
            downloaded: 0,
            failed: 0,
            unresolved: 0,
            tagged: TagCounts::default(),
            output_root,
            print_urls: settings.print_urls,
            retag: settings.retag,
            aria2c_list: settings.aria2c_list.clone(),
        }
    }
}

/// Where a resolved track goes and what it is tagged with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTrack {
    pub tags: TrackTags,
    pub media_url: String,
    pub dest: PathBuf,
}

/// Build tags and destination for a resolved track.
pub fn plan_track(track: &ResolvedTrack, settings: &Settings, output_root: &Path) -> PlannedTrack {
    let base = settings.base_url();
    let album_override = settings.album_override();
    let tags = TrackTags::from_metadata(
        &track.meta,
        &track.title,
        &track.source_page(base),
        album_override.as_deref(),
    );
    let media_url = absolute(base, &track.media.url);
    let ext = track.media.extension(settings.media);
    let dest = dedupe_path(&track_path(output_root, &tags, &ext));

    PlannedTrack {
        tags,
        media_url,
        dest,
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn is_mp3(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("mp3"))
        .unwrap_or(false)
}

/// Run the whole pipeline once.
///
/// Only search failures abort the run; every per-record problem is logged
/// and the record skipped.
pub fn run<L, W>(library: &L, writer: &W, settings: &Settings) -> Result<RunReport>
where
    L: DigitalLibrary + ?Sized,
    W: TagWriter + ?Sized,
{
    let writes_files = !settings.dry_run && !settings.print_urls;
    let output_root = if writes_files {
        fs::create_dir_all(&settings.output_root)?;
        fs::canonicalize(&settings.output_root)?
    } else {
        settings.output_root.clone()
    };
    let mut report = RunReport::new(settings, output_root.clone());

    let dumper = if settings.dump_json {
        JsonDumper::enabled(&settings.dump_dir)?
    } else {
        JsonDumper::disabled()
    };

    let items = search_items(library, settings)?;
    report.found = items.len();
    if items.is_empty() {
        println!("No results found.");
        return Ok(report);
    }

    println!(
        "Found {} items for query: {:?} in collection {:?}\n",
        items.len(),
        settings.query,
        settings.collection
    );
    if dumper.is_enabled() {
        dumper.search_items(&items);
    }

    let mut aria_lines: Vec<String> = Vec::new();

    for item in &items {
        let track = match resolve_record(library, item, &settings.collection, settings.media, &dumper) {
            Resolution::Resolved(track) => track,
            unresolved => {
                if let Some(text) = unresolved.diagnostics(settings.base_url()) {
                    log::warn!("{}", text);
                }
                report.unresolved += 1;
                continue;
            }
        };

        let plan = plan_track(&track, settings, &output_root);
        println!(
            "[pick] alias={} id={} -> {}  mime={:?}  url={}",
            track.alias,
            track.pointer,
            plan.dest.display(),
            track.media.mime,
            plan.media_url
        );

        if settings.print_urls {
            println!("{}\n{}\n", plan.tags.title, plan.media_url);
            report.printed += 1;
            if settings.aria2c_list.is_some() {
                aria_lines.push(plan.media_url.clone());
            }
            continue;
        }

        if !settings.dry_run {
            if let Err(e) = fetch_and_tag(library, writer, settings, &plan, &mut report) {
                log::error!("[error] {}: {}", plan.tags.title, e);
                report.failed += 1;
                continue;
            }
        }

        thread::sleep(settings.delay);
    }

    if let Some(path) = &settings.aria2c_list {
        fs::write(path, aria_lines.join("\n"))?;
        println!("\nWrote aria2c URL list: {}", path.display());
    }

    Ok(report)
}

/// Download one planned track, then tag it when it is an MP3.
///
/// Tagging failures are logged, not returned: the file is already on disk.
fn fetch_and_tag<L, W>(
    library: &L,
    writer: &W,
    settings: &Settings,
    plan: &PlannedTrack,
    report: &mut RunReport,
) -> Result<()>
where
    L: DigitalLibrary + ?Sized,
    W: TagWriter + ?Sized,
{
    if let Some(parent) = plan.dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let bytes = library.download(&plan.media_url, &plan.dest)?;
    println!("  [ok] {}", file_name(&plan.dest));
    log::debug!("wrote {} bytes to {}", bytes, plan.dest.display());
    report.downloaded += 1;

    if is_mp3(&plan.dest) {
        match writer.apply(&plan.dest, &plan.tags, settings.retag) {
            Ok(outcome) => {
                report.tagged.record(outcome);
                println!("  [tag] {}: {}", file_name(&plan.dest), outcome);
            }
            Err(e) => log::warn!("  [tag] {}: {}", file_name(&plan.dest), e),
        }
    }

    Ok(())
}
