//! CONTENTdm JSON API client

use crate::error::{CdmError, Result};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

pub const USER_AGENT: &str = "cdm-audio-cli/1.5 (+noncommercial)";
const ACCEPT: &str = "application/json, */*;q=0.5";
const API_TIMEOUT: Duration = Duration::from_secs(30);
const MEDIA_TIMEOUT: Duration = Duration::from_secs(120);
const BACKOFF_BASE: Duration = Duration::from_millis(250);
const BACKOFF_CAP: Duration = Duration::from_secs(4);

/// The remote operations the download pipeline needs
pub trait DigitalLibrary {
    /// Base URL of the site, without a trailing slash
    fn base(&self) -> &str;

    /// One page of search results (`items` of the search response)
    fn search_page(&self, collection: &str, query: &str, page: u32, size: u32) -> Result<Vec<Value>>;

    /// Single-item JSON for a record
    fn single_item(&self, alias: &str, pointer: &str) -> Result<Value>;

    /// Children of a compound object; empty when none could be fetched
    fn compound_children(&self, alias: &str, pointer: &str) -> Vec<Value>;

    /// Stream `url` into `dest`, returning the number of bytes written
    fn download(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// `DigitalLibrary` over HTTP, backed by `ureq`
///
/// API calls and media downloads use separate agents. Their timeouts bound
/// each socket read, not the whole transfer.
pub struct HttpLibrary {
    base: String,
    api: ureq::Agent,
    media: ureq::Agent,
    retries: u32,
}

fn build_agent(read_timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(10))
        .timeout_read(read_timeout)
        .timeout_write(Duration::from_secs(15))
        .user_agent(USER_AGENT)
        .build()
}

impl HttpLibrary {
    pub fn new(base: &str, retries: u32) -> Self {
        Self::with_read_timeouts(base, retries, API_TIMEOUT, MEDIA_TIMEOUT)
    }

    /// Like `new`, with explicit idle-read timeouts for API and media requests.
    pub fn with_read_timeouts(base: &str, retries: u32, api: Duration, media: Duration) -> Self {
        HttpLibrary {
            base: base.trim_end_matches('/').to_string(),
            api: build_agent(api),
            media: build_agent(media),
            retries,
        }
    }

    pub fn search_url(&self, collection: &str, query: &str, page: u32, size: u32) -> String {
        format!(
            "{}/digital/api/search/collection/{}/searchterm/{}/field/all/mode/all/conn/and/page/{}/size/{}",
            self.base,
            collection,
            urlencoding::encode(query),
            page,
            size
        )
    }

    pub fn single_item_url(&self, alias: &str, pointer: &str) -> String {
        format!(
            "{}/digital/api/singleitem/collection/{}/id/{}",
            self.base, alias, pointer
        )
    }

    /// Compound-object endpoints in the order they are tried.
    ///
    /// The canonical form is first; the rest are variants seen on older sites.
    pub fn compound_urls(&self, alias: &str, pointer: &str) -> Vec<String> {
        let api = format!("{}/digital/api/compound/object", self.base);
        vec![
            format!("{api}/collection/{alias}/id/{pointer}"),
            format!("{api}/collection/{alias}/{pointer}"),
            format!("{api}/collection/{alias}/id/{pointer}/"),
            format!("{api}/{alias}/id/{pointer}"),
            format!("{api}/{alias}/{pointer}"),
            format!("{api}/{alias}/id/{pointer}/"),
        ]
    }

    fn backoff_delay(attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(6);
        BACKOFF_BASE
            .checked_mul(1u32 << exponent)
            .unwrap_or(BACKOFF_CAP)
            .min(BACKOFF_CAP)
    }

    /// Run `operation`, retrying transient failures with exponential backoff.
    fn with_retries<T, F>(&self, label: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut attempt = 0u32;
        loop {
            match operation() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    let delay = Self::backoff_delay(attempt);
                    log::warn!(
                        "{} failed ({}); retry {}/{} in {:?}",
                        label,
                        err,
                        attempt,
                        self.retries,
                        delay
                    );
                    thread::sleep(delay);
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn get(&self, agent: &ureq::Agent, url: &str, referer: Option<&str>) -> Result<ureq::Response> {
        let mut request = agent.get(url).set("Accept", ACCEPT);
        if let Some(referer) = referer {
            request = request.set("Referer", referer);
        }
        request.call().map_err(|err| classify_ureq_failure(url, err))
    }

    fn get_json(&self, url: &str) -> Result<Value> {
        self.with_retries(url, || {
            let response = self.get(&self.api, url, None)?;
            response.into_json::<Value>().map_err(|e| CdmError::Json {
                url: url.to_string(),
                message: e.to_string(),
            })
        })
    }

    /// One attempt at a compound endpoint. `Ok(None)` means "try the next one".
    fn try_compound(&self, url: &str, referer: &str) -> Option<Vec<Value>> {
        let response = match self.get(&self.api, url, Some(referer)) {
            Ok(response) => response,
            Err(CdmError::HttpStatus { status: 404, .. }) => return None,
            Err(CdmError::HttpStatus { status, .. }) => {
                log::warn!("compound HTTP {} for {}", status, url);
                return None;
            }
            Err(err) => {
                log::warn!("compound GET failed {}: {}", url, err);
                return None;
            }
        };

        if !looks_json(response.content_type()) {
            let body = response.into_string().unwrap_or_default();
            let snippet: String = body.chars().take(160).collect::<String>().replace('\n', " ");
            log::warn!("compound non-JSON at {}: {:?}", url, snippet);
            return None;
        }

        let data: Value = match response.into_json() {
            Ok(data) => data,
            Err(_) => {
                log::warn!("compound JSON parse failed at {}", url);
                return None;
            }
        };

        Some(match data.get("children") {
            Some(Value::Array(children)) => children.clone(),
            _ => Vec::new(),
        })
    }

    fn download_once(&self, url: &str, dest: &Path) -> Result<u64> {
        let response = self.get(&self.media, url, None)?;
        let mut reader = response.into_reader();
        let mut writer = BufWriter::new(File::create(dest)?);

        let copied = io::copy(&mut reader, &mut writer).and_then(|bytes| {
            writer.flush()?;
            Ok(bytes)
        });

        match copied {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                drop(writer);
                let _ = fs::remove_file(dest);
                Err(CdmError::Transport {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }
}

impl DigitalLibrary for HttpLibrary {
    fn base(&self) -> &str {
        &self.base
    }

    fn search_page(&self, collection: &str, query: &str, page: u32, size: u32) -> Result<Vec<Value>> {
        let url = self.search_url(collection, query, page, size);
        log::debug!("search page {}: {}", page, url);
        let data = self.get_json(&url)?;
        Ok(match data.get("items") {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        })
    }

    fn single_item(&self, alias: &str, pointer: &str) -> Result<Value> {
        self.get_json(&self.single_item_url(alias, pointer))
    }

    fn compound_children(&self, alias: &str, pointer: &str) -> Vec<Value> {
        let referer = format!("{}/digital/collection/{}/id/{}", self.base, alias, pointer);
        self.compound_urls(alias, pointer)
            .iter()
            .find_map(|url| self.try_compound(url, &referer))
            .unwrap_or_default()
    }

    fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        self.with_retries(url, || self.download_once(url, dest))
    }
}

fn looks_json(content_type: &str) -> bool {
    content_type.to_lowercase().contains("json")
}

fn classify_ureq_failure(url: &str, error: ureq::Error) -> CdmError {
    match error {
        ureq::Error::Status(status, _) => CdmError::HttpStatus {
            status,
            url: url.to_string(),
        },
        ureq::Error::Transport(transport) => CdmError::Transport {
            url: url.to_string(),
            message: transport.to_string(),
        },
    }
}
