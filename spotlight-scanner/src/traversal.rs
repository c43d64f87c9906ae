use crate::download::{Decision, Mode, write_atomic};
use crate::error::{CrawlError, Result};
use crate::image::ImageRef;
use crate::page::{ListingEntry, Page};
use crate::result::{CrawlEvent, CrawlOutcome, CrawlSummary};
use reqwest::{Client, Response};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub type EventCallback = Arc<dyn Fn(CrawlEvent) + Send + Sync>;

pub const DEFAULT_WEBSITE: &str = "https://windows10spotlight.com";

/// Desktop Chrome, the site refuses obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Category pages that never lead to images.
pub const SKIPPED_CATEGORY: &str = "uncategorized";

/// A pending URL together with the listing page number it was found from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub url: String,
    pub page: u32,
}

enum Step {
    Continue,
    CaughtUp,
}

/// Depth-first walk over a paginated gallery.
///
/// Pages are fetched one at a time from an explicit stack. Children of a
/// listing are pushed in reverse so they are visited in document order, the
/// same order a recursive walk would take.
pub struct Traverser {
    website: String,
    start_page: u32,
    mode: Mode,
    output_dir: PathBuf,
    user_agent: String,
    timeout: Option<Duration>,
    event_callback: Option<EventCallback>,
}

impl Traverser {
    pub fn new(website: &str) -> Result<Self> {
        let website = website.trim_end_matches('/').to_string();
        check_scheme(&website)?;

        Ok(Self {
            website,
            start_page: 1,
            mode: Mode::default(),
            output_dir: PathBuf::from("."),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
            event_callback: None,
        })
    }

    pub fn with_start_page(mut self, page: u32) -> Self {
        self.start_page = page;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_event_callback(mut self, callback: EventCallback) -> Self {
        self.event_callback = Some(callback);
        self
    }

    pub fn website(&self) -> &str {
        &self.website
    }

    /// URL of listing page `page`.
    pub fn page_url(&self, page: u32) -> String {
        format!("{}/page/{}", self.website, page)
    }

    pub async fn run(&self) -> Result<CrawlOutcome> {
        let client = self.build_client()?;
        let mut summary = CrawlSummary::default();
        let mut visited: HashSet<String> = HashSet::new();
        let mut stack = vec![WorkItem {
            url: self.page_url(self.start_page),
            page: self.start_page,
        }];

        info!(
            "Starting {} crawl of {} at page {}",
            self.mode.as_str(),
            self.website,
            self.start_page
        );

        while let Some(item) = stack.pop() {
            if item.url.contains(SKIPPED_CATEGORY) {
                debug!("Skipping category page {}", item.url);
                continue;
            }
            if !visited.insert(item.url.clone()) {
                debug!("Already visited {}", item.url);
                continue;
            }

            check_scheme(&item.url)?;
            info!("Grabbing: {}", item.url);
            self.emit(CrawlEvent::Grabbing {
                url: item.url.clone(),
                page: item.page,
            });

            let html = fetch(&client, &item.url).await?.text().await?;
            summary.pages_visited += 1;

            match Page::classify(&html, &item.url)? {
                Page::Listing(entries) => {
                    summary.listings += 1;
                    let children = self.children_of(&item, entries);
                    debug!("{} lists {} child page(s)", item.url, children.len());
                    stack.extend(children.into_iter().rev());
                }
                Page::Terminal { link } => {
                    summary.images_found += 1;
                    if let Step::CaughtUp = self.handle_image(&client, &link, &mut summary).await? {
                        return Ok(CrawlOutcome::CaughtUp(summary));
                    }
                }
                Page::Unrecognised { headings } => {
                    warn!("{} has {} heading(s), neither a listing nor an image page", item.url, headings);
                    self.emit(CrawlEvent::Unrecognised {
                        url: item.url.clone(),
                        headings,
                    });
                }
            }
        }

        info!("Crawl complete. Visited {} pages", summary.pages_visited);
        Ok(CrawlOutcome::Exhausted(summary))
    }

    /// Work items for a listing, in document order. A listing yields at most
    /// one next page, numbered from the listing's own position.
    fn children_of(&self, item: &WorkItem, entries: Vec<ListingEntry>) -> Vec<WorkItem> {
        let mut children = Vec::with_capacity(entries.len());
        let mut next_page_queued = false;

        for entry in entries {
            match entry {
                ListingEntry::Link(url) => children.push(WorkItem {
                    url,
                    page: item.page,
                }),
                ListingEntry::NextPage if !next_page_queued => {
                    next_page_queued = true;
                    match item.page.checked_add(1) {
                        Some(next) => children.push(WorkItem {
                            url: self.page_url(next),
                            page: next,
                        }),
                        None => warn!("{} is the last numbered page, not following it", item.url),
                    }
                }
                ListingEntry::NextPage => {}
            }
        }

        children
    }

    async fn handle_image(&self, client: &Client, link: &str, summary: &mut CrawlSummary) -> Result<Step> {
        let image = ImageRef::from_link(link)?;
        let asset_url = image.asset_url(&self.website);
        let path = self.output_dir.join(image.file_name());

        match Decision::decide(&path, self.mode) {
            Decision::List => {
                summary.listed += 1;
                self.emit(CrawlEvent::Listed { url: asset_url });
                Ok(Step::Continue)
            }
            Decision::CaughtUp => {
                info!("{} already downloaded, update finished", path.display());
                self.emit(CrawlEvent::CaughtUp { path });
                Ok(Step::CaughtUp)
            }
            Decision::Skip => {
                debug!("{} already downloaded, skipping", path.display());
                summary.skipped += 1;
                self.emit(CrawlEvent::Skipped { path });
                Ok(Step::Continue)
            }
            Decision::Write => {
                let bytes = fetch(client, &asset_url).await?.bytes().await?;
                write_atomic(&path, &bytes).await?;

                let written = bytes.len() as u64;
                debug!("Saved {} ({} bytes)", path.display(), written);
                summary.downloaded += 1;
                summary.bytes_written += written;
                self.emit(CrawlEvent::Downloaded { path, bytes: written });
                Ok(Step::Continue)
            }
        }
    }

    fn build_client(&self) -> Result<Client> {
        let mut builder = Client::builder()
            .user_agent(self.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(5));
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }

    fn emit(&self, event: CrawlEvent) {
        if let Some(ref callback) = self.event_callback {
            callback(event);
        }
    }
}

async fn fetch(client: &Client, url: &str) -> Result<Response> {
    debug!("Fetching {}", url);
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CrawlError::StatusError {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response)
}

/// Only http and https URLs are fetched.
pub fn check_scheme(url: &str) -> Result<()> {
    let parsed = Url::parse(url).map_err(|e| CrawlError::InvalidUrl(format!("{}: {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(CrawlError::UnsupportedScheme(url.to_string())),
    }
}
