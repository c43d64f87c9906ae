use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Counters accumulated over one traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub pages_visited: usize,
    pub listings: usize,
    pub images_found: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub listed: usize,
    pub bytes_written: u64,
}

/// How a traversal that did not fail came to an end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "summary", rename_all = "kebab-case")]
pub enum CrawlOutcome {
    /// Nothing left to visit.
    Exhausted(CrawlSummary),
    /// Update mode reached an image that was already downloaded.
    CaughtUp(CrawlSummary),
}

impl CrawlOutcome {
    pub fn summary(&self) -> &CrawlSummary {
        match self {
            CrawlOutcome::Exhausted(summary) | CrawlOutcome::CaughtUp(summary) => summary,
        }
    }

    pub fn is_caught_up(&self) -> bool {
        matches!(self, CrawlOutcome::CaughtUp(_))
    }
}

/// Progress notifications, emitted in traversal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    Grabbing { url: String, page: u32 },
    Listed { url: String },
    Downloaded { path: PathBuf, bytes: u64 },
    Skipped { path: PathBuf },
    CaughtUp { path: PathBuf },
    Unrecognised { url: String, headings: usize },
}
