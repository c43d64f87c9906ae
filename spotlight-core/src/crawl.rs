use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use spotlight_scanner::traversal::{DEFAULT_USER_AGENT, DEFAULT_WEBSITE};
use spotlight_scanner::{CrawlEvent, CrawlOutcome, EventCallback, Mode, Traverser};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Options for configuring a crawl operation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub website: String,
    pub start_page: u32,
    pub output_dir: PathBuf,
    pub mode: Mode,
    pub user_agent: String,
    pub timeout: Option<Duration>,
    pub show_progress: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            website: DEFAULT_WEBSITE.to_string(),
            start_page: 1,
            output_dir: PathBuf::from("."),
            mode: Mode::Update,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Some(Duration::from_secs(30)),
            show_progress: true,
        }
    }
}

/// Expand a leading `~` in a user supplied output directory.
pub fn expand_output_dir(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Create the output directory and its parents if missing.
pub fn prepare_output_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        std::fs::DirBuilder::new()
            .recursive(true)
            .mode(0o775)
            .create(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }
    #[cfg(not(unix))]
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    debug!("Created output directory {}", dir.display());
    Ok(())
}

/// Path shown in the spinner, the raw string when it does not parse.
pub fn url_path(url: &str) -> String {
    Url::parse(url).map_or_else(|_| url.to_string(), |u| u.path().to_string())
}

/// Execute a crawl with the given options.
///
/// Events are forwarded to `event_callback` after the spinner (if any) has
/// been updated. Nothing is written to disk in list-only mode, not even the
/// output directory.
pub async fn execute_crawl(
    options: CrawlOptions,
    event_callback: Option<EventCallback>,
) -> Result<CrawlOutcome> {
    let CrawlOptions {
        website,
        start_page,
        output_dir,
        mode,
        user_agent,
        timeout,
        show_progress,
    } = options;

    if mode != Mode::ListOnly {
        prepare_output_dir(&output_dir)?;
    }

    let progress_bar = if show_progress && mode != Mode::ListOnly {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let saved = Arc::new(AtomicUsize::new(0));
    let pb_clone = progress_bar.clone();
    let saved_clone = saved.clone();
    let callback: EventCallback = Arc::new(move |event: CrawlEvent| {
        if let Some(ref pb) = pb_clone {
            match &event {
                CrawlEvent::Grabbing { url, page } => {
                    pb.set_message(format!(
                        "Page {} | {} saved | {}",
                        page,
                        saved_clone.load(Ordering::Relaxed),
                        url_path(url)
                    ));
                }
                CrawlEvent::Downloaded { .. } => {
                    saved_clone.fetch_add(1, Ordering::Relaxed);
                }
                _ => {}
            }
        }

        if let Some(ref forward) = event_callback {
            match pb_clone {
                Some(ref pb) => pb.suspend(|| forward(event)),
                None => forward(event),
            }
        }
    });

    let mut traverser = Traverser::new(&website)?
        .with_start_page(start_page)
        .with_mode(mode)
        .with_output_dir(output_dir)
        .with_user_agent(user_agent)
        .with_event_callback(callback);
    if let Some(timeout) = timeout {
        traverser = traverser.with_timeout(timeout);
    }

    let outcome = traverser.run().await;

    if let Some(ref pb) = progress_bar {
        pb.finish_and_clear();
    }

    Ok(outcome?)
}
