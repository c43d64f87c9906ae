// End of run reporting

use crate::crawl::CrawlOptions;
use colored::Colorize;
use spotlight_scanner::{CrawlOutcome, CrawlSummary};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Human readable byte count, binary units.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = "B";
    for next in UNITS {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{:.1} {}", value, unit)
}

/// Generate a text report for a finished crawl.
pub fn generate_crawl_report(outcome: &CrawlOutcome, options: &CrawlOptions) -> String {
    let summary = outcome.summary();

    let mut report = String::new();
    report.push_str(RULE);
    report.push_str("\n\n# Summary:\n");
    report.push_str(&format!("  Mode: {}\n", options.mode.as_str()));
    report.push_str(&format!("  Website: {}\n", options.website));
    report.push_str(&format!("  Output directory: {}\n", options.output_dir.display()));
    report.push_str(&format!("  Pages visited: {}\n", summary.pages_visited));
    report.push_str(&format!("  Listing pages: {}\n", summary.listings));
    report.push_str(&format!("  Images found: {}\n", summary.images_found));
    report.push_str(&format!(
        "  Downloaded: {} ({})\n",
        summary.downloaded,
        format_bytes(summary.bytes_written)
    ));
    report.push_str(&format!("  Skipped: {}\n", summary.skipped));
    if summary.listed > 0 {
        report.push_str(&format!("  Listed: {}\n", summary.listed));
    }
    report.push('\n');
    report.push_str(RULE);
    report.push_str("\n\n");

    let headline = match outcome {
        CrawlOutcome::CaughtUp(_) => format!(
            "{} Update finished: reached an image that was already downloaded",
            "✓".green().bold()
        ),
        CrawlOutcome::Exhausted(_) => format!("{} Crawl complete: no pages left to visit", "✓".green().bold()),
    };
    report.push_str(&headline);
    report.push('\n');

    report
}

/// JSON form of the outcome, for scripting.
pub fn generate_json_report(outcome: &CrawlOutcome) -> serde_json::Result<String> {
    serde_json::to_string_pretty(outcome)
}

/// One line summary used by the quiet mode.
pub fn summary_line(summary: &CrawlSummary) -> String {
    format!(
        "{} downloaded, {} skipped, {} pages visited",
        summary.downloaded, summary.skipped, summary.pages_visited
    )
}
