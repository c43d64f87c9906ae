pub mod crawl;
pub mod report;

pub use crawl::{CrawlOptions, execute_crawl, expand_output_dir, url_path, prepare_output_dir};
pub use report::{generate_crawl_report, generate_json_report, summary_line};
pub use spotlight_scanner::{CrawlError, CrawlEvent, CrawlOutcome, CrawlSummary, EventCallback, Mode};
