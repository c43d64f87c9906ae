pub mod download;
pub mod error;
pub mod image;
pub mod page;
pub mod result;
pub mod traversal;

pub use download::Mode;
pub use error::CrawlError;
pub use image::ImageRef;
pub use page::Page;
pub use result::{CrawlEvent, CrawlOutcome, CrawlSummary};
pub use traversal::{EventCallback, Traverser};
