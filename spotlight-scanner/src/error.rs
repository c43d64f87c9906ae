use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    StatusError { url: String, status: u16 },

    #[error("Unsupported URL scheme in '{0}', URLs must start with http:// or https://")]
    UnsupportedScheme(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Malformed page {url}: {reason}")]
    MalformedPage { url: String, reason: String },

    #[error("Malformed image link: {0}")]
    MalformedImageLink(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CrawlError {
    /// Short code printed in front of the message, one per failure kind.
    pub fn code(&self) -> &'static str {
        match self {
            CrawlError::HttpError(_) | CrawlError::StatusError { .. } => "ERROR_01",
            CrawlError::UnsupportedScheme(_) | CrawlError::InvalidUrl(_) => "ERROR_02",
            CrawlError::MalformedPage { .. } | CrawlError::MalformedImageLink(_) => "ERROR_03",
            CrawlError::IoError(_) => "ERROR_04",
        }
    }

    pub(crate) fn malformed(url: &str, reason: impl Into<String>) -> Self {
        CrawlError::MalformedPage {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CrawlError>;
