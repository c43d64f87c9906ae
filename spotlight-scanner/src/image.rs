use crate::error::{CrawlError, Result};
use url::Url;

/// Path under the website root where full resolution assets live.
pub const UPLOADS_PATH: &str = "wp-content/uploads";

/// Year, month and content hash parsed from a download link.
///
/// The same triple always yields the same asset URL and file name, which is
/// what makes repeated runs idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    pub year: String,
    pub month: String,
    pub hash: String,
}

impl ImageRef {
    /// Parse a link of the form `scheme://host/a/b/YYYY/MM/HASH`.
    pub fn from_link(link: &str) -> Result<Self> {
        let url = Url::parse(link).map_err(|e| CrawlError::MalformedImageLink(format!("{}: {}", link, e)))?;
        let segments: Vec<&str> = url.path_segments().map(|s| s.collect()).unwrap_or_default();

        let (year, month, hash) = match segments.as_slice() {
            [_, _, year, month, hash, ..] => (*year, *month, *hash),
            _ => {
                return Err(CrawlError::MalformedImageLink(format!(
                    "{}: expected .../YEAR/MONTH/HASH",
                    link
                )));
            }
        };

        let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(year) || !all_digits(month) || hash.is_empty() {
            return Err(CrawlError::MalformedImageLink(format!(
                "{}: '{}/{}/{}' is not YEAR/MONTH/HASH",
                link, year, month, hash
            )));
        }

        Ok(Self {
            year: year.to_string(),
            month: month.to_string(),
            hash: hash.to_string(),
        })
    }

    /// Canonical full resolution asset URL on `website`.
    pub fn asset_url(&self, website: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            website.trim_end_matches('/'),
            UPLOADS_PATH,
            self.year,
            self.month,
            self.hash
        )
    }

    /// Local file name, `YEAR-MONTH-HASH.jpg`.
    pub fn file_name(&self) -> String {
        let has_extension = self
            .hash
            .rsplit_once('.')
            .is_some_and(|(stem, ext)| !stem.is_empty() && !ext.is_empty());
        if has_extension {
            format!("{}-{}-{}", self.year, self.month, self.hash)
        } else {
            format!("{}-{}-{}.jpg", self.year, self.month, self.hash)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_upload_link() {
        let image =
            ImageRef::from_link("https://windows10spotlight.com/wp-content/uploads/2023/05/a7fb8314.jpg")
                .unwrap();
        assert_eq!(image.year, "2023");
        assert_eq!(image.month, "05");
        assert_eq!(image.hash, "a7fb8314.jpg");
        assert_eq!(image.file_name(), "2023-05-a7fb8314.jpg");
    }

    #[test]
    fn test_file_name_adds_jpg_when_hash_is_bare() {
        let image =
            ImageRef::from_link("https://windows10spotlight.com/images/full/2019/11/d41d8cd98f00b204")
                .unwrap();
        assert_eq!(image.file_name(), "2019-11-d41d8cd98f00b204.jpg");
    }

    #[test]
    fn test_same_link_same_file_name() {
        let link = "https://windows10spotlight.com/wp-content/uploads/2020/01/ffee.jpg";
        let first = ImageRef::from_link(link).unwrap();
        let second = ImageRef::from_link(link).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.file_name(), second.file_name());
    }

    #[test]
    fn test_asset_url_uses_configured_website() {
        let image = ImageRef::from_link("http://127.0.0.1:8080/images/x/2021/07/abc.jpg").unwrap();
        assert_eq!(
            image.asset_url("https://windows10spotlight.com/"),
            "https://windows10spotlight.com/wp-content/uploads/2021/07/abc.jpg"
        );
        assert_eq!(
            image.asset_url("http://127.0.0.1:8080"),
            "http://127.0.0.1:8080/wp-content/uploads/2021/07/abc.jpg"
        );
    }

    #[test]
    fn test_short_path_is_rejected() {
        let err = ImageRef::from_link("https://windows10spotlight.com/images/abc").unwrap_err();
        assert!(matches!(err, CrawlError::MalformedImageLink(_)));
    }

    #[test]
    fn test_non_numeric_date_is_rejected() {
        let err = ImageRef::from_link("https://windows10spotlight.com/wp-content/uploads/latest/05/abc.jpg")
            .unwrap_err();
        assert!(matches!(err, CrawlError::MalformedImageLink(_)));
    }
}
