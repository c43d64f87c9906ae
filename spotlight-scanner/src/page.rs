use crate::error::{CrawlError, Result};
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;
use url::Url;

/// More `<h2>` elements than this marks a listing page.
pub const LISTING_HEADING_THRESHOLD: usize = 2;

/// Exactly this many `<h2>` elements marks a terminal image page.
pub const TERMINAL_HEADING_COUNT: usize = 1;

/// A fetched page, reduced to what the traversal needs from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    /// Headings in document order.
    Listing(Vec<ListingEntry>),
    /// A single image page and its absolute download link.
    Terminal { link: String },
    /// Neither shape matched (zero or two headings).
    Unrecognised { headings: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingEntry {
    /// Heading wrapping a link to a sub page.
    Link(String),
    /// Plain text heading: the listing has no more items, continue on the next page.
    NextPage,
}

impl Page {
    /// Classify an HTML document fetched from `page_url`.
    ///
    /// Listing headings are kept only when their trimmed text is longer than one
    /// character. A heading whose first child is an element must carry an
    /// `a[href]`, otherwise the page is malformed.
    pub fn classify(html: &str, page_url: &str) -> Result<Page> {
        let document = Html::parse_document(html);
        let heading_selector = Selector::parse("h2").unwrap();
        let headings: Vec<ElementRef> = document.select(&heading_selector).collect();

        debug!("{} has {} heading(s)", page_url, headings.len());

        if headings.len() > LISTING_HEADING_THRESHOLD {
            let mut entries = Vec::new();
            for heading in headings {
                if let Some(entry) = Self::listing_entry(heading, page_url)? {
                    entries.push(entry);
                }
            }
            Ok(Page::Listing(entries))
        } else if headings.len() == TERMINAL_HEADING_COUNT {
            let figure_link = Selector::parse("figure a[href]").unwrap();
            let href = document
                .select(&figure_link)
                .next()
                .and_then(|a| a.value().attr("href"))
                .ok_or_else(|| CrawlError::malformed(page_url, "no <figure> wrapping a link"))?;
            let link = resolve_url(page_url, href).ok_or_else(|| {
                CrawlError::malformed(page_url, format!("unusable figure link '{}'", href))
            })?;
            Ok(Page::Terminal { link })
        } else {
            Ok(Page::Unrecognised {
                headings: headings.len(),
            })
        }
    }

    fn listing_entry(heading: ElementRef, page_url: &str) -> Result<Option<ListingEntry>> {
        let text: String = heading.text().collect();
        if text.trim().chars().count() <= 1 {
            return Ok(None);
        }

        let first_child = heading.children().find(|child| match child.value() {
            Node::Text(t) => !t.trim().is_empty(),
            Node::Element(_) => true,
            _ => false,
        });

        match first_child.map(|child| child.value()) {
            Some(Node::Element(_)) => {
                let link_selector = Selector::parse("a[href]").unwrap();
                let href = heading
                    .select(&link_selector)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .ok_or_else(|| {
                        CrawlError::malformed(page_url, format!("heading '{}' has no link", text.trim()))
                    })?;
                match resolve_url(page_url, href) {
                    Some(url) => Ok(Some(ListingEntry::Link(url))),
                    None => {
                        debug!("Skipping unfollowable link '{}' on {}", href, page_url);
                        Ok(None)
                    }
                }
            }
            Some(_) => Ok(Some(ListingEntry::NextPage)),
            None => Ok(None),
        }
    }
}

/// Resolve `href` against `base`, dropping the fragment.
pub fn resolve_url(base: &str, href: &str) -> Option<String> {
    if href.is_empty()
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with('#')
    {
        return None;
    }

    let base_url = Url::parse(base).ok()?;
    let mut url = base_url.join(href).ok()?;
    url.set_fragment(None);

    Some(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://windows10spotlight.com/page/3";

    #[test]
    fn test_listing_with_links_in_document_order() {
        let html = r#"<html><body>
            <h2><a href="https://windows10spotlight.com/images/aaa">Lake at dawn</a></h2>
            <h2><a href="/images/bbb">Desert road</a></h2>
            <h2><a href="images/ccc">Glacier</a></h2>
        </body></html>"#;

        let page = Page::classify(html, PAGE).unwrap();
        assert_eq!(
            page,
            Page::Listing(vec![
                ListingEntry::Link("https://windows10spotlight.com/images/aaa".to_string()),
                ListingEntry::Link("https://windows10spotlight.com/images/bbb".to_string()),
                ListingEntry::Link("https://windows10spotlight.com/page/images/ccc".to_string()),
            ])
        );
    }

    #[test]
    fn test_plain_heading_means_next_page() {
        let html = r#"<html><body>
            <h2><a href="/images/aaa">Lake at dawn</a></h2>
            <h2><a href="/images/bbb">Desert road</a></h2>
            <h2>Recent posts</h2>
        </body></html>"#;

        let page = Page::classify(html, PAGE).unwrap();
        assert_eq!(
            page,
            Page::Listing(vec![
                ListingEntry::Link("https://windows10spotlight.com/images/aaa".to_string()),
                ListingEntry::Link("https://windows10spotlight.com/images/bbb".to_string()),
                ListingEntry::NextPage,
            ])
        );
    }

    #[test]
    fn test_short_headings_are_ignored() {
        let html = r#"<html><body>
            <h2><a href="/images/aaa">Lake at dawn</a></h2>
            <h2> x </h2>
            <h2></h2>
        </body></html>"#;

        let page = Page::classify(html, PAGE).unwrap();
        assert_eq!(
            page,
            Page::Listing(vec![ListingEntry::Link(
                "https://windows10spotlight.com/images/aaa".to_string()
            )])
        );
    }

    #[test]
    fn test_terminal_page_yields_figure_link() {
        let html = r#"<html><body>
            <h2>Lake at dawn</h2>
            <figure><a href="https://windows10spotlight.com/wp-content/uploads/2023/05/abc123.jpg"><img src="small.jpg"></a></figure>
        </body></html>"#;

        let page = Page::classify(html, PAGE).unwrap();
        assert_eq!(
            page,
            Page::Terminal {
                link: "https://windows10spotlight.com/wp-content/uploads/2023/05/abc123.jpg"
                    .to_string()
            }
        );
    }

    #[test]
    fn test_terminal_page_without_figure_is_malformed() {
        let html = "<html><body><h2>Lake at dawn</h2><p>nothing here</p></body></html>";
        let err = Page::classify(html, PAGE).unwrap_err();
        assert!(matches!(err, CrawlError::MalformedPage { .. }));
    }

    #[test]
    fn test_heading_element_without_href_is_malformed() {
        let html = r#"<html><body>
            <h2><span>Lake at dawn</span></h2>
            <h2>Recent posts</h2>
            <h2>Archives</h2>
        </body></html>"#;
        let err = Page::classify(html, PAGE).unwrap_err();
        assert!(matches!(err, CrawlError::MalformedPage { .. }));
    }

    #[test]
    fn test_zero_or_two_headings_are_unrecognised() {
        let none = "<html><body><p>empty</p></body></html>";
        assert_eq!(
            Page::classify(none, PAGE).unwrap(),
            Page::Unrecognised { headings: 0 }
        );

        let two = "<html><body><h2>One</h2><h2>Two</h2></body></html>";
        assert_eq!(
            Page::classify(two, PAGE).unwrap(),
            Page::Unrecognised { headings: 2 }
        );
    }

    #[test]
    fn test_resolve_url_skips_special_links() {
        assert_eq!(resolve_url(PAGE, "#top"), None);
        assert_eq!(resolve_url(PAGE, "mailto:someone@example.com"), None);
        assert_eq!(resolve_url(PAGE, "javascript:void(0)"), None);
        assert_eq!(
            resolve_url(PAGE, "/images/aaa#comments"),
            Some("https://windows10spotlight.com/images/aaa".to_string())
        );
    }
}
