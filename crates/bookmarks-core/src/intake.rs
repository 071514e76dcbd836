//! Adding bookmarks from a raw URL
//!
//! A URL is split into a site (its host) and a page (its path and query).
//! URLs that point at the root of a domain only create or reuse the site;
//! anything deeper also creates a page under it.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use crate::error::{StoreError, StoreResult};
use crate::models::{Page, Site, SiteId, TagId};
use crate::store::Store;
use crate::title::TitleFetcher;

/// A parsed bookmark URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkUrl {
    /// Normalized absolute URL, used for title fetching
    pub url: Url,
    /// Host, plus `:port` when the port is not the scheme default
    pub domain: String,
    /// Decoded path plus the raw `?query` when present
    pub path: String,
}

impl BookmarkUrl {
    /// True when the URL names a whole site rather than a page
    pub fn is_root(&self) -> bool {
        self.path.is_empty() || self.path == "/"
    }
}

/// True when `raw` starts with `scheme://`
fn has_scheme(raw: &str) -> bool {
    static SCHEME: OnceLock<Regex> = OnceLock::new();
    SCHEME
        .get_or_init(|| {
            Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").expect("scheme pattern is valid")
        })
        .is_match(raw)
}

/// Parse user input into a bookmark URL
///
/// Input that does not start with `scheme://` is treated as `https://`.
/// The stored path is percent-decoded; the query is kept as written.
pub fn parse_bookmark_url(raw: &str) -> StoreResult<BookmarkUrl> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(StoreError::validation("URL is required"));
    }

    let absolute = if has_scheme(raw) {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    let url = Url::parse(&absolute)
        .map_err(|e| StoreError::validation(format!("Invalid URL '{}': {}", raw, e)))?;

    let host = match url.host_str() {
        Some(host) if !host.is_empty() => host,
        _ => return Err(StoreError::validation(format!("URL has no host: {}", raw))),
    };
    let domain = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    let mut path = match urlencoding::decode(url.path()) {
        Ok(decoded) => decoded.into_owned(),
        // Not UTF-8 once decoded
        Err(_) => url.path().to_string(),
    };
    if let Some(query) = url.query() {
        path.push('?');
        path.push_str(query);
    }

    Ok(BookmarkUrl { url, domain, path })
}

/// Input for adding a bookmark
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeRequest {
    pub url: String,
    /// Blank means fetch the title from the page
    pub title: String,
    pub description: String,
    /// Raw tag names; blank entries are ignored
    pub tags: Vec<String>,
}

impl IntakeRequest {
    /// Full add with title and description
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            description: description.into(),
            tags: Vec::new(),
        }
    }

    /// Quick add: URL and optional title, no description
    pub fn quick(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(url, title, "")
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// What an intake produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Intake {
    /// Root URL: the site was found or created, no page
    Site(Site),
    /// Deeper URL: a new page under a found or created site
    Page(Page),
}

impl Store {
    /// Add a bookmark from a raw URL
    ///
    /// The title is fetched only when the request leaves it blank. For root
    /// URLs tags go to the site; otherwise they go to the new page. A tag
    /// that cannot be resolved is skipped.
    pub fn ingest(
        &self,
        request: &IntakeRequest,
        fetcher: &dyn TitleFetcher,
    ) -> StoreResult<Intake> {
        let target = parse_bookmark_url(&request.url)?;

        let title = match request.title.trim() {
            "" => fetcher.fetch_title(target.url.as_str()).unwrap_or_default(),
            title => title.to_string(),
        };

        let site_name = if target.is_root() { title.as_str() } else { "" };
        let site_id = self.find_or_create_site(&target.domain, site_name)?;

        if target.is_root() {
            for tag_id in self.resolve_tags(&request.tags) {
                if let Err(e) = self.add_site_tag(site_id, tag_id) {
                    warn!("Failed to tag site {}: {}", site_id, e);
                }
            }
            return Ok(Intake::Site(self.get_site(site_id)?));
        }

        let page_id = self.create_page(site_id, &target.path, &title, &request.description)?;
        info!("Added page {}{}", target.domain, target.path);
        for tag_id in self.resolve_tags(&request.tags) {
            if let Err(e) = self.add_page_tag(page_id, tag_id) {
                warn!("Failed to tag page {}: {}", page_id, e);
            }
        }
        Ok(Intake::Page(self.get_page(page_id)?))
    }

    /// Existing site for `domain`, or a new uncategorized one
    ///
    /// `name` is only applied when the site is created.
    fn find_or_create_site(&self, domain: &str, name: &str) -> StoreResult<SiteId> {
        match self.get_site_by_domain(domain) {
            Ok(site) => return Ok(site.id),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        match self.create_site(None, domain, name, "") {
            Ok(id) => {
                info!("Added site {}", domain);
                Ok(id)
            }
            // Lost a race with another writer for the same domain
            Err(e) if e.is_constraint_violation() => Ok(self.get_site_by_domain(domain)?.id),
            Err(e) => Err(e),
        }
    }

    fn resolve_tags(&self, names: &[String]) -> Vec<TagId> {
        names
            .iter()
            .filter(|name| !name.trim().is_empty())
            .filter_map(|name| match self.get_or_create_tag(name) {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!("Skipping tag '{}': {}", name, e);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Returns a fixed title and records every URL it was asked for
    struct StubFetcher {
        title: Option<String>,
        calls: RefCell<Vec<String>>,
    }

    impl StubFetcher {
        fn new(title: Option<&str>) -> Self {
            Self {
                title: title.map(String::from),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl TitleFetcher for StubFetcher {
        fn fetch_title(&self, url: &str) -> Option<String> {
            self.calls.borrow_mut().push(url.to_string());
            self.title.clone()
        }
    }

    fn store() -> Store {
        Store::open_in_memory().unwrap()
    }

    #[test]
    fn test_parse_adds_scheme() {
        let parsed = parse_bookmark_url("example.com").unwrap();
        assert_eq!(parsed.url.as_str(), "https://example.com/");
        assert_eq!(parsed.domain, "example.com");
        assert_eq!(parsed.path, "/");
        assert!(parsed.is_root());
    }

    #[test]
    fn test_parse_keeps_query_and_port() {
        let parsed = parse_bookmark_url("  http://localhost:8080/a/b?x=1  ").unwrap();
        assert_eq!(parsed.domain, "localhost:8080");
        assert_eq!(parsed.path, "/a/b?x=1");
        assert!(!parsed.is_root());

        let default_port = parse_bookmark_url("https://example.com:443/docs").unwrap();
        assert_eq!(default_port.domain, "example.com");
    }

    #[test]
    fn test_scheme_only_counts_at_the_start() {
        let parsed = parse_bookmark_url("example.com/go?to=https://rust-lang.org").unwrap();
        assert_eq!(parsed.url.as_str(), "https://example.com/go?to=https://rust-lang.org");
        assert_eq!(parsed.domain, "example.com");
        assert_eq!(parsed.path, "/go?to=https://rust-lang.org");

        let upper = parse_bookmark_url("HTTP://Example.com/a").unwrap();
        assert_eq!(upper.url.scheme(), "http");
        assert_eq!(upper.domain, "example.com");

        assert!(has_scheme("git+ssh://host/repo"));
        assert!(!has_scheme("example.com/?u=http://x"));
        assert!(!has_scheme("1http://x"));
    }

    #[test]
    fn test_path_is_percent_decoded() {
        let parsed = parse_bookmark_url("https://de.wikipedia.org/wiki/K%C3%B6ln?q=a%20b").unwrap();
        assert_eq!(parsed.path, "/wiki/Köln?q=a%20b");

        let unicode = parse_bookmark_url("de.wikipedia.org/wiki/Köln").unwrap();
        assert_eq!(unicode.path, "/wiki/Köln");

        let invalid_utf8 = parse_bookmark_url("example.com/%FF").unwrap();
        assert_eq!(invalid_utf8.path, "/%FF");
    }

    #[test]
    fn test_root_with_query_is_a_page() {
        let parsed = parse_bookmark_url("https://example.com/?ref=home").unwrap();
        assert_eq!(parsed.path, "/?ref=home");
        assert!(!parsed.is_root());
    }

    #[test]
    fn test_parse_rejects_blank_and_hostless() {
        for input in ["", "   ", "file:///etc/hosts", "https://"] {
            assert!(
                matches!(parse_bookmark_url(input), Err(StoreError::Validation(_))),
                "expected validation error for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_root_url_creates_site_only() {
        let store = store();
        let fetcher = StubFetcher::new(Some("Example Domain"));

        let intake = store
            .ingest(&IntakeRequest::quick("example.com", ""), &fetcher)
            .unwrap();

        let Intake::Site(site) = intake else {
            panic!("expected a site");
        };
        assert_eq!(site.domain, "example.com");
        assert_eq!(site.name.as_deref(), Some("Example Domain"));
        assert_eq!(site.page_count, 0);
        assert_eq!(fetcher.calls(), vec!["https://example.com/"]);
        assert_eq!(store.dashboard().unwrap().page_count, 0);
    }

    #[test]
    fn test_root_url_reuses_site_and_keeps_name() {
        let store = store();
        let existing = store
            .create_site(None, "example.com", "Original", "")
            .unwrap();
        let fetcher = StubFetcher::new(None);

        let request = IntakeRequest::new("https://example.com/", "Renamed", "")
            .with_tags(["Reference", " "]);
        let Intake::Site(site) = store.ingest(&request, &fetcher).unwrap() else {
            panic!("expected a site");
        };

        assert_eq!(site.id, existing);
        assert_eq!(site.name.as_deref(), Some("Original"));
        let tags: Vec<&str> = site.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(tags, vec!["reference"]);
        assert!(fetcher.calls().is_empty());
    }

    #[test]
    fn test_deep_url_creates_bare_site_and_page() {
        let store = store();
        let fetcher = StubFetcher::new(Some("Section B"));

        let request = IntakeRequest::new("https://example.com/a/b?x=1", "", "notes")
            .with_tags(["Docs", "docs", "Later"]);
        let Intake::Page(page) = store.ingest(&request, &fetcher).unwrap() else {
            panic!("expected a page");
        };

        assert_eq!(page.site_domain, "example.com");
        assert_eq!(page.path, "/a/b?x=1");
        assert_eq!(page.title.as_deref(), Some("Section B"));
        assert_eq!(page.description.as_deref(), Some("notes"));
        let tags: Vec<&str> = page.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(tags, vec!["docs", "later"]);

        let site = store.get_site(page.site_id).unwrap();
        assert!(site.name.is_none());
        assert!(site.tags.is_empty());
        assert_eq!(fetcher.calls(), vec!["https://example.com/a/b?x=1"]);
    }

    #[test]
    fn test_given_title_skips_fetch() {
        let store = store();
        let fetcher = StubFetcher::new(Some("Fetched"));

        let Intake::Page(page) = store
            .ingest(&IntakeRequest::quick("example.com/post", "Mine"), &fetcher)
            .unwrap()
        else {
            panic!("expected a page");
        };

        assert_eq!(page.title.as_deref(), Some("Mine"));
        assert!(fetcher.calls().is_empty());
    }

    #[test]
    fn test_failed_fetch_leaves_title_absent() {
        let store = store();
        let fetcher = StubFetcher::new(None);

        let Intake::Page(page) = store
            .ingest(&IntakeRequest::quick("example.com/post", ""), &fetcher)
            .unwrap()
        else {
            panic!("expected a page");
        };
        assert!(page.title.is_none());
    }

    #[test]
    fn test_pages_share_existing_site() {
        let store = store();
        let fetcher = StubFetcher::new(None);

        store
            .ingest(&IntakeRequest::quick("example.com/one", ""), &fetcher)
            .unwrap();
        store
            .ingest(&IntakeRequest::quick("example.com/two", ""), &fetcher)
            .unwrap();

        let sites = store.list_sites(None).unwrap();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].page_count, 2);
    }

    #[test]
    fn test_duplicate_page_is_constraint_violation() {
        let store = store();
        let fetcher = StubFetcher::new(None);
        let request = IntakeRequest::quick("example.com/same", "");

        store.ingest(&request, &fetcher).unwrap();
        assert!(store
            .ingest(&request, &fetcher)
            .unwrap_err()
            .is_constraint_violation());
    }

    #[test]
    fn test_invalid_url_is_validation_error() {
        let store = store();
        let fetcher = StubFetcher::new(None);
        assert!(matches!(
            store.ingest(&IntakeRequest::quick("   ", ""), &fetcher),
            Err(StoreError::Validation(_))
        ));
        assert!(fetcher.calls().is_empty());
    }
}
