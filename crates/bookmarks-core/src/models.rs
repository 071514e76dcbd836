//! Data models for bookmarks
//!
//! Defines the records returned by the store: Category, Site, Page and Tag,
//! plus the dashboard and search read models. Derived fields (counts, tag
//! lists, joined names) are filled in at query time and never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type CategoryId = i64;
pub type SiteId = i64;
pub type PageId = i64;
pub type TagId = i64;

/// A named group of sites
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    /// Unique display name
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Number of sites in this category
    pub site_count: i64,
}

/// A bookmarked domain
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Site {
    pub id: SiteId,
    pub category_id: Option<CategoryId>,
    /// Name of the category, empty when uncategorized
    pub category_name: String,
    /// Unique host, e.g. `example.com`
    pub domain: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Number of pages under this site
    pub page_count: i64,
    /// Tags attached to the site, ordered by name
    pub tags: Vec<TagRef>,
}

impl Site {
    /// Name if set, domain otherwise
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.domain)
    }
}

/// A specific path under a site
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    pub id: PageId,
    pub site_id: SiteId,
    /// Domain of the owning site
    pub site_domain: String,
    /// Path plus query string, unique per site
    pub path: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Tags attached directly to the page
    pub tags: Vec<TagRef>,
    /// Tags inherited from the owning site
    pub site_tags: Vec<TagRef>,
}

impl Page {
    /// Full URL reconstructed from the site domain and path
    pub fn url(&self) -> String {
        format!("https://{}{}", self.site_domain, self.path)
    }

    /// Title if set, path otherwise
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.path)
    }

    /// Own tags followed by inherited tags not already present
    pub fn all_tags(&self) -> Vec<&TagRef> {
        let mut all: Vec<&TagRef> = self.tags.iter().collect();
        for tag in &self.site_tags {
            if !all.iter().any(|t| t.id == tag.id) {
                all.push(tag);
            }
        }
        all
    }
}

/// A label with usage counts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    /// Normalized (trimmed, lower-cased) name
    pub name: String,
    pub site_count: i64,
    pub page_count: i64,
}

impl Tag {
    pub fn usage(&self) -> i64 {
        self.site_count + self.page_count
    }
}

/// A tag as attached to a site or page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TagRef {
    pub id: TagId,
    pub name: String,
}

impl std::fmt::Display for TagRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&Tag> for TagRef {
    fn from(tag: &Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name.clone(),
        }
    }
}

/// Totals and recent activity for the home screen
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardStats {
    pub category_count: i64,
    pub site_count: i64,
    pub page_count: i64,
    /// Most recently created pages, newest first
    pub recent_pages: Vec<Page>,
}

/// Independent site and page matches for a query
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchResults {
    pub sites: Vec<Site>,
    pub pages: Vec<Page>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty() && self.pages.is_empty()
    }
}

/// Optional page list filters; set filters are ANDed together
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageFilter {
    pub site_id: Option<SiteId>,
    /// Matches the owning site's category
    pub category_id: Option<CategoryId>,
    /// Matches a page tag or an inherited site tag
    pub tag_id: Option<TagId>,
}

impl PageFilter {
    pub fn by_site(site_id: SiteId) -> Self {
        Self {
            site_id: Some(site_id),
            ..Self::default()
        }
    }

    pub fn by_category(category_id: CategoryId) -> Self {
        Self {
            category_id: Some(category_id),
            ..Self::default()
        }
    }

    pub fn by_tag(tag_id: TagId) -> Self {
        Self {
            tag_id: Some(tag_id),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.site_id.is_none() && self.category_id.is_none() && self.tag_id.is_none()
    }
}

/// Normalize a tag name for storage and lookup
pub fn normalize_tag_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Split comma-separated tag input, dropping blank entries
pub fn parse_tag_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
