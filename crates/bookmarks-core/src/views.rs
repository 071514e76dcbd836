//! Read models for each screen
//!
//! Each view bundles everything one listing or form needs, so callers make a
//! single store call per screen. Views are assembled from several queries and
//! are not a single consistent snapshot.

use serde::Serialize;

use crate::error::StoreResult;
use crate::models::{
    Category, CategoryId, DashboardStats, Page, PageFilter, PageId, SearchResults, Site, SiteId,
    Tag, TagId,
};
use crate::store::Store;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub stats: DashboardStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryListView {
    pub categories: Vec<Category>,
}

/// Sites plus the choices needed to filter and tag them
#[derive(Debug, Clone, Serialize)]
pub struct SiteListView {
    pub sites: Vec<Site>,
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
    /// Active category filter, if any
    pub category_id: Option<CategoryId>,
}

/// Pages plus the choices needed to filter them
#[derive(Debug, Clone, Serialize)]
pub struct PageListView {
    pub pages: Vec<Page>,
    pub sites: Vec<Site>,
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
    pub filter: PageFilter,
}

#[derive(Debug, Clone, Serialize)]
pub struct SitePagesView {
    pub site: Site,
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagListView {
    pub tags: Vec<Tag>,
}

/// Everything carrying a tag
///
/// `pages` includes pages that only inherit the tag from their site.
#[derive(Debug, Clone, Serialize)]
pub struct TagItemsView {
    pub tag: Tag,
    pub sites: Vec<Site>,
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchView {
    pub query: String,
    pub results: SearchResults,
}

#[derive(Debug, Clone, Serialize)]
pub struct SiteEditView {
    pub site: Site,
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageEditView {
    pub page: Page,
    pub sites: Vec<Site>,
}

impl Store {
    pub fn dashboard_view(&self) -> StoreResult<DashboardView> {
        Ok(DashboardView {
            stats: self.dashboard()?,
        })
    }

    pub fn category_list_view(&self) -> StoreResult<CategoryListView> {
        Ok(CategoryListView {
            categories: self.list_categories()?,
        })
    }

    pub fn site_list_view(&self, category_id: Option<CategoryId>) -> StoreResult<SiteListView> {
        Ok(SiteListView {
            sites: self.list_sites(category_id)?,
            categories: self.list_categories()?,
            tags: self.list_tags()?,
            category_id,
        })
    }

    pub fn page_list_view(&self, filter: PageFilter) -> StoreResult<PageListView> {
        Ok(PageListView {
            pages: self.list_pages(&filter)?,
            sites: self.list_sites(None)?,
            categories: self.list_categories()?,
            tags: self.list_tags()?,
            filter,
        })
    }

    /// A site and its pages; fails with not-found for an unknown site
    pub fn site_pages_view(&self, site_id: SiteId) -> StoreResult<SitePagesView> {
        let site = self.get_site(site_id)?;
        Ok(SitePagesView {
            pages: self.list_pages(&PageFilter::by_site(site.id))?,
            site,
        })
    }

    pub fn tag_list_view(&self) -> StoreResult<TagListView> {
        Ok(TagListView {
            tags: self.list_tags()?,
        })
    }

    pub fn tag_items_view(&self, tag_id: TagId) -> StoreResult<TagItemsView> {
        let tag = self.get_tag(tag_id)?;
        Ok(TagItemsView {
            sites: self.list_sites_by_tag(tag.id)?,
            pages: self.list_pages(&PageFilter::by_tag(tag.id))?,
            tag,
        })
    }

    pub fn search_view(&self, query: &str) -> StoreResult<SearchView> {
        Ok(SearchView {
            results: self.search(query)?,
            query: query.trim().to_string(),
        })
    }

    pub fn site_edit_view(&self, site_id: SiteId) -> StoreResult<SiteEditView> {
        Ok(SiteEditView {
            site: self.get_site(site_id)?,
            categories: self.list_categories()?,
        })
    }

    pub fn page_edit_view(&self, page_id: PageId) -> StoreResult<PageEditView> {
        Ok(PageEditView {
            page: self.get_page(page_id)?,
            sites: self.list_sites(None)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    /// One category, two sites, three pages; `rust` is on one site and one
    /// page of the other site.
    fn seeded() -> (Store, TagId) {
        let store = Store::open_in_memory().unwrap();
        let lang = store.create_category("Languages", "").unwrap();
        let rust = store.create_site(Some(lang), "rust-lang.org", "Rust", "").unwrap();
        let blog = store.create_site(None, "blog.example", "", "").unwrap();
        store.create_page(rust, "/learn", "Learn", "").unwrap();
        let post = store.create_page(blog, "/rust-2024", "Rust 2024", "").unwrap();
        store.create_page(blog, "/cooking", "Cooking", "").unwrap();

        let tag = store.get_or_create_tag("rust").unwrap();
        store.add_site_tag(rust, tag).unwrap();
        store.add_page_tag(post, tag).unwrap();
        (store, tag)
    }

    #[test]
    fn test_tag_items_view_includes_inherited_pages() {
        let (store, tag) = seeded();
        let view = store.tag_items_view(tag).unwrap();

        assert_eq!(view.tag.name, "rust");
        assert_eq!(view.sites.len(), 1);
        assert_eq!(view.sites[0].domain, "rust-lang.org");
        let mut paths: Vec<&str> = view.pages.iter().map(|p| p.path.as_str()).collect();
        paths.sort();
        assert_eq!(paths, vec!["/learn", "/rust-2024"]);
    }

    #[test]
    fn test_site_list_view_keeps_filter() {
        let (store, _) = seeded();
        let lang = store.list_categories().unwrap()[0].id;

        let view = store.site_list_view(Some(lang)).unwrap();
        assert_eq!(view.category_id, Some(lang));
        assert_eq!(view.sites.len(), 1);
        assert_eq!(view.categories.len(), 1);
        assert_eq!(view.tags.len(), 1);

        assert_eq!(store.site_list_view(None).unwrap().sites.len(), 2);
    }

    #[test]
    fn test_page_list_view() {
        let (store, tag) = seeded();
        let view = store.page_list_view(PageFilter::by_tag(tag)).unwrap();
        assert_eq!(view.pages.len(), 2);
        assert_eq!(view.sites.len(), 2);
        assert_eq!(view.filter.tag_id, Some(tag));
    }

    #[test]
    fn test_site_pages_view() {
        let (store, _) = seeded();
        let blog = store.get_site_by_domain("blog.example").unwrap();

        let view = store.site_pages_view(blog.id).unwrap();
        assert_eq!(view.site.id, blog.id);
        assert_eq!(view.pages.len(), 2);

        assert!(store.site_pages_view(999).unwrap_err().is_not_found());
    }

    #[test]
    fn test_edit_views() {
        let (store, _) = seeded();
        let site = store.get_site_by_domain("rust-lang.org").unwrap();
        let view = store.site_edit_view(site.id).unwrap();
        assert_eq!(view.site.name.as_deref(), Some("Rust"));
        assert_eq!(view.categories.len(), 1);

        let page = store.list_pages(&PageFilter::by_site(site.id)).unwrap()[0].id;
        let view = store.page_edit_view(page).unwrap();
        assert_eq!(view.page.path, "/learn");
        assert_eq!(view.sites.len(), 2);

        assert!(store.page_edit_view(999).unwrap_err().is_not_found());
    }

    #[test]
    fn test_search_view() {
        let (store, _) = seeded();
        let view = store.search_view("  rust ").unwrap();
        assert_eq!(view.query, "rust");
        assert_eq!(view.results.sites.len(), 1);
        assert_eq!(view.results.pages.len(), 1);

        assert!(matches!(
            store.search_view(""),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn test_dashboard_and_list_views_serialize() {
        let (store, _) = seeded();
        let dashboard = serde_json::to_value(store.dashboard_view().unwrap()).unwrap();
        assert_eq!(dashboard["stats"]["page_count"], 3);

        let tags = serde_json::to_value(store.tag_list_view().unwrap()).unwrap();
        assert_eq!(tags["tags"][0]["name"], "rust");

        let categories = store.category_list_view().unwrap();
        assert_eq!(categories.categories[0].site_count, 1);
    }
}
