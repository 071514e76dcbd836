//! Page operations

use std::collections::BTreeSet;

use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use super::{
    hydrate_pages, now_millis, optional_text, page_from_row, tags_for_page, tags_for_site, Store,
    PAGE_SELECT,
};
use crate::error::{StoreError, StoreResult};
use crate::models::{Page, PageFilter, PageId, SiteId, TagId};

/// Path stored when the caller leaves it blank
const ROOT_PATH: &str = "/";

impl Store {
    /// Pages matching every set filter, newest first
    ///
    /// The tag filter matches a page tag or a tag on the owning site. Each
    /// page appears once regardless of how many ways it matches.
    pub fn list_pages(&self, filter: &PageFilter) -> StoreResult<Vec<Page>> {
        let conn = self.conn()?;
        query_pages(&conn, filter, None)
    }

    /// Get a page by ID, with its own and inherited tags
    pub fn get_page(&self, id: PageId) -> StoreResult<Page> {
        let conn = self.conn()?;
        let mut page = conn
            .query_row(
                &format!("{} WHERE p.id = ?", PAGE_SELECT),
                params![id],
                page_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found("Page", id))?;
        page.tags = tags_for_page(&conn, page.id)?;
        page.site_tags = tags_for_site(&conn, page.site_id)?;
        Ok(page)
    }

    /// Create a page under a site, returning its ID
    ///
    /// A blank path becomes `/`. Blank title and description are stored as
    /// absent.
    pub fn create_page(
        &self,
        site_id: SiteId,
        path: &str,
        title: &str,
        description: &str,
    ) -> StoreResult<PageId> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO pages (site_id, path, title, description, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                site_id,
                page_path(path),
                optional_text(title),
                optional_text(description),
                now_millis(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Replace every mutable field of a page, including its site
    pub fn update_page(
        &self,
        id: PageId,
        site_id: SiteId,
        path: &str,
        title: &str,
        description: &str,
    ) -> StoreResult<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE pages SET site_id = ?, path = ?, title = ?, description = ? WHERE id = ?",
            params![
                site_id,
                page_path(path),
                optional_text(title),
                optional_text(description),
                id
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::not_found("Page", id));
        }
        Ok(())
    }

    /// Delete a page and its tag links
    pub fn delete_page(&self, id: PageId) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM pages WHERE id = ?", params![id])?;
        Ok(())
    }

    /// Replace the full tag set of a page
    ///
    /// Runs in one transaction: either every link is replaced or none is.
    pub fn set_page_tags(&self, page_id: PageId, tag_ids: &[TagId]) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        if !page_exists(&tx, page_id)? {
            return Err(StoreError::not_found("Page", page_id));
        }

        tx.execute("DELETE FROM page_tags WHERE page_id = ?", params![page_id])?;
        {
            let mut insert =
                tx.prepare("INSERT INTO page_tags (page_id, tag_id) VALUES (?, ?)")?;
            for tag_id in tag_ids.iter().collect::<BTreeSet<_>>() {
                insert.execute(params![page_id, tag_id])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Link a tag to a page; no-op if already linked
    pub fn add_page_tag(&self, page_id: PageId, tag_id: TagId) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO page_tags (page_id, tag_id) VALUES (?, ?)",
            params![page_id, tag_id],
        )?;
        Ok(())
    }

    /// Unlink a tag from a page; no-op if not linked
    pub fn remove_page_tag(&self, page_id: PageId, tag_id: TagId) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM page_tags WHERE page_id = ? AND tag_id = ?",
            params![page_id, tag_id],
        )?;
        Ok(())
    }
}

/// Build and run the filtered page query
pub(super) fn query_pages(
    conn: &Connection,
    filter: &PageFilter,
    limit: Option<i64>,
) -> StoreResult<Vec<Page>> {
    let mut sql = String::from(PAGE_SELECT);
    let mut conditions: Vec<&str> = Vec::new();
    let mut args: Vec<i64> = Vec::new();

    if let Some(site_id) = filter.site_id {
        conditions.push("p.site_id = ?");
        args.push(site_id);
    }
    if let Some(category_id) = filter.category_id {
        conditions.push("s.category_id = ?");
        args.push(category_id);
    }
    if let Some(tag_id) = filter.tag_id {
        conditions.push(
            "(EXISTS (SELECT 1 FROM page_tags pt WHERE pt.page_id = p.id AND pt.tag_id = ?) \
             OR EXISTS (SELECT 1 FROM site_tags st WHERE st.site_id = p.site_id AND st.tag_id = ?))",
        );
        args.push(tag_id);
        args.push(tag_id);
    }

    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(" ORDER BY p.created_at DESC, p.id DESC");
    if let Some(limit) = limit {
        sql.push_str(" LIMIT ?");
        args.push(limit);
    }

    let mut stmt = conn.prepare(&sql)?;
    let pages = stmt
        .query_map(params_from_iter(args.iter()), page_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    hydrate_pages(conn, pages)
}

fn page_path(path: &str) -> &str {
    let path = path.trim();
    if path.is_empty() {
        ROOT_PATH
    } else {
        path
    }
}

fn page_exists(conn: &Connection, page_id: PageId) -> StoreResult<bool> {
    let exists = conn
        .prepare_cached("SELECT 1 FROM pages WHERE id = ?")?
        .exists(params![page_id])?;
    Ok(exists)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        store: Store,
        rust_site: SiteId,
        news_site: SiteId,
        lang: i64,
    }

    /// Two sites in different categories with a couple of pages each
    fn fixture() -> Fixture {
        let store = Store::open_in_memory().unwrap();
        let lang = store.create_category("Languages", "").unwrap();
        let news = store.create_category("News", "").unwrap();
        let rust_site = store.create_site(Some(lang), "rust-lang.org", "", "").unwrap();
        let news_site = store.create_site(Some(news), "lwn.net", "", "").unwrap();
        Fixture {
            store,
            rust_site,
            news_site,
            lang,
        }
    }

    fn paths(pages: &[Page]) -> Vec<&str> {
        pages.iter().map(|p| p.path.as_str()).collect()
    }

    #[test]
    fn test_create_and_get_page() {
        let f = fixture();
        let id = f
            .store
            .create_page(f.rust_site, "/learn", "Learn Rust", "")
            .unwrap();

        let page = f.store.get_page(id).unwrap();
        assert_eq!(page.site_id, f.rust_site);
        assert_eq!(page.site_domain, "rust-lang.org");
        assert_eq!(page.path, "/learn");
        assert_eq!(page.title.as_deref(), Some("Learn Rust"));
        assert!(page.description.is_none());
    }

    #[test]
    fn test_blank_path_defaults_to_root() {
        let f = fixture();
        let id = f.store.create_page(f.rust_site, "  ", "", "").unwrap();
        assert_eq!(f.store.get_page(id).unwrap().path, "/");
    }

    #[test]
    fn test_path_unique_per_site() {
        let f = fixture();
        f.store.create_page(f.rust_site, "/about", "", "").unwrap();
        f.store.create_page(f.news_site, "/about", "", "").unwrap();
        assert!(f
            .store
            .create_page(f.rust_site, "/about", "", "")
            .unwrap_err()
            .is_constraint_violation());
    }

    #[test]
    fn test_page_requires_existing_site() {
        let f = fixture();
        assert!(f
            .store
            .create_page(404, "/x", "", "")
            .unwrap_err()
            .is_constraint_violation());
    }

    #[test]
    fn test_get_page_includes_inherited_tags() {
        let f = fixture();
        let page = f.store.create_page(f.rust_site, "/book", "", "").unwrap();
        let own = f.store.get_or_create_tag("book").unwrap();
        let inherited = f.store.get_or_create_tag("rust").unwrap();
        f.store.set_page_tags(page, &[own]).unwrap();
        f.store.set_site_tags(f.rust_site, &[inherited]).unwrap();

        let page = f.store.get_page(page).unwrap();
        assert_eq!(page.tags.len(), 1);
        assert_eq!(page.tags[0].name, "book");
        assert_eq!(page.site_tags.len(), 1);
        assert_eq!(page.site_tags[0].name, "rust");
    }

    #[test]
    fn test_inherited_tags_follow_site_changes() {
        let f = fixture();
        let page = f.store.create_page(f.rust_site, "/book", "", "").unwrap();
        let tag = f.store.get_or_create_tag("rust").unwrap();

        f.store.add_site_tag(f.rust_site, tag).unwrap();
        assert_eq!(f.store.get_page(page).unwrap().site_tags.len(), 1);

        f.store.remove_site_tag(f.rust_site, tag).unwrap();
        assert!(f.store.get_page(page).unwrap().site_tags.is_empty());
    }

    #[test]
    fn test_list_pages_newest_first() {
        let f = fixture();
        f.store.create_page(f.rust_site, "/first", "", "").unwrap();
        f.store.create_page(f.news_site, "/second", "", "").unwrap();
        f.store.create_page(f.rust_site, "/third", "", "").unwrap();

        let pages = f.store.list_pages(&PageFilter::default()).unwrap();
        assert_eq!(paths(&pages), vec!["/third", "/second", "/first"]);
    }

    #[test]
    fn test_filter_by_site_and_category() {
        let f = fixture();
        f.store.create_page(f.rust_site, "/a", "", "").unwrap();
        f.store.create_page(f.news_site, "/b", "", "").unwrap();

        let by_site = f.store.list_pages(&PageFilter::by_site(f.news_site)).unwrap();
        assert_eq!(paths(&by_site), vec!["/b"]);

        let by_category = f.store.list_pages(&PageFilter::by_category(f.lang)).unwrap();
        assert_eq!(paths(&by_category), vec!["/a"]);
    }

    #[test]
    fn test_tag_filter_matches_site_tags() {
        let f = fixture();
        let page = f.store.create_page(f.rust_site, "/learn", "", "").unwrap();
        f.store.create_page(f.news_site, "/kernel", "", "").unwrap();
        let tag = f.store.get_or_create_tag("rust").unwrap();
        f.store.add_site_tag(f.rust_site, tag).unwrap();

        let pages = f.store.list_pages(&PageFilter::by_tag(tag)).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].id, page);
    }

    #[test]
    fn test_tag_filter_is_distinct() {
        let f = fixture();
        let page = f.store.create_page(f.rust_site, "/learn", "", "").unwrap();
        let tag = f.store.get_or_create_tag("rust").unwrap();
        f.store.add_site_tag(f.rust_site, tag).unwrap();
        f.store.add_page_tag(page, tag).unwrap();

        let pages = f.store.list_pages(&PageFilter::by_tag(tag)).unwrap();
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_site_and_tag_filters_combine() {
        let f = fixture();
        let tag = f.store.get_or_create_tag("read-later").unwrap();
        let rust_page = f.store.create_page(f.rust_site, "/a", "", "").unwrap();
        let news_page = f.store.create_page(f.news_site, "/b", "", "").unwrap();
        f.store.create_page(f.rust_site, "/untagged", "", "").unwrap();
        f.store.add_page_tag(rust_page, tag).unwrap();
        f.store.add_page_tag(news_page, tag).unwrap();

        let filter = PageFilter {
            site_id: Some(f.rust_site),
            tag_id: Some(tag),
            ..PageFilter::default()
        };
        let pages = f.store.list_pages(&filter).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].id, rust_page);
    }

    #[test]
    fn test_update_page_moves_between_sites() {
        let f = fixture();
        let id = f.store.create_page(f.rust_site, "/x", "Old", "d").unwrap();

        f.store
            .update_page(id, f.news_site, "", "New", "")
            .unwrap();

        let page = f.store.get_page(id).unwrap();
        assert_eq!(page.site_id, f.news_site);
        assert_eq!(page.site_domain, "lwn.net");
        assert_eq!(page.path, "/");
        assert_eq!(page.title.as_deref(), Some("New"));
        assert!(page.description.is_none());

        assert!(f
            .store
            .update_page(999, f.news_site, "/", "", "")
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_delete_page_removes_links() {
        let f = fixture();
        let id = f.store.create_page(f.rust_site, "/gone", "", "").unwrap();
        let tag = f.store.get_or_create_tag("tmp").unwrap();
        f.store.set_page_tags(id, &[tag]).unwrap();

        f.store.delete_page(id).unwrap();
        f.store.delete_page(id).unwrap();

        assert!(f.store.get_page(id).unwrap_err().is_not_found());
        assert_eq!(f.store.get_tag(tag).unwrap().page_count, 0);
    }

    #[test]
    fn test_set_page_tags_replaces_previous_set() {
        let f = fixture();
        let page = f.store.create_page(f.rust_site, "/p", "", "").unwrap();
        let t1 = f.store.get_or_create_tag("one").unwrap();
        let t2 = f.store.get_or_create_tag("two").unwrap();
        let t3 = f.store.get_or_create_tag("three").unwrap();

        f.store.set_page_tags(page, &[t1, t2]).unwrap();
        f.store.set_page_tags(page, &[t3]).unwrap();

        let ids: Vec<TagId> = f.store.get_page(page).unwrap().tags.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![t3]);
        assert!(f.store.set_page_tags(9999, &[t1]).unwrap_err().is_not_found());
    }

    #[test]
    fn test_query_pages_limit() {
        let f = fixture();
        for i in 0..5 {
            f.store
                .create_page(f.rust_site, &format!("/{}", i), "", "")
                .unwrap();
        }
        let conn = f.store.conn().unwrap();
        let pages = query_pages(&conn, &PageFilter::default(), Some(2)).unwrap();
        assert_eq!(paths(&pages), vec!["/4", "/3"]);
    }
}
