//! Dashboard totals and search

use rusqlite::{params, Connection};

use super::pages::query_pages;
use super::{hydrate_pages, hydrate_sites, like_pattern, page_from_row, site_from_row, Store};
use super::{PAGE_SELECT, SITE_SELECT};
use crate::error::{StoreError, StoreResult};
use crate::models::{DashboardStats, PageFilter, SearchResults};

/// Pages shown in the dashboard's recent list
pub const RECENT_PAGES: i64 = 10;

/// Maximum results per entity type in a search
pub const SEARCH_LIMIT: i64 = 20;

impl Store {
    /// Entity totals plus the most recently added pages
    pub fn dashboard(&self) -> StoreResult<DashboardStats> {
        let conn = self.conn()?;
        Ok(DashboardStats {
            category_count: count(&conn, "categories")?,
            site_count: count(&conn, "sites")?,
            page_count: count(&conn, "pages")?,
            recent_pages: query_pages(&conn, &PageFilter::default(), Some(RECENT_PAGES))?,
        })
    }

    /// Substring search over sites and pages
    ///
    /// Sites match on domain, name or description and are ordered by domain;
    /// pages match on path, title or description and are ordered newest
    /// first. The two lists are independent and each is capped.
    pub fn search(&self, query: &str) -> StoreResult<SearchResults> {
        let query = query.trim();
        if query.is_empty() {
            return Err(StoreError::validation("Search query is required"));
        }
        let pattern = like_pattern(query);
        let conn = self.conn()?;

        let sites = {
            let mut stmt = conn.prepare(&format!(
                r#"{}
                WHERE s.domain LIKE ?1 ESCAPE '\'
                   OR s.name LIKE ?1 ESCAPE '\'
                   OR s.description LIKE ?1 ESCAPE '\'
                ORDER BY s.domain, s.id
                LIMIT ?2"#,
                SITE_SELECT
            ))?;
            let rows = stmt
                .query_map(params![pattern, SEARCH_LIMIT], site_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        let pages = {
            let mut stmt = conn.prepare(&format!(
                r#"{}
                WHERE p.path LIKE ?1 ESCAPE '\'
                   OR p.title LIKE ?1 ESCAPE '\'
                   OR p.description LIKE ?1 ESCAPE '\'
                ORDER BY p.created_at DESC, p.id DESC
                LIMIT ?2"#,
                PAGE_SELECT
            ))?;
            let rows = stmt
                .query_map(params![pattern, SEARCH_LIMIT], page_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        Ok(SearchResults {
            sites: hydrate_sites(&conn, sites)?,
            pages: hydrate_pages(&conn, pages)?,
        })
    }
}

fn count(conn: &Connection, table: &str) -> StoreResult<i64> {
    let n = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })?;
    Ok(n)
}
