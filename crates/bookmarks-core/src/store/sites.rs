//! Site operations

use std::collections::BTreeSet;

use rusqlite::{params, Connection, OptionalExtension};

use super::{
    hydrate_sites, now_millis, optional_text, required_text, site_from_row, tags_for_site, Store,
    SITE_SELECT,
};
use crate::error::{StoreError, StoreResult};
use crate::models::{CategoryId, Site, SiteId, TagId};

impl Store {
    /// All sites, optionally restricted to one category, ordered by domain
    ///
    /// Each site carries its category name, page count and tags.
    pub fn list_sites(&self, category_id: Option<CategoryId>) -> StoreResult<Vec<Site>> {
        let conn = self.conn()?;
        let sites = match category_id {
            Some(category_id) => {
                let mut stmt = conn.prepare(&format!(
                    "{} WHERE s.category_id = ? ORDER BY s.domain, s.id",
                    SITE_SELECT
                ))?;
                let rows = stmt
                    .query_map(params![category_id], site_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt =
                    conn.prepare(&format!("{} ORDER BY s.domain, s.id", SITE_SELECT))?;
                let rows = stmt
                    .query_map([], site_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        hydrate_sites(&conn, sites)
    }

    /// Sites carrying a tag, ordered by domain
    pub fn list_sites_by_tag(&self, tag_id: TagId) -> StoreResult<Vec<Site>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE EXISTS (SELECT 1 FROM site_tags st WHERE st.site_id = s.id AND st.tag_id = ?) \
             ORDER BY s.domain, s.id",
            SITE_SELECT
        ))?;
        let sites = stmt
            .query_map(params![tag_id], site_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        hydrate_sites(&conn, sites)
    }

    /// Get a site by ID
    pub fn get_site(&self, id: SiteId) -> StoreResult<Site> {
        let conn = self.conn()?;
        let site = conn
            .query_row(
                &format!("{} WHERE s.id = ?", SITE_SELECT),
                params![id],
                site_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found("Site", id))?;
        with_tags(&conn, site)
    }

    /// Get a site by its exact domain
    pub fn get_site_by_domain(&self, domain: &str) -> StoreResult<Site> {
        let domain = domain.trim();
        let conn = self.conn()?;
        let site = conn
            .query_row(
                &format!("{} WHERE s.domain = ?", SITE_SELECT),
                params![domain],
                site_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found("Site", domain))?;
        with_tags(&conn, site)
    }

    /// Create a site, returning its ID
    ///
    /// Blank name and description are stored as absent.
    pub fn create_site(
        &self,
        category_id: Option<CategoryId>,
        domain: &str,
        name: &str,
        description: &str,
    ) -> StoreResult<SiteId> {
        let domain = required_text(domain, "Domain")?;
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO sites (category_id, domain, name, description, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                category_id,
                domain,
                optional_text(name),
                optional_text(description),
                now_millis(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Replace every mutable field of a site
    pub fn update_site(
        &self,
        id: SiteId,
        category_id: Option<CategoryId>,
        domain: &str,
        name: &str,
        description: &str,
    ) -> StoreResult<()> {
        let domain = required_text(domain, "Domain")?;
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE sites SET category_id = ?, domain = ?, name = ?, description = ? WHERE id = ?",
            params![
                category_id,
                domain,
                optional_text(name),
                optional_text(description),
                id
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::not_found("Site", id));
        }
        Ok(())
    }

    /// Delete a site together with its pages and tag links
    pub fn delete_site(&self, id: SiteId) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM sites WHERE id = ?", params![id])?;
        Ok(())
    }

    /// Replace the full tag set of a site
    ///
    /// Runs in one transaction: either every link is replaced or none is.
    pub fn set_site_tags(&self, site_id: SiteId, tag_ids: &[TagId]) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        if !site_exists(&tx, site_id)? {
            return Err(StoreError::not_found("Site", site_id));
        }

        tx.execute("DELETE FROM site_tags WHERE site_id = ?", params![site_id])?;
        {
            let mut insert =
                tx.prepare("INSERT INTO site_tags (site_id, tag_id) VALUES (?, ?)")?;
            for tag_id in tag_ids.iter().collect::<BTreeSet<_>>() {
                insert.execute(params![site_id, tag_id])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Link a tag to a site; no-op if already linked
    pub fn add_site_tag(&self, site_id: SiteId, tag_id: TagId) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO site_tags (site_id, tag_id) VALUES (?, ?)",
            params![site_id, tag_id],
        )?;
        Ok(())
    }

    /// Unlink a tag from a site; no-op if not linked
    pub fn remove_site_tag(&self, site_id: SiteId, tag_id: TagId) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM site_tags WHERE site_id = ? AND tag_id = ?",
            params![site_id, tag_id],
        )?;
        Ok(())
    }
}

fn with_tags(conn: &Connection, mut site: Site) -> StoreResult<Site> {
    site.tags = tags_for_site(conn, site.id)?;
    Ok(site)
}

fn site_exists(conn: &Connection, site_id: SiteId) -> StoreResult<bool> {
    let exists = conn
        .prepare_cached("SELECT 1 FROM sites WHERE id = ?")?
        .exists(params![site_id])?;
    Ok(exists)
}
