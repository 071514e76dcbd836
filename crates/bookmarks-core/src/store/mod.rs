//! Data access layer
//!
//! The `Store` owns the single SQLite connection and exposes every read and
//! write the application performs. Operations are split by entity:
//!
//! - `categories`: category CRUD with live site counts
//! - `sites`: site CRUD, lookup by domain, site tag links
//! - `pages`: filtered page listing, page CRUD, page tag links
//! - `tags`: tag listing with counts, get-or-create by normalized name
//! - `dashboard`: dashboard totals and substring search
//!
//! ## Usage
//!
//! ```ignore
//! let store = Store::open(&Config::load()?)?;
//!
//! let site_id = store.create_site(None, "rust-lang.org", "Rust", "")?;
//! let tag_id = store.get_or_create_tag("Programming")?;
//! store.set_site_tags(site_id, &[tag_id])?;
//!
//! let sites = store.list_sites(None)?;
//! ```
//!
//! Derived fields are computed per call with correlated lookups. Only the
//! tag-set replacements run inside a transaction.

mod categories;
mod dashboard;
mod pages;
mod sites;
mod tags;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use tracing::info;

use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::models::{Page, Site, TagRef};
use crate::storage::{self, StorageError, StorageResult};

/// Name of the SQLite file inside the data directory
pub const DATABASE_FILE: &str = "bookmarks.db";

/// Shared handle to the bookmark database
///
/// Safe to share between threads; statements are serialized on one
/// connection.
pub struct Store {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl Store {
    /// Open the store in the configured data directory
    pub fn open(config: &Config) -> StorageResult<Self> {
        Self::open_at(&config.data_dir)
    }

    /// Open the store in `data_dir`, creating the directory and schema
    pub fn open_at(data_dir: &Path) -> StorageResult<Self> {
        let conn = storage::open_database(data_dir, DATABASE_FILE)?;
        let path = data_dir.join(DATABASE_FILE);
        info!("Opened bookmark store at {:?}", path);
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path),
        })
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        Ok(Self {
            conn: Mutex::new(storage::open_in_memory()?),
            path: None,
        })
    }

    /// Path of the database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Close the connection, reporting any error SQLite raises
    pub fn close(self) -> StorageResult<()> {
        let conn = self
            .conn
            .into_inner()
            .map_err(|_| StorageError::LockPoisoned)?;
        conn.close().map_err(|(_, e)| StorageError::Close(e))
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

// ==================== Shared helpers ====================

pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn from_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

/// Optional text: blank input is stored as NULL
fn optional_text(value: &str) -> Option<&str> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Required text: trimmed, must not be blank
fn required_text<'a>(value: &'a str, field: &str) -> StoreResult<&'a str> {
    optional_text(value).ok_or_else(|| StoreError::validation(format!("{} is required", field)))
}

// ==================== Site rows ====================

const SITE_SELECT: &str = r#"
    SELECT s.id, s.category_id, COALESCE(c.name, '') AS category_name,
           s.domain, s.name, s.description, s.created_at,
           (SELECT COUNT(*) FROM pages WHERE site_id = s.id) AS page_count
    FROM sites s
    LEFT JOIN categories c ON s.category_id = c.id
"#;

fn site_from_row(row: &Row) -> rusqlite::Result<Site> {
    Ok(Site {
        id: row.get(0)?,
        category_id: row.get(1)?,
        category_name: row.get(2)?,
        domain: row.get(3)?,
        name: row.get(4)?,
        description: row.get(5)?,
        created_at: from_millis(row.get(6)?),
        page_count: row.get(7)?,
        tags: Vec::new(),
    })
}

/// Attach the tag list to each site
fn hydrate_sites(conn: &Connection, mut sites: Vec<Site>) -> StoreResult<Vec<Site>> {
    for site in &mut sites {
        site.tags = tags_for_site(conn, site.id)?;
    }
    Ok(sites)
}

fn tags_for_site(conn: &Connection, site_id: i64) -> StoreResult<Vec<TagRef>> {
    let mut stmt = conn.prepare_cached(
        r#"
        SELECT t.id, t.name FROM tags t
        JOIN site_tags st ON t.id = st.tag_id
        WHERE st.site_id = ?
        ORDER BY t.name
        "#,
    )?;

    let tags = stmt
        .query_map(params![site_id], tag_ref_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tags)
}

// ==================== Page rows ====================

const PAGE_SELECT: &str = r#"
    SELECT p.id, p.site_id, s.domain, p.path, p.title, p.description, p.created_at
    FROM pages p
    JOIN sites s ON p.site_id = s.id
"#;

fn page_from_row(row: &Row) -> rusqlite::Result<Page> {
    Ok(Page {
        id: row.get(0)?,
        site_id: row.get(1)?,
        site_domain: row.get(2)?,
        path: row.get(3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        created_at: from_millis(row.get(6)?),
        tags: Vec::new(),
        site_tags: Vec::new(),
    })
}

/// Attach own and inherited tags to each page
fn hydrate_pages(conn: &Connection, mut pages: Vec<Page>) -> StoreResult<Vec<Page>> {
    for page in &mut pages {
        page.tags = tags_for_page(conn, page.id)?;
        page.site_tags = tags_for_site(conn, page.site_id)?;
    }
    Ok(pages)
}

fn tags_for_page(conn: &Connection, page_id: i64) -> StoreResult<Vec<TagRef>> {
    let mut stmt = conn.prepare_cached(
        r#"
        SELECT t.id, t.name FROM tags t
        JOIN page_tags pt ON t.id = pt.tag_id
        WHERE pt.page_id = ?
        ORDER BY t.name
        "#,
    )?;

    let tags = stmt
        .query_map(params![page_id], tag_ref_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tags)
}

fn tag_ref_from_row(row: &Row) -> rusqlite::Result<TagRef> {
    Ok(TagRef {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

/// Escape `%`, `_` and `\` so a LIKE pattern matches the text literally
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
