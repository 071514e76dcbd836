//! SQLite schema
//!
//! Every statement is `IF NOT EXISTS`, so applying the schema to an
//! existing database is a no-op. There is no migration machinery.

use rusqlite::{Connection, Result};

/// Apply the full schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sites (
            id INTEGER PRIMARY KEY,
            category_id INTEGER REFERENCES categories(id) ON DELETE SET NULL,
            domain TEXT NOT NULL UNIQUE,
            name TEXT,
            description TEXT,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS pages (
            id INTEGER PRIMARY KEY,
            site_id INTEGER NOT NULL REFERENCES sites(id) ON DELETE CASCADE,
            path TEXT NOT NULL,
            title TEXT,
            description TEXT,
            created_at INTEGER NOT NULL,
            UNIQUE(site_id, path)
        );

        -- Names are stored trimmed and lower-cased
        CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS site_tags (
            site_id INTEGER NOT NULL REFERENCES sites(id) ON DELETE CASCADE,
            tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
            PRIMARY KEY (site_id, tag_id)
        );

        CREATE TABLE IF NOT EXISTS page_tags (
            page_id INTEGER NOT NULL REFERENCES pages(id) ON DELETE CASCADE,
            tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
            PRIMARY KEY (page_id, tag_id)
        );

        CREATE INDEX IF NOT EXISTS idx_sites_category ON sites(category_id);
        CREATE INDEX IF NOT EXISTS idx_pages_site ON pages(site_id);
        CREATE INDEX IF NOT EXISTS idx_pages_created_at ON pages(created_at);
        CREATE INDEX IF NOT EXISTS idx_site_tags_site ON site_tags(site_id);
        CREATE INDEX IF NOT EXISTS idx_site_tags_tag ON site_tags(tag_id);
        CREATE INDEX IF NOT EXISTS idx_page_tags_page ON page_tags(page_id);
        CREATE INDEX IF NOT EXISTS idx_page_tags_tag ON page_tags(tag_id);
        "#,
    )
}
