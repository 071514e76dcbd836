//! Tag operations
//!
//! Tag names are normalized (trimmed, lower-cased) on every write and
//! lookup, so "Rust", " rust " and "RUST" are the same tag.

use rusqlite::{params, OptionalExtension, Row};

use super::Store;
use crate::error::{StoreError, StoreResult};
use crate::models::{normalize_tag_name, Tag, TagId};

const TAG_SELECT: &str = r#"
    SELECT t.id, t.name,
           (SELECT COUNT(*) FROM site_tags WHERE tag_id = t.id) AS site_count,
           (SELECT COUNT(*) FROM page_tags WHERE tag_id = t.id) AS page_count
    FROM tags t
"#;

fn tag_from_row(row: &Row) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
        site_count: row.get(2)?,
        page_count: row.get(3)?,
    })
}

fn normalized(name: &str) -> StoreResult<String> {
    let name = normalize_tag_name(name);
    if name.is_empty() {
        return Err(StoreError::validation("Tag name is required"));
    }
    Ok(name)
}

impl Store {
    /// All tags with usage counts, ordered by name
    pub fn list_tags(&self) -> StoreResult<Vec<Tag>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY t.name", TAG_SELECT))?;
        let tags = stmt
            .query_map([], tag_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    /// Get a tag by ID
    pub fn get_tag(&self, id: TagId) -> StoreResult<Tag> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("{} WHERE t.id = ?", TAG_SELECT),
            params![id],
            tag_from_row,
        )
        .optional()?
        .ok_or_else(|| StoreError::not_found("Tag", id))
    }

    /// Look up a tag by name, normalizing first
    pub fn find_tag(&self, name: &str) -> StoreResult<Option<Tag>> {
        let name = normalize_tag_name(name);
        let conn = self.conn()?;
        let tag = conn
            .query_row(
                &format!("{} WHERE t.name = ?", TAG_SELECT),
                params![name],
                tag_from_row,
            )
            .optional()?;
        Ok(tag)
    }

    /// Return the ID of the tag with this name, creating it if needed
    ///
    /// This is how free-text tag input becomes tag IDs; repeated calls with
    /// names that normalize the same return the same ID.
    pub fn get_or_create_tag(&self, name: &str) -> StoreResult<TagId> {
        let name = normalized(name)?;
        let conn = self.conn()?;

        // Lookup and insert run under the same lock
        let existing: Option<TagId> = conn
            .query_row("SELECT id FROM tags WHERE name = ?", params![name], |row| {
                row.get(0)
            })
            .optional()?;
        if let Some(id) = existing {
            return Ok(id);
        }

        conn.execute("INSERT INTO tags (name) VALUES (?)", params![name])?;
        Ok(conn.last_insert_rowid())
    }

    /// Create a new tag; fails if the normalized name already exists
    pub fn create_tag(&self, name: &str) -> StoreResult<TagId> {
        let name = normalized(name)?;
        let conn = self.conn()?;
        conn.execute("INSERT INTO tags (name) VALUES (?)", params![name])?;
        Ok(conn.last_insert_rowid())
    }

    /// Delete a tag and every link to it
    pub fn delete_tag(&self, id: TagId) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM tags WHERE id = ?", params![id])?;
        Ok(())
    }
}
