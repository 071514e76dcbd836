//! Category operations

use rusqlite::{params, OptionalExtension, Row};

use super::{from_millis, now_millis, optional_text, required_text, Store};
use crate::error::{StoreError, StoreResult};
use crate::models::{Category, CategoryId};

const CATEGORY_SELECT: &str = r#"
    SELECT c.id, c.name, c.description, c.created_at,
           (SELECT COUNT(*) FROM sites WHERE category_id = c.id) AS site_count
    FROM categories c
"#;

fn category_from_row(row: &Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: from_millis(row.get(3)?),
        site_count: row.get(4)?,
    })
}

impl Store {
    /// All categories with site counts, ordered by name
    pub fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY c.name, c.id", CATEGORY_SELECT))?;
        let categories = stmt
            .query_map([], category_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    /// Get a category by ID
    pub fn get_category(&self, id: CategoryId) -> StoreResult<Category> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("{} WHERE c.id = ?", CATEGORY_SELECT),
            params![id],
            category_from_row,
        )
        .optional()?
        .ok_or_else(|| StoreError::not_found("Category", id))
    }

    /// Create a category, returning its ID
    ///
    /// A blank description is stored as absent.
    pub fn create_category(&self, name: &str, description: &str) -> StoreResult<CategoryId> {
        let name = required_text(name, "Category name")?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO categories (name, description, created_at) VALUES (?, ?, ?)",
            params![name, optional_text(description), now_millis()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Replace a category's name and description
    pub fn update_category(
        &self,
        id: CategoryId,
        name: &str,
        description: &str,
    ) -> StoreResult<()> {
        let name = required_text(name, "Category name")?;
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE categories SET name = ?, description = ? WHERE id = ?",
            params![name, optional_text(description), id],
        )?;
        if updated == 0 {
            return Err(StoreError::not_found("Category", id));
        }
        Ok(())
    }

    /// Delete a category; its sites become uncategorized
    pub fn delete_category(&self, id: CategoryId) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM categories WHERE id = ?", params![id])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store::open_in_memory().unwrap()
    }

    #[test]
    fn test_create_and_get_category() {
        let store = store();
        let id = store.create_category("Reference", "Docs and specs").unwrap();

        let category = store.get_category(id).unwrap();
        assert_eq!(category.id, id);
        assert_eq!(category.name, "Reference");
        assert_eq!(category.description.as_deref(), Some("Docs and specs"));
        assert_eq!(category.site_count, 0);
    }

    #[test]
    fn test_blank_description_is_absent() {
        let store = store();
        let id = store.create_category("News", "").unwrap();
        assert!(store.get_category(id).unwrap().description.is_none());
    }

    #[test]
    fn test_blank_name_rejected() {
        let store = store();
        let err = store.create_category("   ", "x").unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn test_duplicate_name_is_constraint_violation() {
        let store = store();
        store.create_category("News", "").unwrap();
        let err = store.create_category("News", "again").unwrap_err();
        assert!(err.is_constraint_violation());
    }

    #[test]
    fn test_get_missing_category() {
        let store = store();
        assert!(store.get_category(99).unwrap_err().is_not_found());
    }

    #[test]
    fn test_list_categories_sorted_with_counts() {
        let store = store();
        let tools = store.create_category("Tools", "").unwrap();
        store.create_category("Articles", "").unwrap();
        store.create_site(Some(tools), "github.com", "", "").unwrap();
        store.create_site(Some(tools), "crates.io", "", "").unwrap();

        let categories = store.list_categories().unwrap();
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Articles", "Tools"]);
        assert_eq!(categories[0].site_count, 0);
        assert_eq!(categories[1].site_count, 2);
    }

    #[test]
    fn test_update_category() {
        let store = store();
        let id = store.create_category("Misc", "stuff").unwrap();

        store.update_category(id, "Miscellaneous", "").unwrap();

        let category = store.get_category(id).unwrap();
        assert_eq!(category.name, "Miscellaneous");
        assert!(category.description.is_none());
    }

    #[test]
    fn test_update_missing_category() {
        let store = store();
        let err = store.update_category(42, "Ghost", "").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_update_into_existing_name() {
        let store = store();
        store.create_category("A", "").unwrap();
        let b = store.create_category("B", "").unwrap();
        assert!(store
            .update_category(b, "A", "")
            .unwrap_err()
            .is_constraint_violation());
    }

    #[test]
    fn test_delete_category_uncategorizes_sites() {
        let store = store();
        let category = store.create_category("Blogs", "").unwrap();
        let a = store.create_site(Some(category), "a.example", "", "").unwrap();
        let b = store.create_site(Some(category), "b.example", "", "").unwrap();

        store.delete_category(category).unwrap();

        for id in [a, b] {
            let site = store.get_site(id).unwrap();
            assert_eq!(site.category_id, None);
            assert_eq!(site.category_name, "");
        }
        assert_eq!(store.list_sites(None).unwrap().len(), 2);
    }

    #[test]
    fn test_delete_missing_category_is_ok() {
        let store = store();
        store.delete_category(1234).unwrap();
    }
}
