//! Category command handlers

use anyhow::{Context, Result};

use bookmarks_core::{CategoryId, Store};

use crate::output::Output;
use crate::prompt::confirm_delete;

/// List all categories with site counts
pub fn list(store: &Store, output: &Output) -> Result<()> {
    let view = store.category_list_view()?;
    output.print_categories(&view);
    Ok(())
}

/// Show a single category
pub fn show(store: &Store, id: CategoryId, output: &Output) -> Result<()> {
    let category = store.get_category(id)?;
    output.print_category(&category);
    Ok(())
}

/// Create a category
pub fn create(store: &Store, name: String, description: String, output: &Output) -> Result<()> {
    let id = store
        .create_category(&name, &description)
        .context("Failed to create category")?;

    output.success(&format!("Created category: {}", id));
    output.print_category(&store.get_category(id)?);
    Ok(())
}

/// Edit a category; unset fields keep their current value
pub fn edit(
    store: &Store,
    id: CategoryId,
    name: Option<String>,
    description: Option<String>,
    output: &Output,
) -> Result<()> {
    let current = store.get_category(id)?;
    let name = name.unwrap_or(current.name);
    let description = description.or(current.description).unwrap_or_default();

    store
        .update_category(id, &name, &description)
        .context("Failed to update category")?;

    output.success("Category updated");
    output.print_category(&store.get_category(id)?);
    Ok(())
}

/// Delete a category; its sites become uncategorized
pub fn delete(store: &Store, id: CategoryId, yes: bool, output: &Output) -> Result<()> {
    let category = store.get_category(id)?;
    let what = format!(
        "category: {} ({} site(s) will be uncategorized)",
        category.name, category.site_count
    );
    if !confirm_delete(output, yes, &what)? {
        return Ok(());
    }

    store
        .delete_category(id)
        .context("Failed to delete category")?;

    output.success(&format!("Deleted category: {}", id));
    Ok(())
}
