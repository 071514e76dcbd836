//! Tag command handlers

use anyhow::{Context, Result};

use bookmarks_core::models::parse_tag_list;
use bookmarks_core::{Store, StoreError, Tag, TagId};

use crate::output::Output;
use crate::prompt::confirm_delete;

/// List all tags with usage counts
pub fn list(store: &Store, output: &Output) -> Result<()> {
    let view = store.tag_list_view()?;
    output.print_tags(&view);
    Ok(())
}

/// Create a tag
pub fn create(store: &Store, name: String, output: &Output) -> Result<()> {
    let id = store.create_tag(&name).context("Failed to create tag")?;
    output.success(&format!("Created tag: {}", id));
    output.print_tag(&store.get_tag(id)?);
    Ok(())
}

/// Delete a tag and detach it everywhere
pub fn delete(store: &Store, tag: String, yes: bool, output: &Output) -> Result<()> {
    let tag = resolve(store, &tag)?;
    let what = format!(
        "tag: {} (used by {} site(s), {} page(s))",
        tag.name, tag.site_count, tag.page_count
    );
    if !confirm_delete(output, yes, &what)? {
        return Ok(());
    }

    store.delete_tag(tag.id).context("Failed to delete tag")?;
    output.success(&format!("Deleted tag: {}", tag.name));
    Ok(())
}

/// Show every site and page carrying a tag
pub fn items(store: &Store, tag: String, output: &Output) -> Result<()> {
    let tag = resolve(store, &tag)?;
    let view = store.tag_items_view(tag.id)?;
    output.print_tag_items(&view);
    Ok(())
}

/// Find a tag by numeric ID or by name
pub fn resolve(store: &Store, tag: &str) -> Result<Tag> {
    if let Ok(id) = tag.trim().parse::<TagId>() {
        return Ok(store.get_tag(id)?);
    }
    store
        .find_tag(tag)?
        .ok_or_else(|| StoreError::not_found("Tag", tag.trim()).into())
}

/// Turn comma-separated tag input into tag IDs, creating missing tags
pub fn ids_from_input(store: &Store, input: &str) -> Result<Vec<TagId>> {
    parse_tag_list(input)
        .iter()
        .map(|name| {
            store
                .get_or_create_tag(name)
                .with_context(|| format!("Invalid tag '{}'", name))
        })
        .collect()
}
