//! Site command handlers

use anyhow::{Context, Result};
use clap::Args;

use bookmarks_core::{CategoryId, SiteId, Store, StoreError};

use crate::commands::tag;
use crate::output::Output;
use crate::prompt::confirm_delete;

/// Fields that `site edit` can change; unset fields keep their value
#[derive(Args, Debug, Default)]
pub struct SiteChanges {
    /// New domain
    #[arg(long)]
    pub domain: Option<String>,
    /// Display name (empty to clear)
    #[arg(short, long)]
    pub name: Option<String>,
    /// Description (empty to clear)
    #[arg(short, long)]
    pub description: Option<String>,
    /// Move to this category ID
    #[arg(short, long, conflicts_with = "uncategorize")]
    pub category: Option<CategoryId>,
    /// Remove the site from its category
    #[arg(long)]
    pub uncategorize: bool,
    /// Replace all tags (comma-separated; empty to clear)
    #[arg(short, long)]
    pub tags: Option<String>,
}

/// List sites, optionally in one category
pub fn list(store: &Store, category: Option<CategoryId>, output: &Output) -> Result<()> {
    let view = store.site_list_view(category)?;
    output.print_sites(&view);
    Ok(())
}

/// Show a single site
pub fn show(store: &Store, id: SiteId, output: &Output) -> Result<()> {
    let site = store.get_site(id)?;
    output.print_site(&site);
    Ok(())
}

/// List the pages of a site
pub fn pages(store: &Store, id: SiteId, output: &Output) -> Result<()> {
    let view = store.site_pages_view(id)?;
    output.print_site_pages(&view);
    Ok(())
}

/// Create a site
pub fn create(
    store: &Store,
    domain: String,
    category: Option<CategoryId>,
    name: String,
    description: String,
    tags: Option<String>,
    output: &Output,
) -> Result<()> {
    let id = store
        .create_site(category, &domain, &name, &description)
        .context("Failed to create site")?;

    if let Some(tags) = tags {
        let tag_ids = tag::ids_from_input(store, &tags)?;
        store.set_site_tags(id, &tag_ids)?;
    }

    output.success(&format!("Created site: {}", id));
    output.print_site(&store.get_site(id)?);
    Ok(())
}

/// Edit a site
pub fn edit(store: &Store, id: SiteId, changes: SiteChanges, output: &Output) -> Result<()> {
    let view = store.site_edit_view(id)?;
    let current = view.site;

    let category_id = if changes.uncategorize {
        None
    } else if let Some(category_id) = changes.category {
        if !view.categories.iter().any(|c| c.id == category_id) {
            return Err(StoreError::not_found("Category", category_id).into());
        }
        Some(category_id)
    } else {
        current.category_id
    };
    let domain = changes.domain.unwrap_or(current.domain);
    let name = changes.name.or(current.name).unwrap_or_default();
    let description = changes
        .description
        .or(current.description)
        .unwrap_or_default();

    store
        .update_site(id, category_id, &domain, &name, &description)
        .context("Failed to update site")?;

    if let Some(tags) = changes.tags {
        let tag_ids = tag::ids_from_input(store, &tags)?;
        store.set_site_tags(id, &tag_ids)?;
    }

    output.success("Site updated");
    output.print_site(&store.get_site(id)?);
    Ok(())
}

/// Delete a site and its pages
pub fn delete(store: &Store, id: SiteId, yes: bool, output: &Output) -> Result<()> {
    let site = store.get_site(id)?;
    let what = format!(
        "site: {} ({} page(s) will be deleted)",
        site.domain, site.page_count
    );
    if !confirm_delete(output, yes, &what)? {
        return Ok(());
    }

    store.delete_site(id).context("Failed to delete site")?;
    output.success(&format!("Deleted site: {}", site.domain));
    Ok(())
}

/// Attach tags to a site, creating them as needed
pub fn add_tags(store: &Store, id: SiteId, tags: String, output: &Output) -> Result<()> {
    store.get_site(id)?;
    for tag_id in tag::ids_from_input(store, &tags)? {
        store.add_site_tag(id, tag_id)?;
    }
    output.print_site(&store.get_site(id)?);
    Ok(())
}

/// Detach a tag from a site
pub fn remove_tag(store: &Store, id: SiteId, tag_name: String, output: &Output) -> Result<()> {
    let tag = tag::resolve(store, &tag_name)?;
    store.remove_site_tag(id, tag.id)?;
    output.print_site(&store.get_site(id)?);
    Ok(())
}
