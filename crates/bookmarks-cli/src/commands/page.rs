//! Page command handlers

use anyhow::{Context, Result};
use clap::Args;

use bookmarks_core::{CategoryId, PageFilter, PageId, SiteId, Store, StoreError};

use crate::commands::tag;
use crate::output::Output;
use crate::prompt::confirm_delete;

/// Fields that `page edit` can change; unset fields keep their value
#[derive(Args, Debug, Default)]
pub struct PageChanges {
    /// Move the page to this site ID
    #[arg(short, long)]
    pub site: Option<SiteId>,
    /// New path (empty for `/`)
    #[arg(short, long)]
    pub path: Option<String>,
    /// Title (empty to clear)
    #[arg(short = 'T', long)]
    pub title: Option<String>,
    /// Description (empty to clear)
    #[arg(short, long)]
    pub description: Option<String>,
    /// Replace all tags (comma-separated; empty to clear)
    #[arg(short, long)]
    pub tags: Option<String>,
}

/// List pages matching the given filters
pub fn list(
    store: &Store,
    site: Option<SiteId>,
    category: Option<CategoryId>,
    tag_name: Option<String>,
    output: &Output,
) -> Result<()> {
    let tag_id = match tag_name {
        Some(ref t) => Some(tag::resolve(store, t)?.id),
        None => None,
    };
    let filter = PageFilter {
        site_id: site,
        category_id: category,
        tag_id,
    };

    let view = store.page_list_view(filter)?;
    output.print_pages(&view);
    Ok(())
}

/// Show a single page
pub fn show(store: &Store, id: PageId, output: &Output) -> Result<()> {
    let page = store.get_page(id)?;
    output.print_page(&page);
    Ok(())
}

/// Create a page under an existing site
pub fn create(
    store: &Store,
    site: SiteId,
    path: String,
    title: String,
    description: String,
    tags: Option<String>,
    output: &Output,
) -> Result<()> {
    let id = store
        .create_page(site, &path, &title, &description)
        .context("Failed to create page")?;

    if let Some(tags) = tags {
        let tag_ids = tag::ids_from_input(store, &tags)?;
        store.set_page_tags(id, &tag_ids)?;
    }

    output.success(&format!("Created page: {}", id));
    output.print_page(&store.get_page(id)?);
    Ok(())
}

/// Edit a page
pub fn edit(store: &Store, id: PageId, changes: PageChanges, output: &Output) -> Result<()> {
    let view = store.page_edit_view(id)?;
    let current = view.page;

    let site_id = match changes.site {
        Some(site_id) if !view.sites.iter().any(|s| s.id == site_id) => {
            return Err(StoreError::not_found("Site", site_id).into());
        }
        Some(site_id) => site_id,
        None => current.site_id,
    };
    let path = changes.path.unwrap_or(current.path);
    let title = changes.title.or(current.title).unwrap_or_default();
    let description = changes
        .description
        .or(current.description)
        .unwrap_or_default();

    store
        .update_page(id, site_id, &path, &title, &description)
        .context("Failed to update page")?;

    if let Some(tags) = changes.tags {
        let tag_ids = tag::ids_from_input(store, &tags)?;
        store.set_page_tags(id, &tag_ids)?;
    }

    output.success("Page updated");
    output.print_page(&store.get_page(id)?);
    Ok(())
}

/// Delete a page
pub fn delete(store: &Store, id: PageId, yes: bool, output: &Output) -> Result<()> {
    let page = store.get_page(id)?;
    if !confirm_delete(output, yes, &format!("page: {}", page.url()))? {
        return Ok(());
    }

    store.delete_page(id).context("Failed to delete page")?;
    output.success(&format!("Deleted page: {}", id));
    Ok(())
}

/// Attach tags to a page, creating them as needed
pub fn add_tags(store: &Store, id: PageId, tags: String, output: &Output) -> Result<()> {
    store.get_page(id)?;
    for tag_id in tag::ids_from_input(store, &tags)? {
        store.add_page_tag(id, tag_id)?;
    }
    output.print_page(&store.get_page(id)?);
    Ok(())
}

/// Detach a tag from a page
pub fn remove_tag(store: &Store, id: PageId, tag_name: String, output: &Output) -> Result<()> {
    let tag = tag::resolve(store, &tag_name)?;
    store.remove_page_tag(id, tag.id)?;
    output.print_page(&store.get_page(id)?);
    Ok(())
}
