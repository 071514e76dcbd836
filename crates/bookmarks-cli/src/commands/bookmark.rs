//! Bookmark intake command handlers
//!
//! `add` and `quick-add` take a raw URL: root URLs register a site, deeper
//! URLs add a page. A missing title is fetched from the page.

use anyhow::{Context, Result};

use bookmarks_core::models::parse_tag_list;
use bookmarks_core::{Intake, IntakeRequest, Store, TitleFetcher};

use crate::output::Output;

/// Add a bookmark with optional title, description and tags
pub fn add(
    store: &Store,
    fetcher: &dyn TitleFetcher,
    url: String,
    title: Option<String>,
    description: Option<String>,
    tags: Option<String>,
    output: &Output,
) -> Result<()> {
    let request = IntakeRequest::new(
        url,
        title.unwrap_or_default(),
        description.unwrap_or_default(),
    )
    .with_tags(parse_tag_list(tags.as_deref().unwrap_or_default()));

    ingest(store, fetcher, &request, output)
}

/// Add a bookmark from a URL with optional title and tags
pub fn quick_add(
    store: &Store,
    fetcher: &dyn TitleFetcher,
    url: String,
    title: Option<String>,
    tags: Option<String>,
    output: &Output,
) -> Result<()> {
    let request = IntakeRequest::quick(url, title.unwrap_or_default())
        .with_tags(parse_tag_list(tags.as_deref().unwrap_or_default()));
    ingest(store, fetcher, &request, output)
}

fn ingest(
    store: &Store,
    fetcher: &dyn TitleFetcher,
    request: &IntakeRequest,
    output: &Output,
) -> Result<()> {
    let intake = store
        .ingest(request, fetcher)
        .with_context(|| format!("Failed to add {}", request.url.trim()))?;

    match &intake {
        Intake::Site(site) => output.success(&format!("Saved site: {}", site.domain)),
        Intake::Page(page) => output.success(&format!("Added page: {}", page.id)),
    }
    output.print_intake(&intake);
    Ok(())
}
