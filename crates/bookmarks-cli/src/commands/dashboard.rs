//! Dashboard and search command handlers

use anyhow::Result;

use bookmarks_core::Store;

use crate::output::Output;

/// Show totals and the most recent pages
pub fn show(store: &Store, output: &Output) -> Result<()> {
    let view = store.dashboard_view()?;
    output.print_dashboard(&view);
    Ok(())
}

/// Search sites and pages
pub fn search(store: &Store, query: String, output: &Output) -> Result<()> {
    let view = store.search_view(&query)?;
    output.print_search(&view);
    Ok(())
}
