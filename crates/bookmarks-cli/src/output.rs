//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use chrono::{DateTime, Utc};
use serde::Serialize;

use bookmarks_core::views::{
    CategoryListView, DashboardView, PageListView, SearchView, SiteListView, SitePagesView,
    TagItemsView, TagListView,
};
use bookmarks_core::{Category, Intake, Page, Site, StorageError, Tag, TagRef};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    pub fn print_dashboard(&self, view: &DashboardView) {
        let stats = &view.stats;
        match self.format {
            OutputFormat::Human => {
                println!(
                    "Categories: {}   Sites: {}   Pages: {}",
                    stats.category_count, stats.site_count, stats.page_count
                );
                println!();
                if stats.recent_pages.is_empty() {
                    println!("No pages yet. Add one with: bookmarks add <url>");
                    return;
                }
                println!("Recent pages:");
                for page in &stats.recent_pages {
                    println!(
                        "  {}  {} | {}",
                        date(&page.created_at),
                        truncate(page.display_title(), 40),
                        truncate(&page.url(), 50)
                    );
                }
            }
            OutputFormat::Json => print_json(view),
            OutputFormat::Quiet => {
                println!(
                    "{} {} {}",
                    stats.category_count, stats.site_count, stats.page_count
                );
            }
        }
    }

    pub fn print_category(&self, category: &Category) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:          {}", category.id);
                println!("Name:        {}", category.name);
                if let Some(ref desc) = category.description {
                    println!("Description: {}", desc);
                }
                println!("Sites:       {}", category.site_count);
                println!("Created:     {}", category.created_at.format("%Y-%m-%d %H:%M"));
            }
            OutputFormat::Json => print_json(category),
            OutputFormat::Quiet => println!("{}", category.id),
        }
    }

    pub fn print_categories(&self, view: &CategoryListView) {
        let categories = &view.categories;
        match self.format {
            OutputFormat::Human => {
                if categories.is_empty() {
                    println!("No categories found.");
                    return;
                }
                for category in categories {
                    println!(
                        "{:>4} | {} ({} sites)",
                        category.id,
                        truncate(&category.name, 40),
                        category.site_count
                    );
                }
                println!("\n{} category(ies)", categories.len());
            }
            OutputFormat::Json => print_json(view),
            OutputFormat::Quiet => {
                for category in categories {
                    println!("{}", category.id);
                }
            }
        }
    }

    pub fn print_site(&self, site: &Site) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:          {}", site.id);
                println!("Domain:      {}", site.domain);
                if let Some(ref name) = site.name {
                    println!("Name:        {}", name);
                }
                if let Some(ref desc) = site.description {
                    println!("Description: {}", desc);
                }
                if !site.category_name.is_empty() {
                    println!("Category:    {}", site.category_name);
                }
                if !site.tags.is_empty() {
                    println!("Tags:        {}", join_tags(site.tags.iter()));
                }
                println!("Pages:       {}", site.page_count);
                println!("Created:     {}", site.created_at.format("%Y-%m-%d %H:%M"));
            }
            OutputFormat::Json => print_json(site),
            OutputFormat::Quiet => println!("{}", site.id),
        }
    }

    pub fn print_sites(&self, view: &SiteListView) {
        match self.format {
            OutputFormat::Json => print_json(view),
            _ => self.site_rows(&view.sites),
        }
    }

    pub fn print_site_pages(&self, view: &SitePagesView) {
        match self.format {
            OutputFormat::Human => {
                println!("{} ({})", view.site.display_name(), view.site.domain);
                println!();
                self.page_rows(&view.pages);
            }
            OutputFormat::Json => print_json(view),
            OutputFormat::Quiet => self.page_rows(&view.pages),
        }
    }

    pub fn print_page(&self, page: &Page) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:          {}", page.id);
                println!("Title:       {}", page.display_title());
                println!("URL:         {}", page.url());
                if let Some(ref desc) = page.description {
                    println!("Description: {}", desc);
                }
                if !page.tags.is_empty() {
                    println!("Tags:        {}", join_tags(page.tags.iter()));
                }
                if !page.site_tags.is_empty() {
                    println!("Site tags:   {}", join_tags(page.site_tags.iter()));
                }
                println!("Created:     {}", page.created_at.format("%Y-%m-%d %H:%M"));
            }
            OutputFormat::Json => print_json(page),
            OutputFormat::Quiet => println!("{}", page.id),
        }
    }

    pub fn print_pages(&self, view: &PageListView) {
        match self.format {
            OutputFormat::Json => print_json(view),
            _ => self.page_rows(&view.pages),
        }
    }

    pub fn print_tags(&self, view: &TagListView) {
        let tags = &view.tags;
        match self.format {
            OutputFormat::Human => {
                if tags.is_empty() {
                    println!("No tags found.");
                    return;
                }
                for tag in tags {
                    println!(
                        "{:>4} | {} ({} sites, {} pages)",
                        tag.id, tag.name, tag.site_count, tag.page_count
                    );
                }
                println!("\n{} tag(s)", tags.len());
            }
            OutputFormat::Json => print_json(view),
            OutputFormat::Quiet => {
                for tag in tags {
                    println!("{}", tag.name);
                }
            }
        }
    }

    pub fn print_tag(&self, tag: &Tag) {
        match self.format {
            OutputFormat::Human => println!("{} ({})", tag.name, tag.id),
            OutputFormat::Json => print_json(tag),
            OutputFormat::Quiet => println!("{}", tag.id),
        }
    }

    pub fn print_tag_items(&self, view: &TagItemsView) {
        match self.format {
            OutputFormat::Human => {
                println!("Tag: {}", view.tag.name);
                println!();
                println!("── Sites ({}) ──", view.sites.len());
                self.site_rows(&view.sites);
                println!();
                println!("── Pages ({}) ──", view.pages.len());
                self.page_rows(&view.pages);
            }
            OutputFormat::Json => print_json(view),
            OutputFormat::Quiet => {
                self.site_rows(&view.sites);
                self.page_rows(&view.pages);
            }
        }
    }

    pub fn print_search(&self, view: &SearchView) {
        match self.format {
            OutputFormat::Human => {
                if view.results.is_empty() {
                    println!("Nothing matches '{}'.", view.query);
                    return;
                }
                if !view.results.sites.is_empty() {
                    println!("── Sites ({}) ──", view.results.sites.len());
                    self.site_rows(&view.results.sites);
                    println!();
                }
                if !view.results.pages.is_empty() {
                    println!("── Pages ({}) ──", view.results.pages.len());
                    self.page_rows(&view.results.pages);
                }
            }
            OutputFormat::Json => print_json(view),
            OutputFormat::Quiet => {
                for site in &view.results.sites {
                    println!("{}", site.domain);
                }
                for page in &view.results.pages {
                    println!("{}", page.url());
                }
            }
        }
    }

    /// Print what an add produced
    pub fn print_intake(&self, intake: &Intake) {
        match (self.format, intake) {
            (OutputFormat::Json, _) => print_json(intake),
            (_, Intake::Site(site)) => self.print_site(site),
            (_, Intake::Page(page)) => self.print_page(page),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Report a failed command on stderr
    ///
    /// `status` is the HTTP-equivalent code of the failure. Storage failures
    /// also carry a recovery hint.
    pub fn error(&self, error: &anyhow::Error, status: u16) {
        match self.format {
            OutputFormat::Json => eprintln!("{}", error_json(error, status)),
            _ => {
                eprintln!("Error: {:#}", error);
                let hint = storage_error(error).and_then(StorageError::recovery_suggestion);
                if let Some(hint) = hint {
                    eprintln!("Hint: {}", hint);
                }
            }
        }
    }

    fn site_rows(&self, sites: &[Site]) {
        if self.is_quiet() {
            for site in sites {
                println!("{}", site.id);
            }
            return;
        }
        if sites.is_empty() {
            println!("No sites found.");
            return;
        }
        for site in sites {
            let category = if site.category_name.is_empty() {
                String::new()
            } else {
                format!(" [{}]", site.category_name)
            };
            println!(
                "{:>4} | {}{} | {} page(s)",
                site.id,
                truncate(&site.domain, 40),
                category,
                site.page_count
            );
        }
        println!("\n{} site(s)", sites.len());
    }

    fn page_rows(&self, pages: &[Page]) {
        if self.is_quiet() {
            for page in pages {
                println!("{}", page.id);
            }
            return;
        }
        if pages.is_empty() {
            println!("No pages found.");
            return;
        }
        for page in pages {
            println!(
                "{:>4} | {} | {}",
                page.id,
                truncate(page.display_title(), 35),
                truncate(&page.url(), 45)
            );
        }
        println!("\n{} page(s)", pages.len());
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

fn storage_error(error: &anyhow::Error) -> Option<&StorageError> {
    error.downcast_ref::<StorageError>()
}

/// JSON error envelope
fn error_json(error: &anyhow::Error, status: u16) -> serde_json::Value {
    let storage = storage_error(error);
    serde_json::json!({
        "status": "error",
        "code": status,
        "message": format!("{:#}", error),
        "hint": storage.and_then(StorageError::recovery_suggestion),
        "recoverable": storage.is_some_and(StorageError::is_recoverable)
    })
}

fn join_tags<'a>(tags: impl Iterator<Item = &'a TagRef>) -> String {
    tags.map(|t| t.name.as_str()).collect::<Vec<_>>().join(", ")
}

fn date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d").to_string()
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
