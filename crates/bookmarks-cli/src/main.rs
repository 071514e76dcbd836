//! Bookmarks CLI
//!
//! Command-line interface for bookmarks - categories, sites, pages and tags.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use bookmarks_core::{
    CategoryId, Config, ConflictStatus, HttpTitleFetcher, PageId, SiteId, Store, StoreError,
};

mod commands;
mod output;
mod prompt;

use commands::page::PageChanges;
use commands::site::SiteChanges;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "bookmarks")]
#[command(about = "Bookmarks - categories, sites, pages and tags")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show totals and recent pages (default)
    Dashboard,
    /// Search sites and pages
    Search {
        /// Text to look for
        query: String,
    },
    /// Add a bookmark from a URL
    Add {
        /// URL to save; a bare domain saves the site only
        url: String,
        /// Title (fetched from the page when omitted)
        #[arg(short = 'T', long)]
        title: Option<String>,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
        /// Tags (comma-separated)
        #[arg(short, long)]
        tags: Option<String>,
    },
    /// Add a bookmark from just a URL
    QuickAdd {
        /// URL to save; a bare domain saves the site only
        url: String,
        /// Title (fetched from the page when omitted)
        #[arg(short = 'T', long)]
        title: Option<String>,
        /// Tags (comma-separated)
        #[arg(short, long)]
        tags: Option<String>,
    },
    /// Manage categories
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },
    /// Manage sites
    Site {
        #[command(subcommand)]
        command: SiteCommands,
    },
    /// Manage pages
    Page {
        #[command(subcommand)]
        command: PageCommands,
    },
    /// Manage tags
    Tag {
        #[command(subcommand)]
        command: TagCommands,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum CategoryCommands {
    /// List all categories
    #[command(alias = "ls")]
    List,
    /// Show category details
    Show { id: CategoryId },
    /// Create a category
    #[command(alias = "create")]
    Add {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Rename or re-describe a category
    Edit {
        id: CategoryId,
        #[arg(short, long)]
        name: Option<String>,
        /// Description (empty to clear)
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a category; its sites become uncategorized
    #[command(alias = "delete")]
    Rm {
        id: CategoryId,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum SiteCommands {
    /// List sites
    #[command(alias = "ls")]
    List {
        /// Only sites in this category ID
        #[arg(short, long)]
        category: Option<CategoryId>,
    },
    /// Show site details
    Show { id: SiteId },
    /// List the pages of a site
    Pages { id: SiteId },
    /// Create a site
    #[command(alias = "create")]
    Add {
        /// Domain, e.g. example.com
        domain: String,
        /// Category ID
        #[arg(short, long)]
        category: Option<CategoryId>,
        #[arg(short, long, default_value = "")]
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Tags (comma-separated)
        #[arg(short, long)]
        tags: Option<String>,
    },
    /// Change site fields
    Edit {
        id: SiteId,
        #[command(flatten)]
        changes: SiteChanges,
    },
    /// Delete a site and all its pages
    #[command(alias = "delete")]
    Rm {
        id: SiteId,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Attach tags (comma-separated)
    Tag { id: SiteId, tags: String },
    /// Detach a tag (name or ID)
    Untag { id: SiteId, tag: String },
}

#[derive(Subcommand)]
enum PageCommands {
    /// List pages, newest first
    #[command(alias = "ls")]
    List {
        /// Only pages of this site ID
        #[arg(short, long)]
        site: Option<SiteId>,
        /// Only pages whose site is in this category ID
        #[arg(short, long)]
        category: Option<CategoryId>,
        /// Only pages carrying this tag, directly or through their site
        #[arg(short, long)]
        tag: Option<String>,
    },
    /// Show page details
    Show { id: PageId },
    /// Create a page under an existing site
    #[command(alias = "create")]
    Add {
        /// Site ID
        site: SiteId,
        /// Path, e.g. /docs?page=2 (defaults to /)
        #[arg(default_value = "/")]
        path: String,
        #[arg(short = 'T', long, default_value = "")]
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Tags (comma-separated)
        #[arg(short, long)]
        tags: Option<String>,
    },
    /// Change page fields
    Edit {
        id: PageId,
        #[command(flatten)]
        changes: PageChanges,
    },
    /// Delete a page
    #[command(alias = "delete")]
    Rm {
        id: PageId,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Attach tags (comma-separated)
    Tag { id: PageId, tags: String },
    /// Detach a tag (name or ID)
    Untag { id: PageId, tag: String },
}

#[derive(Subcommand)]
enum TagCommands {
    /// List all tags with usage counts
    #[command(alias = "ls")]
    List,
    /// Create a tag
    #[command(alias = "create")]
    Add { name: String },
    /// Delete a tag (name or ID)
    #[command(alias = "delete")]
    Rm {
        tag: String,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Show sites and pages carrying a tag (name or ID)
    Items { tag: String },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, fetch_timeout_secs, conflict_status, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands don't need the store
    if let Some(Commands::Config { command }) = &cli.command {
        let result = handle_config_command(command.clone(), cli.config.as_ref(), &output);
        return finish(result, ConflictStatus::default(), &output);
    }

    let config = match Config::load_with_cli_override(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => return finish(Err(e), ConflictStatus::default(), &output),
    };
    init_logging(&config);

    let conflicts = config.conflict_status;
    finish(run(cli, &config, &output), conflicts, &output)
}

fn run(cli: Cli, config: &Config, output: &Output) -> Result<()> {
    let store = Store::open(config)?;

    let result = match cli.command.unwrap_or(Commands::Dashboard) {
        Commands::Dashboard => commands::dashboard::show(&store, output),
        Commands::Search { query } => commands::dashboard::search(&store, query, output),
        Commands::Add {
            url,
            title,
            description,
            tags,
        } => {
            let fetcher = HttpTitleFetcher::from_config(config);
            commands::bookmark::add(&store, &fetcher, url, title, description, tags, output)
        }
        Commands::QuickAdd { url, title, tags } => {
            let fetcher = HttpTitleFetcher::from_config(config);
            commands::bookmark::quick_add(&store, &fetcher, url, title, tags, output)
        }
        Commands::Category { command } => handle_category_command(command, &store, output),
        Commands::Site { command } => handle_site_command(command, &store, output),
        Commands::Page { command } => handle_page_command(command, &store, output),
        Commands::Tag { command } => handle_tag_command(command, &store, output),
        Commands::Config { command } => {
            handle_config_command(command, cli.config.as_ref(), output)
        }
    };

    result?;
    store.close()?;
    Ok(())
}

fn handle_category_command(
    command: CategoryCommands,
    store: &Store,
    output: &Output,
) -> Result<()> {
    match command {
        CategoryCommands::List => commands::category::list(store, output),
        CategoryCommands::Show { id } => commands::category::show(store, id, output),
        CategoryCommands::Add { name, description } => {
            commands::category::create(store, name, description, output)
        }
        CategoryCommands::Edit {
            id,
            name,
            description,
        } => commands::category::edit(store, id, name, description, output),
        CategoryCommands::Rm { id, yes } => commands::category::delete(store, id, yes, output),
    }
}

fn handle_site_command(command: SiteCommands, store: &Store, output: &Output) -> Result<()> {
    match command {
        SiteCommands::List { category } => commands::site::list(store, category, output),
        SiteCommands::Show { id } => commands::site::show(store, id, output),
        SiteCommands::Pages { id } => commands::site::pages(store, id, output),
        SiteCommands::Add {
            domain,
            category,
            name,
            description,
            tags,
        } => commands::site::create(store, domain, category, name, description, tags, output),
        SiteCommands::Edit { id, changes } => commands::site::edit(store, id, changes, output),
        SiteCommands::Rm { id, yes } => commands::site::delete(store, id, yes, output),
        SiteCommands::Tag { id, tags } => commands::site::add_tags(store, id, tags, output),
        SiteCommands::Untag { id, tag } => commands::site::remove_tag(store, id, tag, output),
    }
}

fn handle_page_command(command: PageCommands, store: &Store, output: &Output) -> Result<()> {
    match command {
        PageCommands::List {
            site,
            category,
            tag,
        } => commands::page::list(store, site, category, tag, output),
        PageCommands::Show { id } => commands::page::show(store, id, output),
        PageCommands::Add {
            site,
            path,
            title,
            description,
            tags,
        } => commands::page::create(store, site, path, title, description, tags, output),
        PageCommands::Edit { id, changes } => commands::page::edit(store, id, changes, output),
        PageCommands::Rm { id, yes } => commands::page::delete(store, id, yes, output),
        PageCommands::Tag { id, tags } => commands::page::add_tags(store, id, tags, output),
        PageCommands::Untag { id, tag } => commands::page::remove_tag(store, id, tag, output),
    }
}

fn handle_tag_command(command: TagCommands, store: &Store, output: &Output) -> Result<()> {
    match command {
        TagCommands::List => commands::tag::list(store, output),
        TagCommands::Add { name } => commands::tag::create(store, name, output),
        TagCommands::Rm { tag, yes } => commands::tag::delete(store, tag, yes, output),
        TagCommands::Items { tag } => commands::tag::items(store, tag, output),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Report the outcome and pick the exit code
fn finish(result: Result<()>, conflicts: ConflictStatus, output: &Output) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output.error(&e, status_code(&e, conflicts));
            ExitCode::FAILURE
        }
    }
}

/// HTTP-equivalent status of a failed command
fn status_code(error: &anyhow::Error, conflicts: ConflictStatus) -> u16 {
    error
        .downcast_ref::<StoreError>()
        .map(|e| e.status_code(conflicts))
        .unwrap_or(500)
}

/// Initialize logging
///
/// Only initializes if BOOKMARKS_LOG environment variable is set.
/// Logs to config.log_file when set, stderr otherwise.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("BOOKMARKS_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!(
        "bookmarks_core={},bookmarks_cli={}",
        log_level, log_level
    ));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    // Ignore error if already initialized
    match &config.log_file {
        Some(log_path) => {
            let log_file = match OpenOptions::new().create(true).append(true).open(log_path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
                    return;
                }
            };
            let _ = builder
                .with_ansi(false)
                .with_writer(Mutex::new(log_file))
                .try_init();
            info!("Logging to {:?}", log_path);
        }
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_dashboard() {
        let cli = Cli::try_parse_from(["bookmarks"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_add_with_global_flags() {
        let cli = Cli::try_parse_from([
            "bookmarks",
            "add",
            "example.com/post",
            "--tags",
            "rust,web",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Some(Commands::Add { url, tags, title, .. }) => {
                assert_eq!(url, "example.com/post");
                assert_eq!(tags.as_deref(), Some("rust,web"));
                assert!(title.is_none());
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_parse_quick_add_tags() {
        let cli =
            Cli::try_parse_from(["bookmarks", "quick-add", "example.com", "-t", "news"]).unwrap();
        match cli.command {
            Some(Commands::QuickAdd { url, title, tags }) => {
                assert_eq!(url, "example.com");
                assert!(title.is_none());
                assert_eq!(tags.as_deref(), Some("news"));
            }
            _ => panic!("expected quick-add"),
        }
    }

    #[test]
    fn test_parse_page_list_filters() {
        let cli = Cli::try_parse_from([
            "bookmarks", "page", "list", "--site", "3", "--tag", "rust",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Page {
                command: PageCommands::List { site, category, tag },
            }) => {
                assert_eq!(site, Some(3));
                assert_eq!(category, None);
                assert_eq!(tag.as_deref(), Some("rust"));
            }
            _ => panic!("expected page list"),
        }
    }

    #[test]
    fn test_site_edit_conflicting_category_flags() {
        let result = Cli::try_parse_from([
            "bookmarks",
            "site",
            "edit",
            "1",
            "--category",
            "2",
            "--uncategorize",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_status_code_mapping() {
        let not_found: anyhow::Error = StoreError::not_found("Site", 9).into();
        assert_eq!(status_code(&not_found, ConflictStatus::Internal), 404);

        let wrapped = anyhow::Error::from(StoreError::validation("URL is required"))
            .context("Failed to add");
        assert_eq!(status_code(&wrapped, ConflictStatus::Internal), 400);

        let other = anyhow::anyhow!("disk on fire");
        assert_eq!(status_code(&other, ConflictStatus::Conflict), 500);
    }
}
