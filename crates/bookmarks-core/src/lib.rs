//! Bookmarks Core Library
//!
//! This crate provides the data layer for a personal bookmark manager:
//! categories group sites (domains), sites own pages (paths), and tags can be
//! attached to both. Pages inherit the tags of their site.
//!
//! # Architecture
//!
//! - **SQLite**: single local database file, one shared connection
//! - **Store**: every read and write goes through `Store`
//!
//! # Quick Start
//!
//! ```text
//! let store = Store::open(&Config::load()?)?;
//!
//! // Add a bookmark, fetching its title
//! let fetcher = HttpTitleFetcher::default();
//! store.ingest(&IntakeRequest::quick("https://example.com/post", ""), &fetcher)?;
//!
//! // Query pages carrying a tag
//! let tag = store.get_or_create_tag("rust")?;
//! let pages = store.list_pages(&PageFilter::by_tag(tag))?;
//! ```
//!
//! # Modules
//!
//! - `store`: Unified data access (main entry point)
//! - `models`: Records returned by the store
//! - `views`: Per-screen read models
//! - `intake`: URL parsing and bookmark intake
//! - `title`: Page title fetching
//! - `storage`: Database initialization and schema
//! - `config`: Application configuration

pub mod config;
pub mod error;
pub mod intake;
pub mod models;
pub mod storage;
pub mod store;
pub mod title;
pub mod views;

pub use config::Config;
pub use error::{ConflictStatus, StoreError, StoreResult};
pub use intake::{parse_bookmark_url, BookmarkUrl, Intake, IntakeRequest};
pub use models::{
    Category, CategoryId, DashboardStats, Page, PageFilter, PageId, SearchResults, Site, SiteId,
    Tag, TagId, TagRef,
};
pub use storage::{StorageError, StorageResult};
pub use store::Store;
pub use title::{HttpTitleFetcher, TitleFetcher};
