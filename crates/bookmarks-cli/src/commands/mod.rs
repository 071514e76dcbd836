//! Command handlers, one module per command group

pub mod bookmark;
pub mod category;
pub mod config;
pub mod dashboard;
pub mod page;
pub mod site;
pub mod tag;
