// src/models/mod.rs

//! Domain and configuration models.

pub mod book;
pub mod config;

pub use book::{
    AUTHOR_MISSING, Book, DESCRIPTION_MISSING, IMAGE_MISSING, RankedLink, TITLE_MISSING,
};
pub use config::{
    Config, CrawlerConfig, DetailSelectors, IngestConfig, LoggingConfig, SourceConfig,
    StorageConfig,
};
