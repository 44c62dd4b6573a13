//! arXiv daily paper tracker.
//!
//! This crate provides:
//! - arXiv Atom API search per configured topic
//! - A persisted per-topic record of papers, merged on every run
//! - Markdown rendering of the record (README and web variants)
//! - A "yesterday" digest pushed through the `notify` crate

pub mod arxiv;
pub mod config;
pub mod digest;
pub mod pipeline;
pub mod storage;

// Re-export main types
pub use arxiv::{ArxivClient, ArxivPaper, SearchConfig, SearchError};
pub use config::{Config, ConfigError};
pub use digest::{DigestOutcome, DigestSender};
pub use pipeline::{Pipeline, RunSummary};
pub use storage::{PaperRow, PaperStore, StoredRow};
