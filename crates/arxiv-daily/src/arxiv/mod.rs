//! arXiv search adapter.
//!
//! Queries the Atom API for one topic at a time and normalizes entries
//! into [`ArxivPaper`] values.

mod client;
mod error;
mod parser;
mod types;

pub use client::{ArxivClient, SearchConfig};
pub use error::SearchError;
pub use parser::FeedParser;
pub use types::{abs_url, normalize_id, short_id, ArxivPaper};
