//! Paper record storage and Markdown rendering.
//!
//! The record is a JSON file of `{topic: {paper_id: row}}` that is read
//! once and replaced once per run. The Markdown document is derived from it.

mod markdown;
mod record;
mod store;

pub use markdown::{pretty_math, MarkdownRenderer, RenderOptions};
pub use record::{PaperRow, StoredRow};
pub use store::{sort_papers, PaperStore, TopicBatch, TopicPapers};

use std::io::Write;
use std::path::Path;

/// Replace `path` with `content` via a temp file in the same directory.
pub(crate) fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
