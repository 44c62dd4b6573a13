//! Daily pipeline - orchestrates the search, merge, render and digest flow.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::PathBuf;

use crate::arxiv::ArxivClient;
use crate::config::Config;
use crate::digest::{DigestOutcome, DigestSender};
use crate::storage::{MarkdownRenderer, PaperStore, RenderOptions, TopicBatch};

/// Result of a single daily run.
#[derive(Debug)]
pub struct RunSummary {
    /// Number of topics searched successfully.
    pub topics_searched: usize,
    /// Number of papers returned by the search provider.
    pub fetched: usize,
    /// Number of rows in the store after merging.
    pub stored: usize,
    /// Documents written.
    pub documents: Vec<PathBuf>,
    /// What the digest step did.
    pub digest: DigestOutcome,
    /// Per-topic search errors.
    pub errors: Vec<String>,
}

/// Daily pipeline orchestrator.
pub struct Pipeline<'a> {
    config: &'a Config,
}

impl<'a> Pipeline<'a> {
    /// Create a new pipeline.
    #[must_use]
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Run the full batch for `run_date`.
    ///
    /// Search failures skip the topic. Store and document writes are fatal.
    /// Digest delivery never fails the run.
    pub async fn run(&self, run_date: NaiveDate) -> Result<RunSummary> {
        tracing::info!(%run_date, topics = self.config.keywords.len(), "Starting daily run");

        let client = ArxivClient::new(self.config.arxiv.clone())
            .context("Failed to build arXiv client")?;

        let mut batches = Vec::new();
        let mut fetched = 0;
        let mut errors = Vec::new();

        for (topic, query) in self.config.queries() {
            tracing::info!(topic = %topic, query = %query, "Searching topic");
            match client.search(&query, self.config.max_results).await {
                Ok(papers) => {
                    fetched += papers.len();
                    tracing::info!(topic = %topic, count = papers.len(), "Search complete");
                    for paper in &papers {
                        tracing::debug!(
                            topic = %topic,
                            id = %paper.id,
                            date = %paper.updated,
                            comment = paper.comment.as_deref().unwrap_or(""),
                            "Fetched paper"
                        );
                    }
                    batches.push(TopicBatch::new(
                        topic,
                        papers.into_iter().map(crate::arxiv::ArxivPaper::into_row),
                    ));
                }
                Err(e) => {
                    tracing::warn!(topic = %topic, error = %e, "Search failed, skipping topic");
                    errors.push(format!("{topic}: {e}"));
                }
            }
        }

        let mut store = PaperStore::load(&self.config.json_readme_path);
        let topics_searched = batches.len();
        store.merge_all(batches);
        store.save(&self.config.json_readme_path)?;

        let documents = self.render_documents(&store, run_date)?;
        let digest = self.send_digest(&store, run_date).await;

        let summary = RunSummary {
            topics_searched,
            fetched,
            stored: store.paper_count(),
            documents,
            digest,
            errors,
        };

        tracing::info!(
            topics = summary.topics_searched,
            fetched = summary.fetched,
            stored = summary.stored,
            digest = %summary.digest,
            errors = summary.errors.len(),
            "Daily run complete"
        );

        Ok(summary)
    }

    /// Re-render the documents from the persisted record only.
    pub fn render_only(&self, run_date: NaiveDate) -> Result<Vec<PathBuf>> {
        let store = PaperStore::load(&self.config.json_readme_path);
        self.render_documents(&store, run_date)
    }

    /// Run only the digest step against the persisted record.
    pub async fn digest_only(&self, run_date: NaiveDate) -> DigestOutcome {
        let store = PaperStore::load(&self.config.json_readme_path);
        self.send_digest(&store, run_date).await
    }

    fn render_documents(&self, store: &PaperStore, run_date: NaiveDate) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        MarkdownRenderer::new(self.config.render, run_date)
            .write(store, &self.config.md_readme_path)?;
        written.push(self.config.md_readme_path.clone());

        if let Some(web_path) = &self.config.web_md_path {
            let options = RenderOptions {
                to_web: true,
                ..self.config.render
            };
            MarkdownRenderer::new(options, run_date).write(store, web_path)?;
            written.push(web_path.clone());
        }

        Ok(written)
    }

    async fn send_digest(&self, store: &PaperStore, run_date: NaiveDate) -> DigestOutcome {
        match DigestSender::from_config(&self.config.notify, self.config.digest.clone()) {
            Ok(sender) => sender.send_daily(store, run_date).await,
            Err(e) => {
                tracing::error!(error = %e, "Digest channel setup failed");
                DigestOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
