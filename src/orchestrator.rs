use crate::catalog::{Catalog, CatalogItem};
use crate::config::FetchConfig;
use crate::error::{FetchError, RunError};
use crate::fetcher::Fetch;
use crate::utils::files::{destination_path, ensure_directories};
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Primary URL fetched
    Ok,
    /// Fallback fetched in place of the primary
    Placeholder,
    /// Neither could be fetched
    Missing,
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemStatus::Ok => write!(f, "ok"),
            ItemStatus::Placeholder => write!(f, "placeholder"),
            ItemStatus::Missing => write!(f, "missing"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemOutcome {
    pub category: String,
    pub index: usize,
    pub url: String,
    pub destination: PathBuf,
    pub status: ItemStatus,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub ok: usize,
    pub placeholder: usize,
    pub missing: usize,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[ItemOutcome]) -> Self {
        outcomes
            .iter()
            .fold(RunSummary::default(), |mut summary, outcome| {
                match outcome.status {
                    ItemStatus::Ok => summary.ok += 1,
                    ItemStatus::Placeholder => summary.placeholder += 1,
                    ItemStatus::Missing => summary.missing += 1,
                }
                summary
            })
    }

    pub fn total(&self) -> usize {
        self.ok + self.placeholder + self.missing
    }
}

#[derive(Debug)]
pub struct RunReport {
    /// One entry per catalog item, in catalog order
    pub outcomes: Vec<ItemOutcome>,
    pub duration: Duration,
}

impl RunReport {
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_outcomes(&self.outcomes)
    }

    pub fn missing(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == ItemStatus::Missing)
    }
}

pub struct Orchestrator<F> {
    fetcher: F,
    output_dir: PathBuf,
    jobs: usize,
    progress: ProgressBar,
}

impl<F: Fetch> Orchestrator<F> {
    pub fn new(fetcher: F, config: &FetchConfig) -> Self {
        Self {
            fetcher,
            output_dir: config.output_dir.clone(),
            jobs: config.jobs.max(1),
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Fetch every catalog item, substituting the fallback where the primary fails.
    ///
    /// Only directory creation and cancellation end the run early; fetch
    /// failures become `missing` outcomes.
    pub async fn run(&self, catalog: &Catalog) -> Result<RunReport, RunError> {
        let start = Instant::now();

        ensure_directories(
            &self.output_dir,
            catalog.categories.iter().map(|c| c.name.as_str()),
        )?;

        let items = catalog.items();
        info!(
            "Fetching {} items across {} categories with {} jobs",
            items.len(),
            catalog.categories.len(),
            self.jobs
        );
        self.progress.set_length(items.len() as u64);

        // `buffered` yields in input order regardless of completion order
        let mut resolved = stream::iter(items)
            .map(|item| self.resolve(item, &catalog.fallback))
            .buffered(self.jobs);

        let mut outcomes = Vec::with_capacity(catalog.total_items());
        while let Some(result) = resolved.next().await {
            match result {
                Ok(outcome) => {
                    self.progress.inc(1);
                    outcomes.push(outcome);
                }
                Err(_) => {
                    self.progress.abandon();
                    return Err(RunError::Cancelled {
                        completed: outcomes.len(),
                    });
                }
            }
        }

        self.progress.finish_and_clear();

        let report = RunReport {
            outcomes,
            duration: start.elapsed(),
        };
        info!(
            "Resolved {} items in {:.1}s",
            report.summary().total(),
            report.duration.as_secs_f64()
        );
        Ok(report)
    }

    /// Drive one item to a terminal status. Errors only on cancellation.
    async fn resolve(&self, item: CatalogItem, fallback: &str) -> Result<ItemOutcome, FetchError> {
        let destination = destination_path(&self.output_dir, &item.category, item.index);

        let status = match self.fetcher.fetch(&item.url, &destination).await {
            Ok(_) => ItemStatus::Ok,
            Err(FetchError::Cancelled) => return Err(FetchError::Cancelled),
            Err(e) => {
                warn!("{}/{}: {}", item.category, item.index, e);
                self.progress.suspend(|| {
                    println!(
                        "    ! Failed to download item {} for {}, fetching placeholder...",
                        item.index, item.category
                    )
                });

                match self.fetcher.fetch(fallback, &destination).await {
                    Ok(_) => ItemStatus::Placeholder,
                    Err(FetchError::Cancelled) => return Err(FetchError::Cancelled),
                    Err(e) => {
                        warn!(
                            "{}/{}: placeholder also failed: {}",
                            item.category, item.index, e
                        );
                        ItemStatus::Missing
                    }
                }
            }
        };

        self.progress.suspend(|| {
            println!("  {}/{} [{}] {}", item.category, item.index, status, item.url)
        });

        Ok(ItemOutcome {
            category: item.category,
            index: item.index,
            url: item.url,
            destination,
            status,
        })
    }
}
