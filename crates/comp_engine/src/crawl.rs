//! Discovery, batched detail crawling, dedup and reconciliation.

use std::collections::HashSet;
use std::sync::Arc;

use comp_core::{build_record, BoardSize, CatalogError, CompositionRecord, RecordSource};
use engine_logging::{engine_error, engine_info, engine_warn};
use futures_util::future::join_all;
use thiserror::Error;

use crate::acquire::{AcquireSettings, PageAcquirer};
use crate::browser::BrowserAcquirer;
use crate::extract::StructuralExtractor;
use crate::links::discover_detail_links;
use crate::store::CompositionStore;
use crate::{DetailError, LaunchError, NavigationError};

/// Returns the timestamp stamped onto each record.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub listing_url: String,
    /// Only links whose path contains this are treated as detail pages.
    pub detail_path_fragment: String,
    pub batch_size: usize,
    pub listing_ready_selector: Option<String>,
    pub detail_ready_selector: Option<String>,
    pub board: BoardSize,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            listing_url: String::new(),
            detail_path_fragment: "/comps/".to_string(),
            batch_size: 3,
            listing_ready_selector: None,
            detail_ready_selector: None,
            board: BoardSize::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlBatchResult {
    pub discovered: usize,
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
    pub deleted: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Newly created records, in discovery order.
    pub created: Vec<CompositionRecord>,
    pub result: CrawlBatchResult,
    pub reconciled: bool,
}

/// Only resource setup can fail a whole run.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error("catalog unavailable: {0}")]
    Catalog(#[from] CatalogError),
}

pub struct CrawlOrchestrator {
    store: Arc<dyn CompositionStore>,
    extractor: Arc<StructuralExtractor>,
    settings: CrawlSettings,
    clock: Clock,
}

impl CrawlOrchestrator {
    pub fn new(
        store: Arc<dyn CompositionStore>,
        extractor: Arc<StructuralExtractor>,
        settings: CrawlSettings,
        clock: Clock,
    ) -> Self {
        Self {
            store,
            extractor,
            settings,
            clock,
        }
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    /// One full crawl: discovery, batched details, reconciliation.
    ///
    /// Never fails. Pages that cannot be crawled are counted and logged, and
    /// the records that did succeed are returned.
    pub async fn run(&self, acquirer: &dyn PageAcquirer) -> CrawlReport {
        let mut report = CrawlReport::default();

        let links = match self.discover(acquirer).await {
            Ok(links) => links,
            Err(err) => {
                engine_warn!("Listing discovery failed, nothing crawled: {}", err);
                return report;
            }
        };
        report.result.discovered = links.len();
        engine_info!(
            "Discovered {} detail links on {}",
            links.len(),
            self.settings.listing_url
        );

        let batch_size = self.settings.batch_size.max(1);
        let batch_count = links.len().div_ceil(batch_size);
        let mut crawled_names: HashSet<String> = HashSet::new();

        for (batch_idx, batch) in links.chunks(batch_size).enumerate() {
            let outcomes = join_all(batch.iter().map(|url| self.crawl_detail(acquirer, url))).await;

            for (url, outcome) in batch.iter().zip(outcomes) {
                let record = match outcome {
                    Ok(record) => record,
                    Err(err) => {
                        engine_warn!("Skipping {}: {}", url, err);
                        report.result.failed += 1;
                        continue;
                    }
                };
                let first_this_run = crawled_names.insert(record.name.clone());
                match self.persist(record, first_this_run).await {
                    Ok(Some(created)) => {
                        report.result.created += 1;
                        report.created.push(created);
                    }
                    Ok(None) => report.result.skipped += 1,
                    Err(err) => {
                        engine_warn!("Storing {} failed: {}", url, err);
                        report.result.failed += 1;
                    }
                }
            }
            engine_info!(
                "Batch {}/{} done: {} created, {} skipped, {} failed so far",
                batch_idx + 1,
                batch_count,
                report.result.created,
                report.result.skipped,
                report.result.failed
            );
        }

        if crawled_names.is_empty() {
            engine_warn!("No detail page succeeded; keeping existing records");
        } else {
            report.result.deleted = self.reconcile(&crawled_names).await;
            report.reconciled = true;
        }

        let r = &report.result;
        engine_info!(
            "Crawl finished: {} discovered, {} created, {} skipped, {} failed, {} deleted",
            r.discovered,
            r.created,
            r.skipped,
            r.failed,
            r.deleted
        );
        report
    }

    async fn discover(&self, acquirer: &dyn PageAcquirer) -> Result<Vec<String>, NavigationError> {
        let listing = &self.settings.listing_url;
        let page = acquirer
            .acquire(listing, self.settings.listing_ready_selector.as_deref())
            .await?;
        Ok(discover_detail_links(
            &page.html,
            listing,
            &self.settings.detail_path_fragment,
        ))
    }

    /// Acquires, extracts and normalizes one detail page.
    pub async fn crawl_detail(
        &self,
        acquirer: &dyn PageAcquirer,
        url: &str,
    ) -> Result<CompositionRecord, DetailError> {
        // Acquirers bound themselves; the future is never dropped here so their
        // tab cleanup always runs.
        let page = acquirer
            .acquire(url, self.settings.detail_ready_selector.as_deref())
            .await?;

        let mut skeleton = self.extractor.extract(&page.html);
        if skeleton.name.is_empty() {
            if skeleton.units.is_empty() {
                return Err(DetailError::EmptyPage {
                    url: url.to_string(),
                });
            }
            skeleton.name = name_from_url(url);
        }

        let source = RecordSource {
            url: page.url,
            crawled_utc: (self.clock)(),
        };
        Ok(build_record(
            skeleton,
            self.extractor.resolver(),
            self.settings.board,
            source,
        ))
    }

    /// `Ok(None)` means the name was already stored.
    async fn persist(
        &self,
        record: CompositionRecord,
        first_this_run: bool,
    ) -> Result<Option<CompositionRecord>, crate::StoreError> {
        if !first_this_run || self.store.exists_by_name(&record.name).await? {
            return Ok(None);
        }
        self.store.create(record.clone()).await?;
        Ok(Some(record))
    }

    async fn reconcile(&self, crawled: &HashSet<String>) -> usize {
        let stored = match self.store.list_names().await {
            Ok(names) => names,
            Err(err) => {
                engine_warn!("Listing stored names failed, reconciliation skipped: {}", err);
                return 0;
            }
        };

        let mut deleted = 0;
        let mut seen = HashSet::new();
        for name in stored {
            if crawled.contains(&name) || !seen.insert(name.clone()) {
                continue;
            }
            match self.store.delete_by_name(&name).await {
                Ok(removed) => {
                    if removed > 0 {
                        engine_info!("Removed stale composition {:?}", name);
                    }
                    deleted += removed;
                }
                Err(err) => engine_warn!("Deleting stale composition {:?} failed: {}", name, err),
            }
        }
        deleted
    }
}

/// Last path segment of a URL with separators turned into spaces.
fn name_from_url(url: &str) -> String {
    let segment = url::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segs| segs.rfind(|s| !s.is_empty()).map(str::to_string))
        })
        .unwrap_or_else(|| url.to_string());
    segment
        .split(['-', '_'])
        .filter(|part| !part.is_empty())
        .map(comp_core::display_name_from_slug)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Launches a shared browser, runs one crawl with it and closes it again.
pub async fn crawl_with_browser(
    orchestrator: &CrawlOrchestrator,
    settings: AcquireSettings,
) -> Result<CrawlReport, CrawlError> {
    let browser = BrowserAcquirer::launch(settings).await.map_err(|err| {
        engine_error!("Browser launch failed, crawl aborted: {}", err);
        err
    })?;
    let report = orchestrator.run(&browser).await;
    browser.shutdown().await;
    Ok(report)
}
