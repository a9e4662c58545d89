//! Comp engine: page acquisition, structural extraction, persistence
//! boundary and the crawl orchestrator.
mod acquire;
mod browser;
mod crawl;
mod extract;
mod http;
mod links;
mod schedule;
mod store;
mod types;

pub use acquire::{scroll_until_stable, AcquireSettings, PageAcquirer, ScrollOutcome, ScrollSurface};
pub use browser::BrowserAcquirer;
pub use crawl::{
    crawl_with_browser, Clock, CrawlBatchResult, CrawlError, CrawlOrchestrator, CrawlReport,
    CrawlSettings,
};
pub use extract::{slug_from_src, BoardStrategy, StructuralExtractor, BOARD_STRATEGIES};
pub use http::HttpAcquirer;
pub use links::discover_detail_links;
pub use schedule::spawn_periodic;
pub use store::{CompositionStore, MemoryStore, RonFileStore, StoreError};
pub use types::{DetailError, FailureKind, LaunchError, NavigationError, RawPageContent};
