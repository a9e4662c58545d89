use std::path::PathBuf;
use std::time::Duration;

use engine_logging::engine_debug;

use crate::{NavigationError, RawPageContent};

#[derive(Debug, Clone)]
pub struct AcquireSettings {
    /// Upper bound for one whole acquisition: navigation, scrolling, read.
    pub page_timeout: Duration,
    /// How long to wait for an optional ready selector.
    pub ready_timeout: Duration,
    pub scroll_step_px: u32,
    pub scroll_interval: Duration,
    /// Consecutive non-growing scrolls that count as "stable".
    pub stable_iterations: u32,
    pub max_scroll_iterations: u32,
    pub settle_delay: Duration,
    pub max_bytes: u64,
    pub chrome_executable: Option<PathBuf>,
}

impl Default for AcquireSettings {
    fn default() -> Self {
        Self {
            page_timeout: Duration::from_secs(45),
            ready_timeout: Duration::from_secs(15),
            scroll_step_px: 800,
            scroll_interval: Duration::from_millis(500),
            stable_iterations: 3,
            max_scroll_iterations: 60,
            settle_delay: Duration::from_secs(1),
            max_bytes: 8 * 1024 * 1024,
            chrome_executable: None,
        }
    }
}

/// Loads a URL and returns settled markup.
///
/// Implementations bound their own work and release whatever they opened
/// before returning. Callers await the future to completion.
#[async_trait::async_trait]
pub trait PageAcquirer: Send + Sync {
    async fn acquire(
        &self,
        url: &str,
        ready_selector: Option<&str>,
    ) -> Result<RawPageContent, NavigationError>;
}

/// Something that can be scrolled and measured, usually a browser tab.
#[async_trait::async_trait]
pub trait ScrollSurface: Send + Sync {
    /// Scrolls down by `px` and returns the total scrollable height afterwards.
    async fn scroll_by(&self, px: u32) -> Result<u64, NavigationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollOutcome {
    pub iterations: u32,
    pub final_height: u64,
    pub stabilized: bool,
}

/// Scrolls until the page height has stopped growing for
/// `stable_iterations` rounds in a row, or the iteration cap is hit.
pub async fn scroll_until_stable(
    surface: &dyn ScrollSurface,
    settings: &AcquireSettings,
) -> Result<ScrollOutcome, NavigationError> {
    let mut last_height: Option<u64> = None;
    let mut unchanged = 0;
    let mut iterations = 0;

    while iterations < settings.max_scroll_iterations {
        iterations += 1;
        let height = surface.scroll_by(settings.scroll_step_px).await?;
        match last_height {
            Some(previous) if height <= previous => unchanged += 1,
            _ => unchanged = 0,
        }
        last_height = Some(height);

        if unchanged >= settings.stable_iterations {
            engine_debug!("Scroll height stable at {} after {} rounds", height, iterations);
            return Ok(ScrollOutcome {
                iterations,
                final_height: height,
                stabilized: true,
            });
        }
        tokio::time::sleep(settings.scroll_interval).await;
    }

    Ok(ScrollOutcome {
        iterations,
        final_height: last_height.unwrap_or(0),
        stabilized: false,
    })
}
