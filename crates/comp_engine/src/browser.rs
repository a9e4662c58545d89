//! Headless Chromium acquisition via chromiumoxide.
//!
//! One browser process is shared by every acquisition; each call opens its own
//! tab and closes it again on every exit path, cancellation included. The
//! process itself is closed once, by whoever launched it, through
//! [`BrowserAcquirer::shutdown`].

use std::time::{Duration, Instant};

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use engine_logging::{engine_debug, engine_info, engine_warn};
use futures_util::StreamExt;

use crate::acquire::{scroll_until_stable, AcquireSettings, PageAcquirer, ScrollSurface};
use crate::{FailureKind, LaunchError, NavigationError, RawPageContent};

const READY_POLL_INTERVAL: Duration = Duration::from_millis(250);
const TAB_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct BrowserAcquirer {
    browser: Browser,
    handler: tokio::task::JoinHandle<()>,
    settings: AcquireSettings,
}

impl BrowserAcquirer {
    pub async fn launch(settings: AcquireSettings) -> Result<Self, LaunchError> {
        let mut builder = BrowserConfig::builder()
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking");
        if let Some(path) = settings.chrome_executable.as_ref() {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(LaunchError::Config)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|err| LaunchError::Spawn(err.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    engine_debug!("Browser handler event error: {}", err);
                }
            }
        });

        engine_info!("Headless browser launched");
        Ok(Self {
            browser,
            handler,
            settings,
        })
    }

    pub fn settings(&self) -> &AcquireSettings {
        &self.settings
    }

    pub async fn shutdown(mut self) {
        if let Err(err) = self.browser.close().await {
            engine_warn!("Browser close failed: {}", err);
        }
        if let Err(err) = self.browser.wait().await {
            engine_warn!("Browser process did not exit cleanly: {}", err);
        }
        self.handler.abort();
        engine_info!("Headless browser shut down");
    }

    async fn drive(
        &self,
        page: &Page,
        url: &str,
        ready_selector: Option<&str>,
    ) -> Result<RawPageContent, NavigationError> {
        page.goto(url)
            .await
            .map_err(|err| NavigationError::new(url, FailureKind::Network, err.to_string()))?;
        if let Err(err) = page.wait_for_navigation().await {
            engine_debug!("wait_for_navigation on {} returned {}", url, err);
        }

        if let Some(selector) = ready_selector {
            self.wait_ready(page, url, selector).await?;
        }

        let outcome = scroll_until_stable(&TabSurface { page, url }, &self.settings).await?;
        if !outcome.stabilized {
            engine_warn!(
                "{} still growing after {} scrolls; reading what is there",
                url,
                outcome.iterations
            );
        }
        tokio::time::sleep(self.settings.settle_delay).await;

        let html = page
            .content()
            .await
            .map_err(|err| NavigationError::new(url, FailureKind::Browser, err.to_string()))?;
        Ok(RawPageContent {
            url: url.to_string(),
            html,
        })
    }

    async fn wait_ready(&self, page: &Page, url: &str, selector: &str) -> Result<(), NavigationError> {
        let deadline = Instant::now() + self.settings.ready_timeout;
        loop {
            if page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(NavigationError::new(
                    url,
                    FailureKind::ReadySelectorMissing {
                        selector: selector.to_string(),
                    },
                    "ready selector wait exceeded",
                ));
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }
}

#[async_trait::async_trait]
impl PageAcquirer for BrowserAcquirer {
    async fn acquire(
        &self,
        url: &str,
        ready_selector: Option<&str>,
    ) -> Result<RawPageContent, NavigationError> {
        let limit = self.settings.page_timeout;
        let page = match tokio::time::timeout(limit, self.browser.new_page("about:blank")).await {
            Ok(page) => page
                .map_err(|err| NavigationError::new(url, FailureKind::Browser, err.to_string()))?,
            Err(_) => return Err(NavigationError::timeout(url, limit.as_millis() as u64)),
        };
        let tab = TabGuard::new(page.clone());

        let result = match tokio::time::timeout(limit, self.drive(&page, url, ready_selector)).await {
            Ok(result) => result,
            Err(_) => Err(NavigationError::timeout(url, limit.as_millis() as u64)),
        };

        tab.close(url).await;
        result
    }
}

/// Owns one open tab. If dropped before [`TabGuard::close`] runs, for example
/// because the caller's future was cancelled, the close is spawned instead.
struct TabGuard {
    page: Option<Page>,
}

impl TabGuard {
    fn new(page: Page) -> Self {
        Self { page: Some(page) }
    }

    async fn close(mut self, url: &str) {
        let Some(page) = self.page.take() else {
            return;
        };
        match tokio::time::timeout(TAB_CLOSE_TIMEOUT, page.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => engine_warn!("Failed to close tab for {}: {}", url, err),
            Err(_) => engine_warn!("Closing tab for {} timed out", url),
        }
    }
}

impl Drop for TabGuard {
    fn drop(&mut self) {
        let Some(page) = self.page.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                engine_debug!("Tab dropped mid-acquisition, closing in background");
                handle.spawn(async move {
                    if let Err(err) = page.close().await {
                        engine_debug!("Background tab close failed: {}", err);
                    }
                });
            }
            Err(_) => engine_warn!("Tab dropped outside a runtime; it stays open"),
        }
    }
}

struct TabSurface<'a> {
    page: &'a Page,
    url: &'a str,
}

#[async_trait::async_trait]
impl ScrollSurface for TabSurface<'_> {
    async fn scroll_by(&self, px: u32) -> Result<u64, NavigationError> {
        let script = format!("window.scrollBy(0, {px}); document.documentElement.scrollHeight");
        let browser_error =
            |message: String| NavigationError::new(self.url, FailureKind::Browser, message);
        let height: f64 = self
            .page
            .evaluate(script)
            .await
            .map_err(|err| browser_error(err.to_string()))?
            .into_value()
            .map_err(|err| browser_error(err.to_string()))?;
        Ok(height.max(0.0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn browser_reads_data_url_and_closes_tab() {
        let settings = AcquireSettings {
            scroll_interval: Duration::from_millis(10),
            settle_delay: Duration::from_millis(10),
            ..AcquireSettings::default()
        };
        let acquirer = BrowserAcquirer::launch(settings).await.expect("launch");
        let page = acquirer
            .acquire("data:text/html,<h1>Rebels</h1>", Some("h1"))
            .await
            .expect("acquire");
        assert!(page.html.contains("<h1>Rebels</h1>"));
        acquirer.shutdown().await;
    }
}
