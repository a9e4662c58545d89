use std::time::Duration;

use futures_util::StreamExt;
use scraper::{Html, Selector};

use crate::acquire::{AcquireSettings, PageAcquirer};
use crate::{FailureKind, NavigationError, RawPageContent};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REDIRECT_LIMIT: usize = 5;

/// Plain HTTP acquisition for guide pages that render server-side.
///
/// No scripts run, so there is nothing to scroll or settle; the response body
/// is the final markup.
#[derive(Debug, Clone)]
pub struct HttpAcquirer {
    client: reqwest::Client,
    settings: AcquireSettings,
}

impl HttpAcquirer {
    pub fn new(settings: AcquireSettings) -> Result<Self, NavigationError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(settings.page_timeout)
            .redirect(reqwest::redirect::Policy::limited(REDIRECT_LIMIT))
            .build()
            .map_err(|err| NavigationError::new("", FailureKind::Network, err.to_string()))?;
        Ok(Self { client, settings })
    }

    fn map_error(&self, url: &str, err: reqwest::Error) -> NavigationError {
        if err.is_timeout() {
            return NavigationError::timeout(url, self.settings.page_timeout.as_millis() as u64);
        }
        NavigationError::new(url, FailureKind::Network, err.to_string())
    }
}

#[async_trait::async_trait]
impl PageAcquirer for HttpAcquirer {
    async fn acquire(
        &self,
        url: &str,
        ready_selector: Option<&str>,
    ) -> Result<RawPageContent, NavigationError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| NavigationError::new(url, FailureKind::InvalidUrl, err.to_string()))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|err| self.map_error(url, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NavigationError::new(
                url,
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_bytes;
        if response.content_length().is_some_and(|len| len > max_bytes) {
            return Err(NavigationError::new(
                url,
                FailureKind::TooLarge { max_bytes },
                "declared content length over limit",
            ));
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| self.map_error(url, err))?;
            if bytes.len() as u64 + chunk.len() as u64 > max_bytes {
                return Err(NavigationError::new(
                    url,
                    FailureKind::TooLarge { max_bytes },
                    "body over limit",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        let html = String::from_utf8_lossy(&bytes).into_owned();
        if let Some(selector) = ready_selector {
            if !contains_selector(&html, selector) {
                return Err(NavigationError::new(
                    url,
                    FailureKind::ReadySelectorMissing {
                        selector: selector.to_string(),
                    },
                    "selector absent from static markup",
                ));
            }
        }

        Ok(RawPageContent {
            url: url.to_string(),
            html,
        })
    }
}

fn contains_selector(html: &str, selector: &str) -> bool {
    let Ok(sel) = Selector::parse(selector) else {
        return false;
    };
    Html::parse_document(html).select(&sel).next().is_some()
}
