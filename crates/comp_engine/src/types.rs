use std::fmt;

/// Markup as rendered by an acquirer, tagged with the URL it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPageContent {
    pub url: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout { ms: u64 },
    TooLarge { max_bytes: u64 },
    ReadySelectorMissing { selector: String },
    Browser,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout { ms } => write!(f, "timed out after {ms}ms"),
            FailureKind::TooLarge { max_bytes } => {
                write!(f, "response larger than {max_bytes} bytes")
            }
            FailureKind::ReadySelectorMissing { selector } => {
                write!(f, "ready selector {selector:?} never appeared")
            }
            FailureKind::Browser => write!(f, "browser error"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// A single page could not be acquired. Fatal to that page only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{url}: {kind}: {message}")]
pub struct NavigationError {
    pub url: String,
    pub kind: FailureKind,
    pub message: String,
}

impl NavigationError {
    pub fn new(url: &str, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(url: &str, ms: u64) -> Self {
        Self::new(url, FailureKind::Timeout { ms }, "deadline exceeded")
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, FailureKind::Timeout { .. })
    }
}

/// The browser could not be started at all. Aborts the whole run.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("invalid browser configuration: {0}")]
    Config(String),
    #[error("failed to launch browser: {0}")]
    Spawn(String),
}

/// One detail page failed; it is dropped from the batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DetailError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error("{url}: page has neither a composition name nor units")]
    EmptyPage { url: String },
}
