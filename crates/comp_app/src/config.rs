//! RON configuration for the harvester binary.
//!
//! Every key is optional; a missing file or missing key falls back to the
//! defaults in [`AppConfig::default`].

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use comp_core::{BoardSize, DEFAULT_BOARD_COLS, DEFAULT_BOARD_ROWS};
use comp_engine::{AcquireSettings, CrawlSettings};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "comp_harvester.ron";

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogDestination {
    /// Write to stdout.
    #[default]
    Terminal,
    /// Write to ./comp_harvester.log in the current directory.
    File,
    /// Write to both file and terminal.
    Both,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub listing_url: Option<String>,
    pub detail_path_fragment: String,
    pub batch_size: usize,
    pub page_timeout_secs: u64,
    pub scroll_step_px: u32,
    pub stable_iterations: u32,
    pub scroll_interval_ms: u64,
    pub settle_delay_ms: u64,
    pub max_scroll_iterations: u32,
    pub board_rows: u8,
    pub board_cols: u8,
    pub fuzzy_matching: bool,
    pub chrome_executable: Option<PathBuf>,
    pub store_path: PathBuf,
    pub schedule_interval_hours: u64,
    pub log_destination: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listing_url: None,
            detail_path_fragment: "/comps/".to_string(),
            batch_size: 3,
            page_timeout_secs: 45,
            scroll_step_px: 800,
            stable_iterations: 3,
            scroll_interval_ms: 500,
            settle_delay_ms: 1000,
            max_scroll_iterations: 60,
            board_rows: DEFAULT_BOARD_ROWS,
            board_cols: DEFAULT_BOARD_COLS,
            fuzzy_matching: true,
            chrome_executable: None,
            store_path: PathBuf::from("compositions.ron"),
            schedule_interval_hours: 24,
            log_destination: LogDestination::Terminal,
        }
    }
}

impl AppConfig {
    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    /// An explicit path must exist. Without one, `comp_harvester.ron` in the
    /// working directory is used when present.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.exists() {
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_ron(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn board(&self) -> BoardSize {
        BoardSize::new(self.board_rows, self.board_cols)
    }

    pub fn schedule_period(&self) -> Duration {
        Duration::from_secs(self.schedule_interval_hours.max(1) * 60 * 60)
    }

    pub fn acquire_settings(&self) -> AcquireSettings {
        AcquireSettings {
            page_timeout: Duration::from_secs(self.page_timeout_secs),
            scroll_step_px: self.scroll_step_px,
            scroll_interval: Duration::from_millis(self.scroll_interval_ms),
            stable_iterations: self.stable_iterations,
            max_scroll_iterations: self.max_scroll_iterations,
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            chrome_executable: self.chrome_executable.clone(),
            ..AcquireSettings::default()
        }
    }

    pub fn crawl_settings(&self, listing_url: String) -> CrawlSettings {
        CrawlSettings {
            listing_url,
            detail_path_fragment: self.detail_path_fragment.clone(),
            batch_size: self.batch_size,
            board: self.board(),
            ..CrawlSettings::default()
        }
    }
}
