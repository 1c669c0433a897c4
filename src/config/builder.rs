//! Fluent builder for [`CrawlConfig`].

use std::path::PathBuf;
use url::Url;

use crate::error::{CrawlError, CrawlResult};
use crate::utils::{DEFAULT_BASE_URL, DEFAULT_MAX_ITEMS, DEFAULT_MAX_OPTIONS};

use super::types::CrawlConfig;

pub struct CrawlConfigBuilder {
    keyword: String,
    base_url: String,
    max_items: usize,
    max_options: usize,
    workers: usize,
    headless: bool,
    chrome_executable: Option<PathBuf>,
    page_load_timeout_secs: u64,
    search_settle_secs: u64,
    scroll_rounds: usize,
    scroll_wait_secs: u64,
    scroll_growth_timeout_secs: u64,
    item_click_settle_secs: u64,
    modal_settle_secs: u64,
    return_settle_secs: u64,
}

impl CrawlConfig {
    pub fn builder(keyword: impl Into<String>) -> CrawlConfigBuilder {
        CrawlConfigBuilder {
            keyword: keyword.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_items: DEFAULT_MAX_ITEMS,
            max_options: DEFAULT_MAX_OPTIONS,
            workers: 1,
            headless: true,
            chrome_executable: None,
            page_load_timeout_secs: 30,
            search_settle_secs: 5,
            scroll_rounds: 5,
            scroll_wait_secs: 3,
            scroll_growth_timeout_secs: 10,
            item_click_settle_secs: 3,
            modal_settle_secs: 2,
            return_settle_secs: 2,
        }
    }
}

impl CrawlConfigBuilder {
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    #[must_use]
    pub fn max_options(mut self, max_options: usize) -> Self {
        self.max_options = max_options;
        self
    }

    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub fn chrome_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_executable = Some(path.into());
        self
    }

    #[must_use]
    pub fn page_load_timeout_secs(mut self, secs: u64) -> Self {
        self.page_load_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn search_settle_secs(mut self, secs: u64) -> Self {
        self.search_settle_secs = secs;
        self
    }

    #[must_use]
    pub fn scroll_rounds(mut self, rounds: usize) -> Self {
        self.scroll_rounds = rounds;
        self
    }

    #[must_use]
    pub fn scroll_wait_secs(mut self, secs: u64) -> Self {
        self.scroll_wait_secs = secs;
        self
    }

    #[must_use]
    pub fn scroll_growth_timeout_secs(mut self, secs: u64) -> Self {
        self.scroll_growth_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn item_click_settle_secs(mut self, secs: u64) -> Self {
        self.item_click_settle_secs = secs;
        self
    }

    #[must_use]
    pub fn modal_settle_secs(mut self, secs: u64) -> Self {
        self.modal_settle_secs = secs;
        self
    }

    #[must_use]
    pub fn return_settle_secs(mut self, secs: u64) -> Self {
        self.return_settle_secs = secs;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> CrawlResult<CrawlConfig> {
        let keyword = self.keyword.trim().to_string();
        if keyword.is_empty() {
            return Err(CrawlError::Config("search keyword must not be empty".into()));
        }
        if self.max_items == 0 {
            return Err(CrawlError::Config("max_items must be at least 1".into()));
        }
        if self.workers == 0 {
            return Err(CrawlError::Config("workers must be at least 1".into()));
        }
        let parsed = Url::parse(&self.base_url)
            .map_err(|e| CrawlError::Config(format!("invalid base URL '{}': {e}", self.base_url)))?;
        if parsed.host_str().is_none() {
            return Err(CrawlError::Config(format!(
                "base URL '{}' has no host",
                self.base_url
            )));
        }

        Ok(CrawlConfig {
            keyword,
            base_url: self.base_url,
            max_items: self.max_items,
            max_options: self.max_options,
            workers: self.workers,
            headless: self.headless,
            chrome_executable: self.chrome_executable,
            page_load_timeout_secs: self.page_load_timeout_secs,
            search_settle_secs: self.search_settle_secs,
            scroll_rounds: self.scroll_rounds,
            scroll_wait_secs: self.scroll_wait_secs,
            scroll_growth_timeout_secs: self.scroll_growth_timeout_secs,
            item_click_settle_secs: self.item_click_settle_secs,
            modal_settle_secs: self.modal_settle_secs,
            return_settle_secs: self.return_settle_secs,
        })
    }
}
