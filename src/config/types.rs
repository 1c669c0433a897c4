//! Core configuration types for crawl operations.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::error::{CrawlError, CrawlResult};
use crate::utils::{MY_PAGE_PATH, SEARCH_PATH};

/// Main configuration for one crawl.
///
/// Built through [`CrawlConfig::builder`]; `base_url` is validated to parse
/// with a host before a config can exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Search keyword (free text, required).
    pub(crate) keyword: String,
    /// Site root; overridable for a staging mirror.
    pub(crate) base_url: String,
    /// Cap on enumerated listing items.
    pub(crate) max_items: usize,
    /// Defensive cap on option rows per item.
    pub(crate) max_options: usize,
    /// Worker pool size; 1 means sequential mode.
    pub(crate) workers: usize,
    pub(crate) headless: bool,
    /// Explicit Chrome/Chromium executable, bypassing discovery.
    pub(crate) chrome_executable: Option<PathBuf>,

    /// Timeout for `page.goto()` and load waits.
    pub(crate) page_load_timeout_secs: u64,
    /// Settle pause after the search navigation.
    pub(crate) search_settle_secs: u64,
    /// Maximum scroll-and-wait rounds while loading the listing.
    pub(crate) scroll_rounds: usize,
    /// Pause after each scroll before re-measuring the page height.
    pub(crate) scroll_wait_secs: u64,
    /// Bound on waiting for the page height to grow after a scroll.
    pub(crate) scroll_growth_timeout_secs: u64,
    /// Settle pause after clicking into an item's detail view.
    pub(crate) item_click_settle_secs: u64,
    /// Settle pause after activating the purchase control (modal opening).
    pub(crate) modal_settle_secs: u64,
    /// Settle pause after returning to the listing.
    pub(crate) return_settle_secs: u64,
}

impl CrawlConfig {
    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn max_items(&self) -> usize {
        self.max_items
    }

    #[must_use]
    pub fn max_options(&self) -> usize {
        self.max_options
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn chrome_executable(&self) -> Option<&PathBuf> {
        self.chrome_executable.as_ref()
    }

    #[must_use]
    pub fn page_load_timeout_secs(&self) -> u64 {
        self.page_load_timeout_secs
    }

    #[must_use]
    pub fn search_settle_secs(&self) -> u64 {
        self.search_settle_secs
    }

    #[must_use]
    pub fn scroll_rounds(&self) -> usize {
        self.scroll_rounds
    }

    #[must_use]
    pub fn scroll_wait_secs(&self) -> u64 {
        self.scroll_wait_secs
    }

    #[must_use]
    pub fn scroll_growth_timeout_secs(&self) -> u64 {
        self.scroll_growth_timeout_secs
    }

    #[must_use]
    pub fn item_click_settle_secs(&self) -> u64 {
        self.item_click_settle_secs
    }

    #[must_use]
    pub fn modal_settle_secs(&self) -> u64 {
        self.modal_settle_secs
    }

    #[must_use]
    pub fn return_settle_secs(&self) -> u64 {
        self.return_settle_secs
    }

    fn parsed_base(&self) -> CrawlResult<Url> {
        Url::parse(&self.base_url)
            .map_err(|e| CrawlError::Config(format!("invalid base URL '{}': {e}", self.base_url)))
    }

    /// Keyword-filtered listing URL for the events tab.
    pub fn search_url(&self) -> CrawlResult<Url> {
        let mut url = self.parsed_base()?;
        url.set_path(SEARCH_PATH);
        url.query_pairs_mut()
            .append_pair("q", &self.keyword)
            .append_pair("tab", "events");
        Ok(url)
    }

    /// Authenticated-only page used to verify the session.
    pub fn my_page_url(&self) -> CrawlResult<Url> {
        let mut url = self.parsed_base()?;
        url.set_path(MY_PAGE_PATH);
        Ok(url)
    }

    /// Cookie scope for the credential tokens: the registrable site domain
    /// with a leading dot, so cookies reach every subdomain.
    pub fn cookie_domain(&self) -> CrawlResult<String> {
        let url = self.parsed_base()?;
        let host = url
            .host_str()
            .ok_or_else(|| CrawlError::Config(format!("base URL '{}' has no host", self.base_url)))?;
        let bare = host.strip_prefix("www.").unwrap_or(host);
        Ok(format!(".{bare}"))
    }
}
