//! Keyword search and listing enumeration.
//!
//! The listing view loads more content as it scrolls, so materializing it is
//! a bounded scroll-and-wait loop keyed on the page height. Items are then
//! counted by probing positions 1, 2, 3, … until one fails to resolve; the
//! first failing position is one past the last real item.

use anyhow::Context;
use chromiumoxide::page::Page;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::CrawlConfig;
use crate::error::{CrawlError, CrawlResult};
use crate::progress::ProgressReporter;
use crate::selectors::{self, resolve_first_visible};
use crate::utils::{POLL_INTERVAL, settle, with_page_timeout};

/// Ordered 1-based item positions discovered for one search, clamped to the
/// configured item cap. Built once per search and immutable thereafter.
///
/// A position is a navigation key, not a stable identifier: reaching an item
/// means re-resolving the Nth listing element, never a remembered handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingIndex {
    positions: Vec<usize>,
    capped: bool,
}

impl ListingIndex {
    /// Build from the enumeration outcome: `found` consecutive positions
    /// resolved, `capped` when probing stopped at the item cap rather than at
    /// a failing position.
    pub fn from_enumeration(found: usize, capped: bool) -> Self {
        Self {
            positions: (1..=found).collect(),
            capped,
        }
    }

    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn capped(&self) -> bool {
        self.capped
    }
}

/// Navigate to the keyword-filtered listing and let it settle.
pub async fn search(page: &Page, config: &CrawlConfig) -> CrawlResult<()> {
    let url = config.search_url()?;
    info!("searching for '{}'", config.keyword());
    with_page_timeout(
        async {
            page.goto(url.as_str())
                .await
                .context("navigate to search results")?;
            page.wait_for_navigation()
                .await
                .context("wait for search results load")?;
            Ok(())
        },
        config.page_load_timeout_secs(),
        "search navigation",
    )
    .await
    .map_err(|e| CrawlError::Search(format!("{e:#}")))?;
    settle(config.search_settle_secs()).await;
    Ok(())
}

async fn page_height(page: &Page) -> anyhow::Result<i64> {
    page.evaluate("document.body.scrollHeight")
        .await
        .context("read page height")?
        .into_value::<i64>()
        .context("decode page height")
}

/// Scroll to the bottom repeatedly until the page stops growing or the round
/// cap is hit. Best-effort: evaluation failures end the pass with a warning.
pub async fn scroll_to_load_all(page: &Page, config: &CrawlConfig) {
    for round in 0..config.scroll_rounds() {
        let before = match page_height(page).await {
            Ok(height) => height,
            Err(e) => {
                warn!("aborting scroll pass: {e:#}");
                return;
            }
        };
        if let Err(e) = page
            .evaluate("window.scrollTo(0, document.body.scrollHeight)")
            .await
        {
            warn!("aborting scroll pass: {e}");
            return;
        }
        settle(config.scroll_wait_secs()).await;

        let deadline =
            Instant::now() + Duration::from_secs(config.scroll_growth_timeout_secs());
        let mut grew = false;
        loop {
            match page_height(page).await {
                Ok(height) if height > before => {
                    grew = true;
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("aborting scroll pass: {e:#}");
                    return;
                }
            }
            if Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        if !grew {
            debug!("content exhausted after {} scroll rounds", round + 1);
            return;
        }
    }
}

/// Enumerate item positions on the materialized listing.
///
/// The listing container never resolving is fatal. Probing stops at the first
/// failing position, or at the item cap; the latter emits a one-time
/// advisory before any item is processed.
pub async fn enumerate(
    page: &Page,
    config: &CrawlConfig,
    progress: &dyn ProgressReporter,
) -> CrawlResult<ListingIndex> {
    if resolve_first_visible(page, selectors::LISTING_CONTAINER)
        .await
        .is_none()
    {
        return Err(CrawlError::ListingDiscovery(
            "search result listing container not found".into(),
        ));
    }

    let mut found = 0;
    let mut capped = false;
    loop {
        let position = found + 1;
        let probes = selectors::listing_item(position);
        if resolve_first_visible(page, &probes).await.is_none() {
            debug!("listing enumeration stopped at position {position}");
            break;
        }
        found += 1;
        if found == config.max_items() {
            capped = true;
            break;
        }
    }
    info!("found {found} listing items");

    let index = ListingIndex::from_enumeration(found, capped);
    if index.capped() {
        progress.report_advisory(&format!(
            "listing has {} or more items; only the first {} will be processed",
            config.max_items(),
            config.max_items()
        ));
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_failing_probe_bounds_the_index() {
        // positions 1..=k resolved, k+1 failed
        let index = ListingIndex::from_enumeration(7, false);
        assert_eq!(index.len(), 7);
        assert_eq!(index.positions().first(), Some(&1));
        assert_eq!(index.positions().last(), Some(&7));
        assert!(!index.capped());
    }

    #[test]
    fn capped_enumeration_stops_at_the_cap() {
        let index = ListingIndex::from_enumeration(50, true);
        assert_eq!(index.len(), 50);
        assert!(index.capped());
        assert_eq!(index.positions().last(), Some(&50));
    }

    #[test]
    fn empty_listing_is_a_normal_outcome() {
        let index = ListingIndex::from_enumeration(0, false);
        assert!(index.is_empty());
        assert!(!index.capped());
    }
}
