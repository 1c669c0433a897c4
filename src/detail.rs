//! Per-item detail extraction and option expansion.
//!
//! Every extraction boundary fails closed: a field that cannot be resolved
//! becomes `None`, a missing purchase control or option container ends the
//! item with a placeholder row, and a failing option sub-position stops the
//! option loop. A single unstable field never aborts the item, and a single
//! unstable item never aborts the crawl.

use anyhow::{Context, Result};
use chromiumoxide::page::Page;
use tracing::{debug, info, warn};

use crate::config::CrawlConfig;
use crate::listing;
use crate::records::{EventRecord, OptionRecord, rows_for_item};
use crate::selectors::{self, element_text, resolve_first_visible, resolve_text};
use crate::utils::{current_url, settle, with_page_timeout};

/// Extracts one listing item at a time, with the page starting on the
/// materialized listing view.
pub struct DetailExtractor<'a> {
    page: &'a Page,
    config: &'a CrawlConfig,
}

impl<'a> DetailExtractor<'a> {
    pub fn new(page: &'a Page, config: &'a CrawlConfig) -> Self {
        Self { page, config }
    }

    /// Extract the item at `position`: navigate into its detail view, pull
    /// the event fields, expand the purchasable options, and return to the
    /// listing.
    ///
    /// An error here is item-level: the caller skips the item and continues.
    /// The returned rows always number at least one.
    pub async fn extract(&self, position: usize) -> Result<Vec<OptionRecord>> {
        let listing_url = current_url(self.page).await;

        let article = resolve_first_visible(self.page, &selectors::listing_item(position))
            .await
            .with_context(|| format!("listing item {position} not found"))?;
        article
            .click()
            .await
            .with_context(|| format!("click listing item {position}"))?;
        settle(self.config.item_click_settle_secs()).await;

        let event = self.extract_event_fields().await;
        let options = self.expand_options(&event).await;

        // Rows survive a failed return; the next item recovers the listing.
        self.return_to_listing(listing_url.as_deref()).await;

        Ok(rows_for_item(event, options))
    }

    /// Re-establish the listing view after an item failure left the page in
    /// an unknown state.
    pub async fn recover_listing(&self) {
        self.return_to_listing(None).await;
    }

    async fn extract_event_fields(&self) -> EventRecord {
        debug!("extracting detail fields");
        EventRecord {
            event_title: self.extract_title().await,
            rating: resolve_text(self.page, selectors::RATING).await,
            review_count: resolve_text(self.page, selectors::REVIEW_COUNT).await,
            provider_name: resolve_text(self.page, selectors::PROVIDER_NAME).await,
            location: resolve_text(self.page, selectors::LOCATION).await,
            inquiry_count: resolve_text(self.page, selectors::INQUIRY_COUNT).await,
            scrap_count: resolve_text(self.page, selectors::SCRAP_COUNT).await,
            detail_url: current_url(self.page).await,
        }
    }

    /// A "NEW" badge can occupy the primary title slot, pushing the real
    /// title into the next sibling slot. The badge case is checked first,
    /// then the plain-title chain.
    async fn extract_title(&self) -> Option<String> {
        if let Some(first_slot) =
            resolve_first_visible(self.page, selectors::TITLE_PRIMARY_SLOT).await
            && let Some(text) = element_text(&first_slot).await
            && text.eq_ignore_ascii_case("NEW")
            && let Some(title) = resolve_text(self.page, selectors::TITLE_AFTER_BADGE).await
        {
            return Some(title);
        }
        resolve_text(self.page, selectors::EVENT_TITLE).await
    }

    /// Open the purchase modal and walk the option list.
    ///
    /// An empty return means the item gets its placeholder row; every early
    /// exit here is an expected page shape, not an error.
    async fn expand_options(&self, event: &EventRecord) -> Vec<OptionRecord> {
        let Some(section) = resolve_first_visible(self.page, selectors::PURCHASE_SECTION).await
        else {
            info!("purchase section not found");
            return Vec::new();
        };

        let buttons = section.find_elements("button").await.unwrap_or_default();
        debug!("purchase section has {} buttons", buttons.len());
        // With two or more buttons the first is a secondary action; the
        // purchase control is the second.
        let target = match buttons.len() {
            0 => {
                info!("no purchase control on this item");
                return Vec::new();
            }
            1 => &buttons[0],
            _ => &buttons[1],
        };
        if let Err(e) = target.click().await {
            warn!("purchase control click failed: {e}");
            return Vec::new();
        }
        settle(self.config.modal_settle_secs()).await;

        if resolve_first_visible(self.page, selectors::OPTION_CONTAINER)
            .await
            .is_none()
        {
            warn!("option container not found after purchase click");
            return Vec::new();
        }

        let mut options = Vec::new();
        for position in 1..=self.config.max_options() {
            let probes = selectors::option_item(position);
            let Some(entry) = resolve_first_visible(self.page, &probes).await else {
                break;
            };
            let name = match entry.find_element(selectors::OPTION_NAME_REL).await {
                Ok(el) => element_text(&el).await,
                Err(_) => None,
            };
            let price = match entry.find_element(selectors::OPTION_PRICE_REL).await {
                Ok(el) => element_text(&el).await,
                Err(_) => None,
            };
            let (Some(name), Some(price)) = (name, price) else {
                debug!("option {position} missing name or price; stopping expansion");
                break;
            };
            debug!("option {position}: {name} @ {price}");
            options.push(OptionRecord {
                event: event.clone(),
                option_name: Some(name),
                option_price: Some(price),
            });
        }
        if options.len() == self.config.max_options() {
            debug!("option expansion hit the cap");
        }
        info!("expanded {} options", options.len());
        options
    }

    /// Navigate back to the stored listing URL (or re-issue the search URL)
    /// and re-materialize the lazily loaded content so later positions
    /// resolve. Best-effort: a failure leaves recovery to the next item.
    async fn return_to_listing(&self, listing_url: Option<&str>) {
        let target = match listing_url {
            Some(url) => url.to_string(),
            None => match self.config.search_url() {
                Ok(url) => url.to_string(),
                Err(e) => {
                    warn!("cannot rebuild listing URL: {e}");
                    return;
                }
            },
        };
        let nav = with_page_timeout(
            async {
                self.page
                    .goto(target.as_str())
                    .await
                    .context("navigate back to listing")?;
                self.page
                    .wait_for_navigation()
                    .await
                    .context("wait for listing load")?;
                Ok(())
            },
            self.config.page_load_timeout_secs(),
            "return to listing",
        )
        .await;
        if let Err(e) = nav {
            warn!("return to listing failed: {e:#}");
            return;
        }
        settle(self.config.return_settle_secs()).await;
        listing::scroll_to_load_all(self.page, self.config).await;
    }
}
