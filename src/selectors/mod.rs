//! Selector fallback chains and the generic resolver.
//!
//! The target site's front-end is rebuilt often and its generated class names
//! are not stable across deploys, so every extracted field keeps at least two
//! independent locator strategies: a structural XPath and a class-anchored CSS
//! selector. Chains are declarative data (`field → ordered probes`) consumed
//! by one resolver, rather than a hand-maintained try/except per field.
//!
//! Resolution order within a chain is significant: the cheaper or likelier
//! probe comes first, and the resolver never reorders. Exhausting a chain is
//! an expected outcome, not an error: callers fall back to the field's
//! placeholder.

use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use std::borrow::Cow;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::utils::POLL_INTERVAL;

// =============================================================================
// Locators and probes
// =============================================================================

/// One element-location strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Css(Cow<'static, str>),
    XPath(Cow<'static, str>),
}

impl Locator {
    pub fn css(expr: impl Into<Cow<'static, str>>) -> Self {
        Self::Css(expr.into())
    }

    pub fn xpath(expr: impl Into<Cow<'static, str>>) -> Self {
        Self::XPath(expr.into())
    }

    pub fn expr(&self) -> &str {
        match self {
            Self::Css(e) | Self::XPath(e) => e,
        }
    }
}

/// A locator plus its per-attempt timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldProbe {
    pub locator: Locator,
    pub timeout: Duration,
}

impl FieldProbe {
    pub fn css(expr: impl Into<Cow<'static, str>>, timeout_secs: u64) -> Self {
        Self {
            locator: Locator::css(expr),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn xpath(expr: impl Into<Cow<'static, str>>, timeout_secs: u64) -> Self {
        Self {
            locator: Locator::xpath(expr),
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

// =============================================================================
// Probe tables
// =============================================================================

const fn css_probe(expr: &'static str, secs: u64) -> FieldProbe {
    FieldProbe {
        locator: Locator::Css(Cow::Borrowed(expr)),
        timeout: Duration::from_secs(secs),
    }
}

const fn xpath_probe(expr: &'static str, secs: u64) -> FieldProbe {
    FieldProbe {
        locator: Locator::XPath(Cow::Borrowed(expr)),
        timeout: Duration::from_secs(secs),
    }
}

/// Indicators that the session is logged in, probed on the my-page view.
pub const LOGIN_INDICATORS: &[FieldProbe] = &[
    css_probe("#ct-view > div > div > div.sc-d64fbdbd-0.IeGIQ > a", 10),
    xpath_probe(r#"//*[@id="ct-view"]/div/div/div[1]/a"#, 10),
    css_probe(".user-info", 10),
    css_probe(".mypage-user", 10),
];

/// Negative heuristic: a login link present means we are logged out.
pub const LOGIN_LINK: &[FieldProbe] = &[css_probe("a[href*='login']", 2)];

/// Container holding the search-result listing.
pub const LISTING_CONTAINER: &[FieldProbe] = &[
    xpath_probe(r#"//*[@id="ct-view"]/div/main/article/section[2]/section"#, 10),
    css_probe(
        "#ct-view > div > main > article > section:nth-child(2) > section",
        10,
    ),
];

/// The article element of the listing item at `position` (1-based).
pub fn listing_item(position: usize) -> Vec<FieldProbe> {
    vec![
        FieldProbe::xpath(
            format!(r#"//*[@id="ct-view"]/div/main/article/section[2]/section/div[{position}]/article"#),
            10,
        ),
        FieldProbe::css(
            format!(
                "#ct-view > div > main > article > section:nth-child(2) > section > div:nth-child({position}) > article"
            ),
            10,
        ),
    ]
}

/// Primary title slot; when a badge occupies it, the real title is the
/// next sibling slot.
pub const TITLE_PRIMARY_SLOT: &[FieldProbe] = &[xpath_probe(
    r#"//*[@id="ct-view"]/div/div/div[1]/div[2]/article/h1/span[1]"#,
    2,
)];

/// Title slot next to the badge.
pub const TITLE_AFTER_BADGE: &[FieldProbe] = &[xpath_probe(
    r#"//*[@id="ct-view"]/div/div/div[1]/div[2]/article/h1/span[2]"#,
    2,
)];

/// Event title on the detail view.
pub const EVENT_TITLE: &[FieldProbe] = &[
    xpath_probe(r#"//*[@id="ct-view"]/div/div/div[1]/div[2]/article/h1/span"#, 5),
    css_probe(
        "#ct-view > div > div > div.relative.flex-col > div.sc-68757109-1.kfwxBJ > article > h1 > span",
        5,
    ),
];

/// Star rating.
pub const RATING: &[FieldProbe] = &[
    xpath_probe(
        r#"//*[@id="ct-view"]/div/div/div[1]/div[2]/article/section[1]/div[2]/div/div/span"#,
        5,
    ),
    css_probe(
        r"#ct-view > div > div > div.relative.flex-col > div.sc-68757109-1.kfwxBJ > article > section.flex.flex-col.justify-center.w-full.gap-\[8px\] > div.flex.items-end.justify-between.w-full > div > div > span",
        5,
    ),
];

/// Review count.
pub const REVIEW_COUNT: &[FieldProbe] = &[
    xpath_probe(
        r#"//*[@id="ct-view"]/div/div/div[1]/div[2]/article/section[1]/div[2]/div/span"#,
        5,
    ),
    css_probe(
        r"#ct-view > div > div > div.relative.flex-col > div.sc-68757109-1.kfwxBJ > article > section.flex.flex-col.justify-center.w-full.gap-\[8px\] > div.flex.items-end.justify-between.w-full > div > span",
        5,
    ),
];

/// Provider (hospital) name.
pub const PROVIDER_NAME: &[FieldProbe] = &[
    xpath_probe(
        r#"//*[@id="ct-view"]/div/div/div[1]/div[2]/div[1]/article/div/div/p"#,
        5,
    ),
    css_probe(
        "#ct-view > div > div > div.relative.flex-col > div.sc-68757109-1.kfwxBJ > div.sc-1543ab3d-0.sc-1543ab3d-1.sc-509fd85f-0.hQTMVb.bVOgYk.jlAXoU > article > div > div > p",
        5,
    ),
];

/// Provider location.
pub const LOCATION: &[FieldProbe] = &[
    xpath_probe(
        r#"//*[@id="ct-view"]/div/div/div[1]/div[2]/div[1]/article/section[2]/div/div/span[1]"#,
        5,
    ),
    css_probe(
        "#ct-view > div > div > div.relative.flex-col > div.sc-68757109-1.kfwxBJ > div.sc-1543ab3d-0.sc-1543ab3d-1.sc-509fd85f-0.hQTMVb.bVOgYk.jlAXoU > article > section:nth-child(3) > div > div > span:nth-child(2)",
        5,
    ),
];

/// Inquiry count.
pub const INQUIRY_COUNT: &[FieldProbe] = &[
    xpath_probe(
        r#"//*[@id="ct-view"]/div/div/div[1]/div[2]/div[4]/div[1]/div/p[2]"#,
        5,
    ),
    css_probe(
        "#ct-view > div > div > div.relative.flex-col > div.sc-68757109-1.kfwxBJ > div.sc-1543ab3d-0.sc-1543ab3d-1.sc-2ad9e729-2.hQTMVb.jrOHqu.bpXUeM > div.sc-1543ab3d-0.sc-1543ab3d-1.hQTMVb.iHBozd > div > p.sc-78093dd3-0.sc-78093dd3-1.knAupo.ePvHjs",
        5,
    ),
];

/// Scrap (bookmark) count.
pub const SCRAP_COUNT: &[FieldProbe] = &[
    xpath_probe(r#"//*[@id="ct-view"]/div/div/section/div[1]/div/p"#, 5),
    css_probe(
        "#ct-view > div > div > section > div.sc-1543ab3d-0.sc-1543ab3d-1.hQTMVb.dtvKsa > div > p",
        5,
    ),
];

/// Section containing the purchase controls.
pub const PURCHASE_SECTION: &[FieldProbe] = &[
    xpath_probe(r#"//*[@id="ct-view"]/div/div/section"#, 5),
    css_probe("#ct-view > div > div > section", 5),
];

/// Container of the option list inside the purchase modal.
pub const OPTION_CONTAINER: &[FieldProbe] = &[
    xpath_probe(
        r#"//*[@id="ct-view"]/div/div/div[2]/div/div/div/div[2]/div[2]"#,
        10,
    ),
    css_probe(
        "#ct-view > div > div > div:nth-child(2) > div > div > div > div:nth-child(2) > div:nth-child(2)",
        10,
    ),
];

/// The option entry at `position` (1-based) inside the modal container.
pub fn option_item(position: usize) -> Vec<FieldProbe> {
    vec![
        FieldProbe::xpath(
            format!(r#"//*[@id="ct-view"]/div/div/div[2]/div/div/div/div[2]/div[2]/div[{position}]"#),
            5,
        ),
        FieldProbe::css(
            format!(
                "#ct-view > div > div > div:nth-child(2) > div > div > div > div:nth-child(2) > div:nth-child(2) > div:nth-child({position})"
            ),
            5,
        ),
    ]
}

/// Option name relative to an option entry.
pub const OPTION_NAME_REL: &str = "div > p";
/// Option price relative to an option entry.
pub const OPTION_PRICE_REL: &str = "p";

// =============================================================================
// Resolver
// =============================================================================

const VISIBILITY_CHECK_JS: &str = r"
    function() {
        const rect = this.getBoundingClientRect();
        const style = window.getComputedStyle(this);
        return rect.width > 0 && rect.height > 0
            && style.visibility !== 'hidden'
            && style.display !== 'none';
    }
";

/// Check that an element reports itself visible.
///
/// Communication failures count as not visible so the caller keeps polling.
pub async fn is_visible(element: &Element) -> bool {
    match element.call_js_fn(VISIBILITY_CHECK_JS, false).await {
        Ok(ret) => ret
            .result
            .value
            .as_ref()
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
        Err(e) => {
            trace!("visibility check failed: {e}");
            false
        }
    }
}

async fn find(page: &Page, locator: &Locator) -> Option<Element> {
    let found = match locator {
        Locator::Css(expr) => page.find_element(expr.as_ref()).await,
        Locator::XPath(expr) => page.find_xpath(expr.as_ref()).await,
    };
    found.ok()
}

/// Poll for one locator until it resolves to a visible element or the
/// timeout elapses.
pub async fn wait_for_visible(page: &Page, locator: &Locator, timeout: Duration) -> Option<Element> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(element) = find(page, locator).await
            && is_visible(&element).await
        {
            return Some(element);
        }
        if Instant::now() >= deadline {
            return None;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Try each probe in order; return the first visible element.
///
/// `None` means the whole chain was exhausted, an expected outcome the
/// caller maps to the field's placeholder.
pub async fn resolve_first_visible(page: &Page, probes: &[FieldProbe]) -> Option<Element> {
    for probe in probes {
        if let Some(element) = wait_for_visible(page, &probe.locator, probe.timeout).await {
            return Some(element);
        }
        debug!("locator exhausted: {}", probe.locator.expr());
    }
    None
}

/// Trimmed inner text of an element; empty text counts as missing.
pub async fn element_text(element: &Element) -> Option<String> {
    let text = element.inner_text().await.ok().flatten()?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Resolve a chain and return the element's trimmed text.
pub async fn resolve_text(page: &Page, probes: &[FieldProbe]) -> Option<String> {
    let element = resolve_first_visible(page, probes).await?;
    element_text(&element).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_field_chain_keeps_two_independent_strategies() {
        for chain in [
            LISTING_CONTAINER,
            EVENT_TITLE,
            RATING,
            REVIEW_COUNT,
            PROVIDER_NAME,
            LOCATION,
            INQUIRY_COUNT,
            SCRAP_COUNT,
            PURCHASE_SECTION,
            OPTION_CONTAINER,
        ] {
            assert!(chain.len() >= 2, "chain too short: {chain:?}");
            let has_css = chain.iter().any(|p| matches!(p.locator, Locator::Css(_)));
            let has_xpath = chain.iter().any(|p| matches!(p.locator, Locator::XPath(_)));
            assert!(has_css && has_xpath, "chain lacks a strategy mix: {chain:?}");
        }
    }

    #[test]
    fn probe_order_is_preserved() {
        // the structural XPath is the primary strategy for detail fields
        assert!(matches!(EVENT_TITLE[0].locator, Locator::XPath(_)));
        assert!(matches!(EVENT_TITLE[1].locator, Locator::Css(_)));
    }

    #[test]
    fn probe_timeouts_stay_in_the_observed_band() {
        let all = [
            LOGIN_INDICATORS,
            LISTING_CONTAINER,
            EVENT_TITLE,
            RATING,
            REVIEW_COUNT,
            PROVIDER_NAME,
            LOCATION,
            INQUIRY_COUNT,
            SCRAP_COUNT,
            PURCHASE_SECTION,
            OPTION_CONTAINER,
            TITLE_PRIMARY_SLOT,
            TITLE_AFTER_BADGE,
        ];
        for probe in all.iter().flat_map(|c| c.iter()) {
            let secs = probe.timeout.as_secs();
            assert!((2..=10).contains(&secs), "timeout out of band: {probe:?}");
        }
    }

    #[test]
    fn positional_probes_interpolate_the_position() {
        let probes = listing_item(7);
        assert!(probes[0].locator.expr().contains("div[7]/article"));
        assert!(probes[1].locator.expr().contains("div:nth-child(7) > article"));

        let probes = option_item(3);
        assert!(probes[0].locator.expr().ends_with("div[3]"));
        assert!(probes[1].locator.expr().ends_with("div:nth-child(3)"));
    }
}
