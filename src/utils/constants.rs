//! Shared configuration constants
//!
//! Default values used throughout the crawler to avoid magic numbers.

use std::time::Duration;

/// Default site root for the promotional-event listing service.
pub const DEFAULT_BASE_URL: &str = "https://www.yeoshin.co.kr";

/// Path of the authenticated-only page used to verify the session.
pub const MY_PAGE_PATH: &str = "/myPage";

/// Path of the keyword search endpoint. Query parameters `q` and `tab`
/// are appended at call time.
pub const SEARCH_PATH: &str = "/search/category";

/// Default cap on enumerated listing items per crawl.
pub const DEFAULT_MAX_ITEMS: usize = 50;

/// Defensive cap on option rows expanded per item.
///
/// The option list is enumerated by incrementing an index until a lookup
/// fails; the cap bounds the loop against a misbehaving page.
pub const DEFAULT_MAX_OPTIONS: usize = 50;

/// Worker pool size used when concurrent mode is requested.
pub const DEFAULT_POOL_SIZE: usize = 3;

/// Interval between element-presence polls while a selector waits.
pub const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Chrome user agent string
///
/// Chrome releases new stable versions ~every 4 weeks; update when the
/// version window gets stale enough to stand out.
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
