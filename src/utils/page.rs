//! Helpers for chromiumoxide `Page` operations.
//!
//! Timeout wrapping and tolerant accessors for values that may not be
//! available yet (URL before navigation, text on a detached element).

use anyhow::Result;
use chromiumoxide::page::Page;
use std::future::Future;
use std::time::Duration;
use tracing::trace;

/// Wrap an async page operation with an explicit timeout.
///
/// Prevents indefinite hangs on navigation and load waits. The error message
/// distinguishes a timeout from an operation failure.
pub async fn with_page_timeout<F, T>(
    operation: F,
    timeout_secs: u64,
    operation_name: &str,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(Duration::from_secs(timeout_secs), operation).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "{operation_name} timeout after {timeout_secs} seconds"
        )),
    }
}

/// Get the page URL with a diagnostic fallback.
///
/// Two failure modes collapse to `None`: a browser communication error and a
/// page that has not navigated yet. Callers that need a display value convert
/// at the boundary.
pub async fn current_url(page: &Page) -> Option<String> {
    match page.url().await {
        Ok(Some(url)) => Some(url),
        Ok(None) => {
            trace!("page URL is None (page not yet navigated)");
            None
        }
        Err(e) => {
            trace!("failed to get page URL (browser communication error): {e}");
            None
        }
    }
}

/// Fixed settle pause after a navigation or interaction, letting asynchronous
/// rendering finish before extraction proceeds.
pub async fn settle(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
}
