//! Crate-level error type for crawl operations.
//!
//! Only fatal failures surface as a `CrawlError`; field- and item-level
//! failures are absorbed and logged where they occur.

/// Fatal crawl failures, named by the stage that failed.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Browser session could not be established
    #[error("browser error: {0}")]
    Browser(String),

    /// Authentication could not be verified
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Search navigation failed
    #[error("search failed: {0}")]
    Search(String),

    /// The listing container never resolved
    #[error("listing discovery failed: {0}")]
    ListingDiscovery(String),

    /// Other errors
    #[error("crawl error: {0}")]
    Other(String),
}

impl From<anyhow::Error> for CrawlError {
    fn from(err: anyhow::Error) -> Self {
        // {:#} preserves the full context chain
        Self::Other(format!("{err:#}"))
    }
}

/// Convenience alias for Result with `CrawlError`
pub type CrawlResult<T> = Result<T, CrawlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_failed_stage() {
        assert!(
            CrawlError::Auth("cookies rejected".into())
                .to_string()
                .starts_with("authentication failed")
        );
        assert!(
            CrawlError::Search("timeout".into())
                .to_string()
                .starts_with("search failed")
        );
        assert!(
            CrawlError::ListingDiscovery("container missing".into())
                .to_string()
                .starts_with("listing discovery failed")
        );
    }

    #[test]
    fn anyhow_context_chain_is_preserved() {
        let err = anyhow::anyhow!("root cause").context("outer step");
        let crawl_err = CrawlError::from(err);
        let msg = crawl_err.to_string();
        assert!(msg.contains("outer step"));
        assert!(msg.contains("root cause"));
    }
}
