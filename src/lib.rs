//! Resilient crawl-and-extract engine for session-gated, dynamically
//! rendered promotional-event listings.
//!
//! The crawl authenticates with injected credential cookies, enumerates a
//! scroll-loaded listing for a keyword, walks into each item's detail view,
//! extracts drift-tolerant fields through ordered selector fallback chains,
//! expands the purchasable options behind the purchase modal, and aggregates
//! everything into one [`records::ResultTable`], tolerating partial failure
//! at every level below the session itself.

pub mod config;
pub mod credentials;
pub mod detail;
pub mod error;
pub mod listing;
pub mod orchestrator;
pub mod progress;
pub mod records;
pub mod selectors;
pub mod session;
pub mod utils;

pub use config::{CrawlConfig, CrawlConfigBuilder};
pub use credentials::CredentialSet;
pub use error::{CrawlError, CrawlResult};
pub use listing::ListingIndex;
pub use orchestrator::CrawlOrchestrator;
pub use progress::{LogProgress, NoOpProgress, ProgressReporter};
pub use records::{EventRecord, OptionRecord, ResultRow, ResultTable};
pub use session::Session;

/// Run a crawl without progress observation.
pub async fn crawl(config: CrawlConfig, credentials: CredentialSet) -> CrawlResult<ResultTable> {
    CrawlOrchestrator::new(config, credentials)
        .run(&NoOpProgress)
        .await
}
