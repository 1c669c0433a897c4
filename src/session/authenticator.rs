//! Session establishment and login verification.
//!
//! The site never sees a login form from us: authentication is carried
//! entirely by credential cookies injected into a fresh browser context,
//! followed by a reload and an explicit logged-in probe. A session that
//! cannot be verified aborts the whole crawl; this is the one fatal,
//! non-retried failure mode in the system.

use anyhow::Context;
use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::page::Page;
use tracing::{debug, error, info, warn};

use crate::config::CrawlConfig;
use crate::credentials::CredentialSet;
use crate::error::{CrawlError, CrawlResult};
use crate::selectors::{self, resolve_first_visible};
use crate::utils::with_page_timeout;

use super::{Session, launch_browser};

/// Establish an authenticated [`Session`].
///
/// Opens a fresh browser, injects every populated credential token as a
/// cookie on the site domain, reloads, and verifies the logged-in state.
pub async fn authenticate(
    config: &CrawlConfig,
    credentials: &CredentialSet,
) -> CrawlResult<Session> {
    if credentials.is_empty() {
        return Err(CrawlError::Auth(
            "no credential tokens are populated; cannot establish a session".into(),
        ));
    }

    let (browser, handler, user_data_dir) = launch_browser(config)
        .await
        .map_err(|e| CrawlError::Browser(format!("{e:#}")))?;

    let page = match browser.new_page("about:blank").await {
        Ok(page) => page,
        Err(e) => {
            handler.abort();
            if let Err(cleanup_err) = std::fs::remove_dir_all(&user_data_dir) {
                warn!(
                    "failed to remove temp profile {}: {cleanup_err}",
                    user_data_dir.display()
                );
            }
            return Err(CrawlError::Browser(format!("failed to create page: {e}")));
        }
    };

    let session = Session::new(browser, handler, page, user_data_dir);
    match establish(&session, config, credentials).await {
        Ok(()) => Ok(session),
        Err(e) => {
            session.shutdown().await;
            Err(e)
        }
    }
}

async fn establish(
    session: &Session,
    config: &CrawlConfig,
    credentials: &CredentialSet,
) -> CrawlResult<()> {
    let page = session.page();
    let timeout_secs = config.page_load_timeout_secs();

    with_page_timeout(
        async {
            page.goto(config.base_url())
                .await
                .context("navigate to site root")?;
            page.wait_for_navigation()
                .await
                .context("wait for site root load")?;
            Ok(())
        },
        timeout_secs,
        "site root navigation",
    )
    .await
    .map_err(|e| CrawlError::Auth(format!("{e:#}")))?;

    inject_cookies(page, config, credentials).await?;

    // Individual cookie failures above are non-fatal; a failure to come back
    // up after the reload is where they escalate.
    with_page_timeout(
        async {
            page.reload().await.context("reload after cookie injection")?;
            Ok(())
        },
        timeout_secs,
        "post-cookie reload",
    )
    .await
    .map_err(|e| CrawlError::Auth(format!("{e:#}")))?;

    if !verify(page, config).await {
        return Err(CrawlError::Auth(
            "could not verify a logged-in session".into(),
        ));
    }

    info!("authenticated session established");
    Ok(())
}

async fn inject_cookies(
    page: &Page,
    config: &CrawlConfig,
    credentials: &CredentialSet,
) -> CrawlResult<()> {
    let domain = config.cookie_domain()?;
    for credential in credentials.iter() {
        let param = match CookieParam::builder()
            .name(credential.name.clone())
            .value(credential.value.clone())
            .domain(domain.clone())
            .path("/")
            .build()
        {
            Ok(param) => param,
            Err(e) => {
                warn!("could not build cookie {}: {e}", credential.name);
                continue;
            }
        };
        match page.set_cookies(vec![param]).await {
            Ok(_) => debug!("cookie set: {}", credential.name),
            Err(e) => warn!("failed to set cookie {}: {e}", credential.name),
        }
    }
    Ok(())
}

/// Probe the authenticated-only my-page for logged-in indicators.
///
/// Falls back to the negative heuristic (a login link present means logged
/// out) when no indicator resolves. An undeterminable state counts as not
/// logged in.
pub async fn verify(page: &Page, config: &CrawlConfig) -> bool {
    let my_page = match config.my_page_url() {
        Ok(url) => url,
        Err(e) => {
            error!("cannot build my-page URL: {e}");
            return false;
        }
    };

    let nav = with_page_timeout(
        async {
            page.goto(my_page.as_str())
                .await
                .context("navigate to my-page")?;
            page.wait_for_navigation()
                .await
                .context("wait for my-page load")?;
            Ok(())
        },
        config.page_load_timeout_secs(),
        "my-page navigation",
    )
    .await;
    if let Err(e) = nav {
        warn!("login verification navigation failed: {e:#}");
        return false;
    }

    if resolve_first_visible(page, selectors::LOGIN_INDICATORS)
        .await
        .is_some()
    {
        info!("login confirmed");
        return true;
    }

    if resolve_first_visible(page, selectors::LOGIN_LINK)
        .await
        .is_some()
    {
        error!("login verification: login link present, session is not authenticated");
        return false;
    }

    error!("login verification: could not determine login state");
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    // The all-tokens-missing check runs before any browser launch, so this
    // covers the fatal path without needing Chrome installed.
    #[tokio::test]
    async fn empty_credential_set_is_fatal() {
        let config = CrawlConfig::builder("botox").build().unwrap();
        let err = authenticate(&config, &CredentialSet::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CrawlError::Auth(_)));
    }
}
