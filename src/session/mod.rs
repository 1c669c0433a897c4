//! Browser session lifecycle.
//!
//! One [`Session`] owns exactly one Chrome process: the browser handle, its
//! CDP event-handler task, one page, and the per-session temp profile
//! directory. Teardown is deterministic and each step is independent, so a
//! failure closing the page cannot prevent killing the browser or removing
//! the profile.

mod authenticator;

pub use authenticator::{authenticate, verify};

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::{self, JoinHandle};
use tracing::{error, info, trace, warn};

use crate::config::CrawlConfig;
use crate::utils::CHROME_USER_AGENT;

/// Distinguishes profile directories when several sessions run in one
/// process (pooled mode).
static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Find a Chrome/Chromium executable on the system.
///
/// The `CHROMIUM_PATH` environment variable overrides all other methods.
/// Installing a browser is out of scope; a missing executable is an error.
pub fn find_browser_executable() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("CHROMIUM_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("using browser from CHROMIUM_PATH: {}", path.display());
            return Ok(path);
        }
        warn!(
            "CHROMIUM_PATH points to non-existent file: {}",
            path.display()
        );
    }

    let paths: &[&str] = if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "~/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/opt/homebrew/bin/chromium",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
    };

    for path_str in paths {
        let path = if let Some(rest) = path_str.strip_prefix("~/") {
            match dirs::home_dir() {
                Some(home) => home.join(rest),
                None => continue,
            }
        } else {
            PathBuf::from(path_str)
        };
        if path.exists() {
            info!("found browser at: {}", path.display());
            return Ok(path);
        }
    }

    if !cfg!(target_os = "windows") {
        for cmd in &["chromium", "chromium-browser", "google-chrome", "chrome"] {
            if let Ok(output) = Command::new("which").arg(cmd).output()
                && output.status.success()
            {
                let path_str = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path_str.is_empty() {
                    let path = PathBuf::from(path_str);
                    info!("found browser via 'which': {}", path.display());
                    return Ok(path);
                }
            }
        }
    }

    Err(anyhow::anyhow!(
        "Chrome/Chromium executable not found; set CHROMIUM_PATH to an installed browser"
    ))
}

/// Launch a browser instance configured for crawling.
///
/// Returns the browser, the TRACKED handler task (it must be aborted when the
/// session ends, or it runs forever), and the temp profile directory to remove
/// after the browser exits.
pub async fn launch_browser(config: &CrawlConfig) -> Result<(Browser, JoinHandle<()>, PathBuf)> {
    let chrome_path = match config.chrome_executable() {
        Some(path) => path.clone(),
        None => find_browser_executable()?,
    };

    let user_data_dir = std::env::temp_dir().join(format!(
        "promocrawl_chrome_{}_{}",
        std::process::id(),
        SESSION_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    std::fs::create_dir_all(&user_data_dir).context("failed to create user data directory")?;

    let mut config_builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(30))
        .window_size(1920, 1080)
        .user_data_dir(user_data_dir.clone())
        .chrome_executable(chrome_path);

    if config.headless() {
        config_builder = config_builder.headless_mode(HeadlessMode::default());
    } else {
        config_builder = config_builder.with_head();
    }

    config_builder = config_builder
        .arg(format!("--user-agent={CHROME_USER_AGENT}"))
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-notifications")
        .arg("--disable-software-rasterizer")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-gpu")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--no-sandbox")
        .arg("--disable-extensions")
        .arg("--disable-popup-blocking")
        .arg("--disable-background-networking")
        .arg("--hide-scrollbars")
        .arg("--mute-audio");

    let browser_config = config_builder
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

    info!("launching browser");
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("failed to launch browser")?;

    let handler_task = task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                let message = e.to_string();
                // Chrome emits CDP events chromiumoxide doesn't recognize;
                // those deserialization failures are noise, not faults.
                let benign = message
                    .contains("data did not match any variant of untagged enum Message")
                    || message.contains("Failed to deserialize WS response");
                if benign {
                    trace!("suppressed benign CDP serialization error: {message}");
                } else {
                    error!("browser handler error: {e:?}");
                }
            }
        }
        trace!("browser event handler task completed");
    });

    Ok((browser, handler_task, user_data_dir))
}

/// An authenticated browsing session.
///
/// All navigation for one worker goes through this page. Prefer
/// [`Session::shutdown`]; `Drop` only covers abnormal termination (the
/// handler is aborted and the profile directory removed, while the Chrome
/// process is killed by `Browser::drop`).
#[derive(Debug)]
pub struct Session {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
    user_data_dir: Option<PathBuf>,
}

impl Session {
    pub(crate) fn new(
        browser: Browser,
        handler: JoinHandle<()>,
        page: Page,
        user_data_dir: PathBuf,
    ) -> Self {
        Self {
            browser,
            handler,
            page,
            user_data_dir: Some(user_data_dir),
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Orderly teardown: page, browser, handler task, temp profile, in that
    /// order, each step independent of the previous one's outcome.
    pub async fn shutdown(mut self) {
        if let Err(e) = self.page.clone().close().await {
            warn!("failed to close page: {e}");
        }
        if let Err(e) = self.browser.close().await {
            warn!("failed to close browser: {e}");
        }
        if let Err(e) = self.browser.wait().await {
            warn!("browser did not exit cleanly: {e}");
        }
        self.handler.abort();
        self.cleanup_temp_dir();
    }

    /// Remove the temp profile directory. Blocking because it must also work
    /// from `Drop`; called only after the browser has exited (or is being
    /// killed), when Chrome has released its file handles.
    fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take()
            && let Err(e) = std::fs::remove_dir_all(&path)
        {
            warn!(
                "failed to remove temp profile {}: {e}; manual cleanup may be required",
                path.display()
            );
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.handler.abort();
        if self.user_data_dir.is_some() {
            warn!("session dropped without explicit shutdown; removing temp profile in Drop");
            self.cleanup_temp_dir();
        }
    }
}
