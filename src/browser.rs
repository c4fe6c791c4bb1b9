use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tracing::{debug, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/87.0.4280.88 Safari/537.36";
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Browser automation capability used by both crawl phases: navigation, DOM
/// waits, rendered-page snapshots, clicks, and shutdown. One page at a time,
/// strictly sequential.
pub trait BrowserAgent {
    /// Navigate the current page, bounded by the page-load timeout.
    async fn goto(&mut self, url: &str) -> Result<()>;
    /// Bounded polling suspension until an element matching `selector`
    /// is present.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<()>;
    /// Fully rendered DOM of the current page.
    async fn content(&mut self) -> Result<String>;
    /// JS click on the last element matching `selector`.
    async fn click_last(&mut self, selector: &str) -> Result<()>;
    /// Terminate the underlying browser process.
    async fn close(&mut self) -> Result<()>;
}

/// Headless Chromium over the DevTools protocol: one process, one tab.
pub struct Chromium {
    browser: Browser,
    page: Page,
    load_timeout: Duration,
}

impl Chromium {
    pub async fn launch(load_timeout: Duration) -> Result<Self> {
        let mut builder = BrowserConfig::builder().no_sandbox().window_size(1920, 1080);
        if let Some(bin) = find_chrome_binary() {
            debug!("using chrome binary: {}", bin.display());
            builder = builder.chrome_executable(bin);
        }
        let config = builder
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-extensions")
            .arg("--incognito")
            // Detail pages are text-only for our purposes; skip image decoding.
            .arg("--blink-settings=imagesEnabled=false")
            .arg(format!("--user-agent={USER_AGENT}"))
            .build()
            .map_err(|e| anyhow!("browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch headless browser")?;

        // The CDP event stream must be polled for the connection to stay up.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    warn!("browser handler: {event:?}");
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("failed to open a tab")?;

        Ok(Self {
            browser,
            page,
            load_timeout,
        })
    }
}

impl BrowserAgent for Chromium {
    async fn goto(&mut self, url: &str) -> Result<()> {
        tokio::time::timeout(self.load_timeout, async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<_, anyhow::Error>(())
        })
        .await
        .map_err(|_| anyhow!("page load timed out after {:?}: {url}", self.load_timeout))?
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(anyhow!("timed out waiting for `{selector}`"));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn content(&mut self) -> Result<String> {
        self.page.content().await.context("failed to read page content")
    }

    async fn click_last(&mut self, selector: &str) -> Result<()> {
        // JS click: the pagination target is a screen-reader-only span that
        // a synthesized mouse click cannot reach.
        let js = format!(
            "(() => {{ const els = document.querySelectorAll({selector:?}); \
             if (!els.length) return false; \
             els[els.length - 1].click(); return true; }})()"
        );
        let clicked: bool = self.page.evaluate(js).await?.into_value()?;
        if clicked {
            Ok(())
        } else {
            Err(anyhow!("no element matched `{selector}`"))
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.browser.close().await?;
        self.browser.wait().await?;
        Ok(())
    }
}

/// Locate a Chrome/Chromium binary: `CHROME_BIN` override first, then
/// well-known install paths, else let chromiumoxide do its own lookup.
fn find_chrome_binary() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("CHROME_BIN") {
        let path = PathBuf::from(p);
        if path.exists() {
            return Some(path);
        }
    }
    [
        "/usr/bin/google-chrome-stable",
        "/usr/bin/google-chrome",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/chromium/current/usr/lib/chromium-browser/chrome",
    ]
    .iter()
    .map(PathBuf::from)
    .find(|p| p.exists())
}

// ── Test double ──
