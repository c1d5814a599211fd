//! Web Driver implementation using Playwright
//!
//! This driver backs the harness's page interface with a real browser.

use anyhow::{Context, Result};
use async_trait::async_trait;
use colored::Colorize;
use playwright::api::{Browser, BrowserContext, ElementHandle, Page, Viewport};
use playwright::Playwright;
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::driver::common::{retry_with_recovery, wait_until, PollConfig};
use crate::driver::traits::{PageDriver, Selector};

/// Resolves to the number of loaded resources once the document is complete, -1 before
const LOAD_PROGRESS_JS: &str = "() => document.readyState === 'complete' \
    ? performance.getEntriesByType('resource').length : -1";

/// Reads of `window.location` fail while a navigation replaces the document
const URL_READ_ATTEMPTS: usize = 3;

/// Web browser type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BrowserType {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

/// Web Driver configuration
#[derive(Debug, Clone)]
pub struct WebDriverConfig {
    pub browser_type: BrowserType,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Upper bound for a single network-idle wait
    pub network_idle_timeout_ms: u64,
    /// How long the resource count must stay unchanged to count as idle
    pub network_quiet_ms: u64,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            browser_type: BrowserType::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            network_idle_timeout_ms: 30000,
            network_quiet_ms: 500,
        }
    }
}

/// Web Driver using Playwright
pub struct WebDriver {
    #[allow(dead_code)]
    playwright: Arc<Playwright>,
    browser: Arc<Browser>,
    #[allow(dead_code)]
    context: Arc<BrowserContext>,
    page: Arc<Mutex<Page>>,
    /// Last URL read successfully or navigated to
    last_url: Mutex<String>,
    config: WebDriverConfig,
}

impl WebDriver {
    /// Launch a browser with a single context and page
    pub async fn new(config: WebDriverConfig) -> Result<Self> {
        let playwright = Playwright::initialize()
            .await
            .context("Failed to initialize Playwright")?;

        let browser = match config.browser_type {
            BrowserType::Chromium => launch_chromium_browser(&playwright.chromium(), &config).await?,
            BrowserType::Firefox => {
                playwright
                    .firefox()
                    .launcher()
                    .headless(config.headless)
                    .launch()
                    .await?
            }
            BrowserType::Webkit => {
                playwright
                    .webkit()
                    .launcher()
                    .headless(config.headless)
                    .launch()
                    .await?
            }
        };

        let context = browser.context_builder().build().await?;
        let page = context.new_page().await?;

        page.set_viewport_size(Viewport {
            width: config.viewport_width as i32,
            height: config.viewport_height as i32,
        })
        .await?;

        log::info!(
            "browser ready: {:?} (headless: {}, {}x{})",
            config.browser_type,
            config.headless,
            config.viewport_width,
            config.viewport_height
        );

        Ok(Self {
            playwright: Arc::new(playwright),
            browser: Arc::new(browser),
            context: Arc::new(context),
            page: Arc::new(Mutex::new(page)),
            last_url: Mutex::new(String::new()),
            config,
        })
    }

    /// Element handle for the nth match of a selector
    async fn nth_element(&self, selector: &Selector, nth: usize) -> Result<Option<ElementHandle>> {
        let page = self.page.lock().await;
        let sel = selector_to_playwright(selector);
        let mut elements = page.query_selector_all(&sel).await?;
        if nth < elements.len() {
            Ok(Some(elements.swap_remove(nth)))
        } else {
            Ok(None)
        }
    }

    async fn read_location(&self) -> Result<String> {
        let page = self.page.lock().await;
        let url = page
            .evaluate::<(), String>("() => window.location.href", ())
            .await?;
        Ok(url)
    }

    async fn load_progress(&self) -> i64 {
        let page = self.page.lock().await;
        page.evaluate::<(), i64>(LOAD_PROGRESS_JS, ())
            .await
            .unwrap_or(-1)
    }
}

#[async_trait]
impl PageDriver for WebDriver {
    async fn goto(&self, url: &str) -> Result<Option<u16>> {
        let page = self.page.lock().await;
        let response = page
            .goto_builder(url)
            .goto()
            .await
            .with_context(|| format!("Failed to navigate to {}", url))?;
        *self.last_url.lock().await = url.to_string();

        match response {
            Some(response) => {
                let status = response.status()?;
                log::debug!("navigated to {} (status {})", url, status);
                Ok(u16::try_from(status).ok())
            }
            None => Ok(None),
        }
    }

    async fn wait_for_network_idle(&self) -> Result<()> {
        let last = AtomicI64::new(-1);
        let poll = PollConfig {
            timeout_ms: self.config.network_idle_timeout_ms,
            initial_interval_ms: self.config.network_quiet_ms,
            max_interval_ms: self.config.network_quiet_ms,
            use_exponential_backoff: false,
        };

        // Idle once the document is complete and no new resource entries
        // appeared during one quiet interval.
        let idle = wait_until(
            || async {
                let progress = self.load_progress().await;
                let previous = last.swap(progress, Ordering::SeqCst);
                progress >= 0 && progress == previous
            },
            poll,
        )
        .await;

        if !idle {
            log::warn!(
                "network did not settle within {}ms, proceeding",
                self.config.network_idle_timeout_ms
            );
        }
        Ok(())
    }

    async fn wait_for_timeout(&self, ms: u64) -> Result<()> {
        tokio::time::sleep(tokio::time::Duration::from_millis(ms)).await;
        Ok(())
    }

    async fn count(&self, selector: &Selector) -> Result<usize> {
        let page = self.page.lock().await;
        let sel = selector_to_playwright(selector);
        let elements = page.query_selector_all(&sel).await?;
        Ok(elements.len())
    }

    async fn click(&self, selector: &Selector, nth: usize) -> Result<()> {
        let sel = selector_to_playwright(selector);
        match self.nth_element(selector, nth).await? {
            Some(el) => {
                if let Err(e) = el.click_builder().click().await {
                    println!(
                        "{} Click failed for selector '{}': {:?}",
                        "❌".red(),
                        sel,
                        e
                    );
                    return Err(anyhow::anyhow!("Failed to click: {}. Error: {:?}", sel, e));
                }
                Ok(())
            }
            None => anyhow::bail!("Element not found: {} at index {}", sel, nth),
        }
    }

    async fn fill(&self, selector: &Selector, text: &str) -> Result<()> {
        match self.nth_element(selector, 0).await? {
            Some(el) => {
                el.fill_builder(text).fill().await?;
                Ok(())
            }
            None => anyhow::bail!("Element not found: {}", selector_to_playwright(selector)),
        }
    }

    async fn text_content(&self, selector: &Selector, nth: usize) -> Result<Option<String>> {
        match self.nth_element(selector, nth).await? {
            Some(el) => Ok(Some(el.text_content().await?.unwrap_or_default())),
            None => Ok(None),
        }
    }

    async fn get_attribute(&self, selector: &Selector, name: &str) -> Result<Option<String>> {
        match self.nth_element(selector, 0).await? {
            Some(el) => Ok(el.get_attribute(name).await?),
            None => Ok(None),
        }
    }

    async fn texts(&self, selector: &Selector) -> Result<Vec<String>> {
        let page = self.page.lock().await;
        let sel = selector_to_playwright(selector);
        let elements = page.query_selector_all(&sel).await?;

        let mut texts = Vec::with_capacity(elements.len());
        for el in &elements {
            texts.push(el.text_content().await?.unwrap_or_default());
        }
        Ok(texts)
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        let page = self.page.lock().await;
        page.keyboard.down(key).await?;
        page.keyboard.up(key).await?;
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        let page = self.page.lock().await;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        page.screenshot_builder()
            .path(path.to_path_buf())
            .screenshot()
            .await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let read = retry_with_recovery(
            URL_READ_ATTEMPTS,
            || self.read_location(),
            || self.wait_for_network_idle(),
        )
        .await;

        let mut last = self.last_url.lock().await;
        match read {
            Ok(url) => {
                *last = url.clone();
                Ok(url)
            }
            Err(e) => {
                log::warn!("could not read page URL ({:#}), using last known {}", e, *last);
                Ok(last.clone())
            }
        }
    }

    async fn content(&self) -> Result<String> {
        let page = self.page.lock().await;
        let html = page.content().await?;
        Ok(html)
    }

    async fn close(&self) -> Result<()> {
        self.browser
            .close()
            .await
            .context("Failed to close browser")?;
        log::info!("browser closed");
        Ok(())
    }
}

/// Convert a Selector to a Playwright selector string
pub fn selector_to_playwright(selector: &Selector) -> String {
    match selector {
        Selector::Css(css) => css.clone(),
        Selector::Text(text) => format!("text={}", text),
        Selector::Id(id) => format!("#{}", id),
        Selector::IdPrefix(prefix) => format!("[id^=\"{}\"]", escape_quotes(prefix)),
        Selector::Role(role) => format!("[role=\"{}\"]", escape_quotes(role)),
        Selector::HasText { css, text } => {
            format!("{}:has-text(\"{}\")", css, escape_quotes(text))
        }
        Selector::Within { parent, child } => format!(
            "{} >> {}",
            selector_to_playwright(parent),
            selector_to_playwright(child)
        ),
        Selector::AnyOf(members) => members
            .iter()
            .map(selector_to_playwright)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn escape_quotes(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Launch a new Chromium browser, preferring an installed system browser
async fn launch_chromium_browser(
    chromium: &playwright::api::BrowserType,
    config: &WebDriverConfig,
) -> Result<playwright::api::Browser> {
    let mut launcher = chromium.launcher();
    launcher = launcher.headless(config.headless);

    let env_path = std::env::var("PLAYWRIGHT_CHROMIUM_EXECUTABLE_PATH")
        .ok()
        .map(std::path::PathBuf::from);
    let system_path = find_system_browser();

    if let Some(ref path) = env_path {
        println!("{} Using browser from env: {}", "🌐".blue(), path.display());
        launcher = launcher.executable(path);
    } else if let Some(ref path) = system_path {
        println!(
            "{} Using discovered browser: {}",
            "🌐".blue(),
            path.display()
        );
        launcher = launcher.executable(path);
    } else {
        log::info!("no browser executable found, using Playwright's bundled Chromium");
    }

    let args: Vec<String> = [
        "--no-sandbox",
        "--disable-setuid-sandbox",
        "--disable-dev-shm-usage",
        "--disable-gpu",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    launcher = launcher.args(&args);

    Ok(launcher.launch().await?)
}

fn find_system_browser() -> Option<std::path::PathBuf> {
    let common_paths = [
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
    ];

    common_paths
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .map(Path::to_path_buf)
}
