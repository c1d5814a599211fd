use anyhow::Result;
use colored::Colorize;

use super::state::ResultLedger;
use crate::driver::traits::PageDriver;
use crate::utils::config::HarnessConfig;

/// Everything a check needs: the page, the configuration and the ledger
///
/// The page is shared across checks; a check may rely on where the previous
/// one left it.
pub struct RunContext<'a> {
    pub driver: &'a dyn PageDriver,
    pub config: &'a HarnessConfig,
    pub ledger: ResultLedger,
}

impl<'a> RunContext<'a> {
    pub fn new(driver: &'a dyn PageDriver, config: &'a HarnessConfig, ledger: ResultLedger) -> Self {
        Self {
            driver,
            config,
            ledger,
        }
    }

    /// Absolute URL for a route below the configured locale
    pub fn url(&self, path: &str) -> String {
        self.config.localized_url(path)
    }

    /// Navigate and wait for the network to go quiet
    pub async fn open(&self, path: &str) -> Result<Option<u16>> {
        let status = self.driver.goto(&self.url(path)).await?;
        self.driver.wait_for_network_idle().await?;
        Ok(status)
    }

    /// Network idle followed by a fixed hydration delay
    pub async fn settle(&self, ms: u64) -> Result<()> {
        self.driver.wait_for_network_idle().await?;
        self.driver.wait_for_timeout(ms).await
    }

    /// Diagnostic screenshot; failures are logged and otherwise ignored
    pub async fn snapshot(&self, file_name: &str) {
        let path = self.config.artifact_path(file_name);
        match self.driver.screenshot(&path).await {
            Ok(()) => log::info!("screenshot saved to {}", path.display()),
            Err(e) => println!(
                "   {} Could not save screenshot {}: {}",
                "⚠️".yellow(),
                path.display(),
                e
            ),
        }
    }

    pub fn record(&mut self, name: &str, passed: bool, detail: impl Into<String>) {
        self.ledger.record(name, passed, detail);
    }
}
