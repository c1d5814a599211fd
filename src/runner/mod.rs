pub mod auth;
pub mod context;
pub mod scenarios;
pub mod state;

use anyhow::Result;
use colored::Colorize;
use std::sync::Arc;

pub use context::RunContext;
pub use state::*;

use crate::driver::traits::PageDriver;
use crate::utils::config::HarnessConfig;

const ERROR_SHOT: &str = "e2e_error.png";

/// Result of one pass over the suite
pub struct SuiteOutcome {
    pub ledger: ResultLedger,
    pub authenticated: bool,
    /// The fault that stopped the run early, if any
    pub error: Option<anyhow::Error>,
}

/// Log in, then run every check in order.
///
/// Never fails: the first error aborts the remaining checks, is printed with a
/// diagnostic screenshot, and whatever was recorded so far is returned.
pub async fn run_suite(
    driver: &dyn PageDriver,
    config: &HarnessConfig,
    ledger: ResultLedger,
) -> SuiteOutcome {
    let mut ctx = RunContext::new(driver, config, ledger);
    let mut authenticated = false;

    let error = match run_checks(&mut ctx, &mut authenticated).await {
        Ok(()) => None,
        Err(e) => {
            println!("{} Test Error: {:#}", "❌".red(), e);
            log::error!("run aborted: {:?}", e);
            ctx.snapshot(ERROR_SHOT).await;
            Some(e)
        }
    };

    SuiteOutcome {
        ledger: ctx.ledger,
        authenticated,
        error,
    }
}

/// Run the suite on its own task, then close the browser.
///
/// The browser is released even when the suite task panics; the outcome then
/// carries the panic as its error and an empty ledger.
pub async fn run_and_close(
    driver: Arc<dyn PageDriver>,
    config: HarnessConfig,
    ledger: ResultLedger,
) -> SuiteOutcome {
    let task_driver = Arc::clone(&driver);
    let task = tokio::spawn(async move { run_suite(task_driver.as_ref(), &config, ledger).await });

    let outcome = match task.await {
        Ok(outcome) => outcome,
        Err(e) => {
            println!("{} Test Error: {}", "❌".red(), e);
            SuiteOutcome {
                ledger: ResultLedger::quiet(),
                authenticated: false,
                error: Some(anyhow::anyhow!("suite task failed: {}", e)),
            }
        }
    };

    if let Err(e) = driver.close().await {
        log::warn!("failed to close browser: {:#}", e);
    }
    outcome
}

async fn run_checks(ctx: &mut RunContext<'_>, authenticated: &mut bool) -> Result<()> {
    *authenticated = auth::login(ctx).await?;
    if !*authenticated {
        println!("{} Running tests without authentication...", "⚠️".yellow());
        println!();
    }

    scenarios::navigation_link_removed(ctx).await?;
    scenarios::groups_route_404(ctx).await?;
    let community_opened = scenarios::community_page_has_groups(ctx).await?;
    log::debug!("community page opened: {}", community_opened);
    scenarios::create_group_dialog(ctx).await?;
    scenarios::group_detail_breadcrumb(ctx).await?;
    Ok(())
}
