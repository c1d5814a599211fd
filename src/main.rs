use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use groups_e2e::driver::web::WebDriver;
use groups_e2e::report::{self, console};
use groups_e2e::runner::{self, ResultLedger, SuiteOutcome};
use groups_e2e::utils::config::{parse_browser, Credentials, HarnessConfig};

#[derive(Parser)]
#[command(name = "groups-e2e")]
#[command(version)]
#[command(about = "Browser checks for group management under community pages", long_about = None)]
struct Cli {
    /// Origin of the application under test
    #[arg(long, env = "BASE_URL", default_value = "http://localhost:3000")]
    base_url: String,

    /// Test account email; without it only the signed-out checks are meaningful
    #[arg(long, env = "TEST_USER_EMAIL")]
    email: Option<String>,

    /// Test account password
    #[arg(long, env = "TEST_USER_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Locale path segment (de, fr)
    #[arg(long, env = "E2E_LOCALE", default_value = "de")]
    locale: String,

    /// Browser engine (chromium, firefox, webkit)
    #[arg(long, env = "E2E_BROWSER", default_value = "chromium")]
    browser: String,

    /// Show the browser window instead of running headless
    #[arg(long, env = "E2E_HEADED")]
    headed: bool,

    /// Directory for diagnostic screenshots
    #[arg(long, env = "E2E_ARTIFACTS_DIR", default_value = "/tmp")]
    artifacts_dir: PathBuf,

    /// Also write test-results.json and junit.xml here
    #[arg(long, env = "E2E_REPORT_DIR")]
    report_dir: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<HarnessConfig> {
        let credentials = Credentials::from_parts(self.email, self.password);
        let mut config = HarnessConfig::new(
            &self.base_url,
            &self.locale,
            credentials,
            &self.artifacts_dir,
        )?;
        config.report_dir = self.report_dir;
        config.browser.browser_type = parse_browser(&self.browser)?;
        config.browser.headless = !self.headed;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Cli::parse().into_config()?;
    console::print_banner(&config);

    let session_id = Uuid::new_v4().to_string();
    let outcome = match WebDriver::new(config.browser.clone()).await {
        Ok(driver) => {
            runner::run_and_close(Arc::new(driver), config.clone(), ResultLedger::new()).await
        }
        Err(e) => {
            println!("{} Could not start browser: {:#}", "❌".red(), e);
            SuiteOutcome {
                ledger: ResultLedger::new(),
                authenticated: false,
                error: Some(e),
            }
        }
    };

    let code = report::emit(&session_id, &outcome, &config);
    std::process::exit(code);
}
