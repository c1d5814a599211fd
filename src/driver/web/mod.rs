pub mod driver;

pub use driver::{selector_to_playwright, BrowserType, WebDriver, WebDriverConfig};
