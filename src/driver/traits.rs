use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

/// Element selector for UI elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Raw CSS selector, passed through untouched
    Css(String),
    /// Case-insensitive substring match on visible text
    Text(String),
    /// Select by element ID
    Id(String),
    /// Select elements whose ID starts with the given prefix
    IdPrefix(String),
    /// Select by ARIA role
    Role(String),
    /// CSS selector narrowed to elements containing the given text
    HasText { css: String, text: String },
    /// Element matched by `child` inside the element matched by `parent`
    Within {
        parent: Box<Selector>,
        child: Box<Selector>,
    },
    /// Union of CSS-compatible selectors (matches any of them)
    ///
    /// `Text` and `Within` members are not CSS and cannot be unioned.
    AnyOf(Vec<Selector>),
}

impl Selector {
    pub fn css(css: &str) -> Self {
        Selector::Css(css.to_string())
    }

    pub fn text(text: &str) -> Self {
        Selector::Text(text.to_string())
    }

    pub fn id(id: &str) -> Self {
        Selector::Id(id.to_string())
    }

    pub fn id_prefix(prefix: &str) -> Self {
        Selector::IdPrefix(prefix.to_string())
    }

    pub fn role(role: &str) -> Self {
        Selector::Role(role.to_string())
    }

    pub fn has_text(css: &str, text: &str) -> Self {
        Selector::HasText {
            css: css.to_string(),
            text: text.to_string(),
        }
    }

    pub fn within(parent: Selector, child: Selector) -> Self {
        Selector::Within {
            parent: Box::new(parent),
            child: Box::new(child),
        }
    }
}

/// Ordered list of candidate selectors.
///
/// Candidates are tried in order and the first one matching at least one
/// element wins. Absence is reported as `Ok(None)`, never as an error, so
/// callers can branch on it.
#[derive(Debug, Clone)]
pub struct Locator {
    candidates: Vec<Selector>,
}

impl Locator {
    pub fn new(first: Selector) -> Self {
        Self {
            candidates: vec![first],
        }
    }

    /// Append a fallback candidate
    pub fn or(mut self, next: Selector) -> Self {
        self.candidates.push(next);
        self
    }

    /// First candidate matching at least one element on the current page
    pub async fn resolve(&self, driver: &dyn PageDriver) -> Result<Option<Selector>> {
        for selector in &self.candidates {
            if driver.count(selector).await? > 0 {
                return Ok(Some(selector.clone()));
            }
            log::debug!("locator candidate {:?} matched nothing", selector);
        }
        Ok(None)
    }
}

/// Browser page interface consumed by the harness
///
/// Every element operation addresses the `nth` match (0-based) of a selector;
/// callers check `count` first when absence is a valid state. Implementations
/// must not retry actions on their own.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to an absolute URL, returning the main response status if any
    async fn goto(&self, url: &str) -> Result<Option<u16>>;

    /// Wait until the page stops loading, bounded by an internal budget
    ///
    /// Hitting the budget is not an error.
    async fn wait_for_network_idle(&self) -> Result<()>;

    /// Fixed settle delay
    async fn wait_for_timeout(&self, ms: u64) -> Result<()>;

    /// Number of elements currently matching the selector
    async fn count(&self, selector: &Selector) -> Result<usize>;

    /// Click the nth match
    async fn click(&self, selector: &Selector, nth: usize) -> Result<()>;

    /// Fill the first match with text
    async fn fill(&self, selector: &Selector, text: &str) -> Result<()>;

    /// Text content of the nth match, `None` if it does not exist
    async fn text_content(&self, selector: &Selector, nth: usize) -> Result<Option<String>>;

    /// Attribute of the first match, `None` if element or attribute is missing
    async fn get_attribute(&self, selector: &Selector, name: &str) -> Result<Option<String>>;

    /// Text content of every match, in document order
    async fn texts(&self, selector: &Selector) -> Result<Vec<String>>;

    /// Press and release a keyboard key (e.g. "Escape")
    async fn press_key(&self, key: &str) -> Result<()>;

    /// Capture the viewport to a PNG file
    async fn screenshot(&self, path: &Path) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    /// Serialized HTML of the current document
    async fn content(&self) -> Result<String>;

    /// Release the browser
    async fn close(&self) -> Result<()>;
}
