//! Scripted in-memory page for unit tests
//!
//! Pages are keyed by absolute URL and elements by their Playwright selector
//! string, so a test registers exactly the selectors the code under test asks for.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::traits::{PageDriver, Selector};
use super::web::selector_to_playwright;

#[derive(Debug, Clone, Default)]
pub struct MockElement {
    pub text: String,
    pub attrs: HashMap<String, String>,
}

impl MockElement {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            attrs: HashMap::new(),
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockView {
    elements: HashMap<String, Vec<MockElement>>,
    content: String,
}

impl MockView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, html: &str) -> Self {
        self.content = html.to_string();
        self
    }

    pub fn element(self, selector: &Selector, text: &str) -> Self {
        self.element_with(selector, MockElement::new(text))
    }

    pub fn element_with(mut self, selector: &Selector, element: MockElement) -> Self {
        self.elements
            .entry(selector_to_playwright(selector))
            .or_default()
            .push(element);
        self
    }
}

/// What happens when a scripted element is clicked
#[derive(Debug, Clone)]
pub enum ClickEffect {
    /// Browser ends up on another URL (no response status)
    Navigate(String),
    /// The clicked element's attribute changes
    SetAttribute { name: String, value: String },
    /// A new element appears on the current page
    Reveal { selector: Selector, text: String },
}

#[derive(Default)]
struct MockState {
    url: String,
    views: HashMap<String, MockView>,
    statuses: HashMap<String, u16>,
    clicks: HashMap<(String, usize), Vec<ClickEffect>>,
    failing: Option<String>,
    panicking: Option<String>,
    redirects: HashMap<String, String>,
    calls: Vec<String>,
    pressed: Vec<String>,
    filled: Vec<(String, String)>,
    screenshots: Vec<PathBuf>,
}

impl MockState {
    fn view(&mut self) -> &mut MockView {
        let url = self.url.clone();
        self.views.entry(url).or_default()
    }

    fn check_failing(&self, sel: &str) -> Result<()> {
        if self.failing.as_deref() == Some(sel) {
            anyhow::bail!("scripted failure for {}", sel);
        }
        Ok(())
    }
}

pub struct MockPage {
    state: Mutex<MockState>,
}

impl MockPage {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
        }
    }

    pub fn view(self, url: &str, view: MockView) -> Self {
        self.state
            .lock()
            .unwrap()
            .views
            .insert(url.to_string(), view);
        self
    }

    pub fn status(self, url: &str, status: u16) -> Self {
        self.state
            .lock()
            .unwrap()
            .statuses
            .insert(url.to_string(), status);
        self
    }

    pub fn on_click(self, selector: &Selector, nth: usize, effect: ClickEffect) -> Self {
        self.state
            .lock()
            .unwrap()
            .clicks
            .entry((selector_to_playwright(selector), nth))
            .or_default()
            .push(effect);
        self
    }

    /// Every operation on this selector returns an error
    pub fn failing(self, selector: &Selector) -> Self {
        self.state.lock().unwrap().failing = Some(selector_to_playwright(selector));
        self
    }

    /// Any operation on this selector panics
    pub fn panicking(self, selector: &Selector) -> Self {
        self.state.lock().unwrap().panicking = Some(selector_to_playwright(selector));
        self
    }

    /// Navigating to `from` lands on `to`
    pub fn redirect(self, from: &str, to: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .redirects
            .insert(from.to_string(), to.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn pressed_keys(&self) -> Vec<String> {
        self.state.lock().unwrap().pressed.clone()
    }

    pub fn filled(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().filled.clone()
    }

    pub fn screenshots(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().screenshots.clone()
    }

    pub fn url(&self) -> String {
        self.state.lock().unwrap().url.clone()
    }

    fn log(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }

    /// Panics outside the state lock so the page stays usable afterwards
    fn maybe_panic(&self, sel: &str) {
        let panics = self.state.lock().unwrap().panicking.as_deref() == Some(sel);
        if panics {
            panic!("scripted panic for {}", sel);
        }
    }
}

#[async_trait]
impl PageDriver for MockPage {
    async fn goto(&self, url: &str) -> Result<Option<u16>> {
        self.log(format!("goto {}", url));
        let mut state = self.state.lock().unwrap();
        state.url = state
            .redirects
            .get(url)
            .cloned()
            .unwrap_or_else(|| url.to_string());
        Ok(Some(state.statuses.get(url).copied().unwrap_or(200)))
    }

    async fn wait_for_network_idle(&self) -> Result<()> {
        self.log("wait_for_network_idle".to_string());
        Ok(())
    }

    async fn wait_for_timeout(&self, ms: u64) -> Result<()> {
        self.log(format!("wait_for_timeout {}", ms));
        Ok(())
    }

    async fn count(&self, selector: &Selector) -> Result<usize> {
        let sel = selector_to_playwright(selector);
        self.log(format!("count {}", sel));
        self.maybe_panic(&sel);
        let mut state = self.state.lock().unwrap();
        state.check_failing(&sel)?;
        Ok(state.view().elements.get(&sel).map_or(0, Vec::len))
    }

    async fn click(&self, selector: &Selector, nth: usize) -> Result<()> {
        let sel = selector_to_playwright(selector);
        self.log(format!("click {} [{}]", sel, nth));
        let mut state = self.state.lock().unwrap();
        state.check_failing(&sel)?;

        let exists = state
            .view()
            .elements
            .get(&sel)
            .map_or(false, |els| nth < els.len());
        if !exists {
            anyhow::bail!("Element not found: {} at index {}", sel, nth);
        }

        let effects = state
            .clicks
            .get(&(sel.clone(), nth))
            .cloned()
            .unwrap_or_default();
        for effect in effects {
            match effect {
                ClickEffect::Navigate(url) => state.url = url,
                ClickEffect::SetAttribute { name, value } => {
                    if let Some(el) = state
                        .view()
                        .elements
                        .get_mut(&sel)
                        .and_then(|els| els.get_mut(nth))
                    {
                        el.attrs.insert(name, value);
                    }
                }
                ClickEffect::Reveal { selector, text } => {
                    state
                        .view()
                        .elements
                        .entry(selector_to_playwright(&selector))
                        .or_default()
                        .push(MockElement::new(&text));
                }
            }
        }
        Ok(())
    }

    async fn fill(&self, selector: &Selector, text: &str) -> Result<()> {
        let sel = selector_to_playwright(selector);
        self.log(format!("fill {}", sel));
        let mut state = self.state.lock().unwrap();
        state.check_failing(&sel)?;
        state.filled.push((sel, text.to_string()));
        Ok(())
    }

    async fn text_content(&self, selector: &Selector, nth: usize) -> Result<Option<String>> {
        let sel = selector_to_playwright(selector);
        self.log(format!("text_content {} [{}]", sel, nth));
        let mut state = self.state.lock().unwrap();
        state.check_failing(&sel)?;
        Ok(state
            .view()
            .elements
            .get(&sel)
            .and_then(|els| els.get(nth))
            .map(|el| el.text.clone()))
    }

    async fn get_attribute(&self, selector: &Selector, name: &str) -> Result<Option<String>> {
        let sel = selector_to_playwright(selector);
        self.log(format!("get_attribute {} {}", sel, name));
        let mut state = self.state.lock().unwrap();
        state.check_failing(&sel)?;
        Ok(state
            .view()
            .elements
            .get(&sel)
            .and_then(|els| els.first())
            .and_then(|el| el.attrs.get(name).cloned()))
    }

    async fn texts(&self, selector: &Selector) -> Result<Vec<String>> {
        let sel = selector_to_playwright(selector);
        self.log(format!("texts {}", sel));
        let mut state = self.state.lock().unwrap();
        state.check_failing(&sel)?;
        Ok(state
            .view()
            .elements
            .get(&sel)
            .map(|els| els.iter().map(|el| el.text.clone()).collect())
            .unwrap_or_default())
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        self.log(format!("press_key {}", key));
        self.state.lock().unwrap().pressed.push(key.to_string());
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        self.log(format!("screenshot {}", path.display()));
        self.state
            .lock()
            .unwrap()
            .screenshots
            .push(path.to_path_buf());
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        self.log("current_url".to_string());
        Ok(self.url())
    }

    async fn content(&self) -> Result<String> {
        self.log("content".to_string());
        let mut state = self.state.lock().unwrap();
        Ok(state.view().content.clone())
    }

    async fn close(&self) -> Result<()> {
        self.log("close".to_string());
        Ok(())
    }
}
