//! The five group-migration checks, run in order against one shared page.
//!
//! Each check records one or more results. `create_group_dialog` relies on
//! `community_page_has_groups` having left a community page open; the others
//! navigate to a known starting point first.

use anyhow::Result;

use super::context::RunContext;
use crate::driver::common::{normalize_whitespace, truncate_chars};
use crate::driver::traits::Selector;
use crate::utils::config::SUPPORTED_LOCALES;

const COMMUNITIES_ROUTE: &str = "/communities";
const GROUPS_ROUTE: &str = "/groups";

const DETAIL_SETTLE_MS: u64 = 1000;
const DIALOG_SETTLE_MS: u64 = 500;
const DISMISS_SETTLE_MS: u64 = 300;
const BREADCRUMB_NAV_SETTLE_MS: u64 = 1000;
const BREADCRUMB_DETAIL_CHARS: usize = 80;

const GROUPS_LABEL: &str = "Gruppen";
const CREATE_GROUP_LABEL: &str = "Gruppe erstellen";
const COMMUNITIES_LABEL: &str = "Gemeinschaften";
const NO_COMMUNITY_ERROR: &str = "keiner Gemeinschaft beigetreten";
const SUBMIT_LABEL: &str = "Erstellen";
const MEMBER_MARKER: &str = "Mitglied";
const COMMUNITY_MARKER: &str = "Gemeinschaft";
const NOT_FOUND_MARKER: &str = "404";

const COMMUNITIES_SHOT: &str = "e2e_communities.png";
const COMMUNITY_DETAIL_SHOT: &str = "e2e_community_detail.png";
const CREATE_DIALOG_SHOT: &str = "e2e_create_dialog.png";
const GROUP_DETAIL_SHOT: &str = "e2e_group_detail.png";

fn community_card() -> Selector {
    Selector::id_prefix("community-")
}

fn create_group_button() -> Selector {
    Selector::text(CREATE_GROUP_LABEL)
}

fn breadcrumb() -> Selector {
    Selector::css("nav[aria-label='breadcrumb']")
}

/// Header links pointing at the retired groups route, in any locale
pub fn groups_nav_links() -> Selector {
    let hrefs = std::iter::once(GROUPS_ROUTE.to_string())
        .chain(SUPPORTED_LOCALES.iter().map(|l| format!("/{}{}", l, GROUPS_ROUTE)));
    Selector::AnyOf(
        hrefs
            .map(|href| Selector::Css(format!("header a[href='{}']", href)))
            .collect(),
    )
}

/// Server-level 404 or a client-rendered not-found page
pub fn is_not_found(status: Option<u16>, content: &str) -> bool {
    status == Some(404) || content.contains(NOT_FOUND_MARKER)
}

/// What the create-group dialog showed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogVerdict {
    pub shows_error: bool,
    pub shows_form: bool,
}

impl DialogVerdict {
    /// The membership error wins over anything form-like
    pub fn passed(&self) -> bool {
        self.shows_form && !self.shows_error
    }
}

pub fn dialog_verdict(dialog_text: &str) -> DialogVerdict {
    DialogVerdict {
        shows_error: dialog_text.contains(NO_COMMUNITY_ERROR),
        shows_form: dialog_text.to_lowercase().contains("name")
            && dialog_text.contains(SUBMIT_LABEL),
    }
}

/// Group cards mention members; community cards also say "Gemeinschaft"
pub fn is_group_card(text: &str) -> bool {
    text.contains(MEMBER_MARKER) && !text.contains(COMMUNITY_MARKER)
}

pub fn is_communities_url(url: &str) -> bool {
    url.ends_with(COMMUNITIES_ROUTE) || url.contains("/communities?")
}

/// 1. The header no longer links to the groups route
pub async fn navigation_link_removed(ctx: &mut RunContext<'_>) -> Result<()> {
    ctx.open(COMMUNITIES_ROUTE).await?;

    let links = ctx.driver.count(&groups_nav_links()).await?;
    let detail = if links == 0 {
        String::new()
    } else {
        format!("Found {} link(s) to /groups in header", links)
    };
    ctx.record("Navigation: /groups link removed", links == 0, detail);
    Ok(())
}

/// 2. The groups route itself is gone
pub async fn groups_route_404(ctx: &mut RunContext<'_>) -> Result<()> {
    let status = ctx.open(GROUPS_ROUTE).await?;
    let content = ctx.driver.content().await?;

    let status_text = status.map_or_else(|| "none".to_string(), |s| s.to_string());
    ctx.record(
        "/groups returns 404",
        is_not_found(status, &content),
        format!("Status: {}", status_text),
    );
    Ok(())
}

/// 3. A community page embeds the groups section.
///
/// Leaves the first community's page open for the dialog check.
pub async fn community_page_has_groups(ctx: &mut RunContext<'_>) -> Result<bool> {
    ctx.open(COMMUNITIES_ROUTE).await?;
    ctx.snapshot(COMMUNITIES_SHOT).await;

    if ctx.driver.count(&community_card()).await? == 0 {
        ctx.record("Community page", false, "No community found");
        return Ok(false);
    }

    ctx.driver.click(&community_card(), 0).await?;
    ctx.settle(DETAIL_SETTLE_MS).await?;
    ctx.snapshot(COMMUNITY_DETAIL_SHOT).await;

    let content = ctx.driver.content().await?;
    ctx.record(
        "Community page has groups section",
        content.contains(GROUPS_LABEL),
        "",
    );

    let has_create_button = ctx.driver.count(&create_group_button()).await? > 0;
    ctx.record("'Gruppe erstellen' button present", has_create_button, "");
    Ok(true)
}

/// 4. The create-group dialog shows a form, not the "no community" error
pub async fn create_group_dialog(ctx: &mut RunContext<'_>) -> Result<()> {
    let button = create_group_button();
    if ctx.driver.count(&button).await? == 0 {
        ctx.record("CreateGroupDialog test", false, "Button not found");
        return Ok(());
    }

    ctx.driver.click(&button, 0).await?;
    ctx.driver.wait_for_timeout(DIALOG_SETTLE_MS).await?;
    ctx.snapshot(CREATE_DIALOG_SHOT).await;

    let dialog = Selector::role("dialog");
    let dialog_text = ctx
        .driver
        .text_content(&dialog, 0)
        .await?
        .unwrap_or_default();

    let verdict = dialog_verdict(&dialog_text);
    ctx.record(
        "CreateGroupDialog shows form",
        verdict.passed(),
        format!(
            "Error shown: {}, Form: {}",
            verdict.shows_error, verdict.shows_form
        ),
    );

    ctx.driver.press_key("Escape").await?;
    ctx.driver.wait_for_timeout(DISMISS_SETTLE_MS).await?;
    Ok(())
}

/// 5. A group page has breadcrumbs leading back to the communities listing
pub async fn group_detail_breadcrumb(ctx: &mut RunContext<'_>) -> Result<()> {
    ctx.open(COMMUNITIES_ROUTE).await?;

    if ctx.driver.count(&community_card()).await? == 0 {
        ctx.record("Group detail test", false, "No community found");
        return Ok(());
    }

    ctx.driver.click(&community_card(), 0).await?;
    ctx.settle(DETAIL_SETTLE_MS).await?;

    let cards = Selector::role("button");
    let texts = ctx.driver.texts(&cards).await?;
    let Some(index) = texts.iter().position(|text| is_group_card(text)) else {
        ctx.record("Group detail test", false, "No group to click found");
        return Ok(());
    };

    ctx.driver.click(&cards, index).await?;
    ctx.settle(DETAIL_SETTLE_MS).await?;
    ctx.snapshot(GROUP_DETAIL_SHOT).await;

    if ctx.driver.count(&breadcrumb()).await? == 0 {
        ctx.record("Breadcrumb present", false, "");
        return Ok(());
    }

    let trail = ctx
        .driver
        .text_content(&breadcrumb(), 0)
        .await?
        .unwrap_or_default();
    let trail = normalize_whitespace(&trail);
    ctx.record(
        "Breadcrumb present",
        true,
        format!("Text: {}", truncate_chars(&trail, BREADCRUMB_DETAIL_CHARS)),
    );
    ctx.record(
        "Breadcrumb contains 'Gemeinschaften'",
        trail.contains(COMMUNITIES_LABEL),
        "",
    );

    let link = Selector::within(breadcrumb(), Selector::has_text("a", COMMUNITIES_LABEL));
    if ctx.driver.count(&link).await? == 0 {
        log::info!("no communities link inside breadcrumb, skipping navigation check");
        return Ok(());
    }

    let href = ctx.driver.get_attribute(&link, "href").await?;
    println!(
        "   Clicking breadcrumb link: href={}",
        href.as_deref().unwrap_or("none")
    );
    ctx.driver.click(&link, 0).await?;
    ctx.driver.wait_for_timeout(BREADCRUMB_NAV_SETTLE_MS).await?;
    ctx.driver.wait_for_network_idle().await?;

    let url = ctx.driver.current_url().await?;
    ctx.record(
        "Breadcrumb navigation works",
        is_communities_url(&url),
        format!("URL: {}", url),
    );
    Ok(())
}
