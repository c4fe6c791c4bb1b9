use std::sync::LazyLock;
use std::time::Duration;

use anyhow::Result;
use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::browser::BrowserAgent;

/// Catalog entry point: the full title listing, first page.
pub const CATALOG_URL: &str =
    "https://www.teachingbooks.net/tb.cgi?keywordType1=title&adv=title&go=1";

/// Pagination "next" lives in the last page item; its screen-reader label is
/// the only termination signal the markup offers.
const NEXT_SELECTOR: &str = "li.page-item span.sr-only";
const CARD_SELECTOR: &str = "div.book--card-contain";
const CARD_WAIT: Duration = Duration::from_secs(10);
/// Safety cap in case the end-of-catalog signal ever goes flaky.
const MAX_PAGES: usize = 10_000;

static CARD: LazyLock<Selector> = LazyLock::new(|| Selector::parse(CARD_SELECTOR).unwrap());
static CARD_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static PAGE_ITEM: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li.page-item").unwrap());
static SR_ONLY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span.sr-only").unwrap());

/// Opaque pagination signal parsed from a listing page.
#[derive(Debug, PartialEq, Eq)]
pub enum Cursor {
    Next,
    End,
}

/// Walk the paginated catalog and collect every book card's detail-page
/// link, in discovery order. Duplicates across pages are kept; dedup happens
/// downstream. Cards that never render, a missing pagination control, or a
/// failed next-page click all end the walk cleanly instead of erroring.
pub async fn discover_references<B: BrowserAgent>(
    agent: &mut B,
    settle: Duration,
) -> Result<Vec<String>> {
    agent.goto(CATALOG_URL).await?;
    let mut links: Vec<String> = Vec::new();

    for page_no in 1..=MAX_PAGES {
        if let Err(e) = agent.wait_for(CARD_SELECTOR, CARD_WAIT).await {
            warn!("catalog page {page_no}: cards never rendered ({e}); stopping");
            break;
        }
        let html = agent.content().await?;

        let cursor = {
            let doc = Html::parse_document(&html);
            let before = links.len();
            collect_card_links(&doc, &mut links);
            info!(
                "catalog page {page_no}: {} book urls ({} total)",
                links.len() - before,
                links.len()
            );
            pagination_cursor(&doc)
        };

        match cursor {
            Cursor::Next => {
                if let Err(e) = agent.click_last(NEXT_SELECTOR).await {
                    warn!("catalog page {page_no}: next-page click failed ({e}); stopping");
                    break;
                }
                tokio::time::sleep(settle).await;
            }
            Cursor::End => break,
        }
    }

    Ok(links)
}

/// Each card's first link. A card without one is logged and skipped, never
/// fatal.
fn collect_card_links(doc: &Html, links: &mut Vec<String>) {
    for card in doc.select(&CARD) {
        match card
            .select(&CARD_LINK)
            .next()
            .and_then(|a| a.value().attr("href"))
        {
            Some(href) => links.push(href.to_string()),
            None => warn!("book card without a link; skipping"),
        }
    }
}

/// End-of-catalog detection: more pages remain while the last page item's
/// screen-reader label reads "Next Page". A missing control is the end, not
/// an error.
pub fn pagination_cursor(doc: &Html) -> Cursor {
    let Some(last_item) = doc.select(&PAGE_ITEM).last() else {
        return Cursor::End;
    };
    let Some(label) = last_item.select(&SR_ONLY).next() else {
        return Cursor::End;
    };
    let text = label.text().collect::<String>();
    if text.contains("Next Page") {
        Cursor::Next
    } else {
        Cursor::End
    }
}

// ── Tests ──
