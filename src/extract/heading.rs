use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::title_case;

static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static AUTHOR_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h6.author a").unwrap());

/// First heading's text, normalized.
pub fn title(doc: &Html) -> Option<String> {
    let text = doc.select(&H1).next()?.text().collect::<String>();
    let normalized = title_case(&text);
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// First link in the author byline: (name, href). Accepted only when the
/// href carries an author id (`aid=`); anything else drops both fields.
pub fn author(doc: &Html) -> Option<(String, String)> {
    let a = doc.select(&AUTHOR_LINK).next()?;
    let href = a.value().attr("href")?;
    if !href.contains("aid=") {
        return None;
    }
    let name = title_case(&a.text().collect::<String>());
    Some((name, href.to_string()))
}

// ── Tests ──
