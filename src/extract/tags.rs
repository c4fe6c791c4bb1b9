use std::sync::LazyLock;

use scraper::{Html, Selector};

static RESOURCE_TAGS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.open-resources").unwrap());

/// Scan the tagged resource links for counts: a tag reading
/// "N Total Resources" yields the resource count, "N Awards" the award
/// count. Absent tags leave the corresponding field `None`.
pub fn resources_and_awards(doc: &Html) -> (Option<String>, Option<String>) {
    let mut resources = None;
    let mut awards = None;
    for tag in doc.select(&RESOURCE_TAGS) {
        let text = tag.text().collect::<String>();
        let text = text.trim();
        if text.contains("Total Resource") {
            resources = leading_token(text);
        } else if text.contains("Award") {
            awards = leading_token(text);
        }
    }
    (resources, awards)
}

fn leading_token(text: &str) -> Option<String> {
    text.split_whitespace().next().map(str::to_string)
}

// ── Tests ──
