use std::sync::LazyLock;

use scraper::{Html, Selector};

static CATEGORY_ITEMS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul.genre.btn-list li").unwrap());

/// Which value list the scan is currently accumulating into. Entering one
/// collecting state always leaves the other, so the lists can never
/// cross-contaminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Idle,
    CollectingGenre,
    CollectingCulture,
}

impl Mode {
    /// Pure transition on one item's text; non-label items keep the mode.
    fn transition(self, item: &str) -> Mode {
        if item.contains("Genre") {
            Mode::CollectingGenre
        } else if item.contains("Cultural Experience") {
            Mode::CollectingCulture
        } else {
            self
        }
    }

    fn is_label(item: &str) -> bool {
        item.contains("Genre") || item.contains("Cultural Experience")
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Categories {
    pub grade: String,
    pub genre: String,
    pub cultural_experience: String,
}

/// Ordered item texts of the category button list.
pub fn items(doc: &Html) -> Vec<String> {
    doc.select(&CATEGORY_ITEMS)
        .map(|li| li.text().collect::<String>().trim().to_string())
        .collect()
}

/// Walk the ordered label/value items. A "Grade" label takes the following
/// item as the grade value without touching the mode; "Genre" and
/// "Cultural Experience" labels switch which list subsequent items are
/// comma-joined into.
pub fn scan(items: &[String]) -> Categories {
    let mut mode = Mode::Idle;
    let mut grade = String::new();
    let mut genres: Vec<String> = Vec::new();
    let mut cultures: Vec<String> = Vec::new();

    for (i, item) in items.iter().enumerate() {
        if item.contains("Grade") {
            grade = items.get(i + 1).map(|s| s.trim().to_string()).unwrap_or_default();
            continue;
        }
        mode = mode.transition(item);
        if Mode::is_label(item) {
            continue;
        }
        match mode {
            Mode::CollectingGenre => genres.push(item.clone()),
            Mode::CollectingCulture => cultures.push(item.clone()),
            Mode::Idle => {}
        }
    }

    Categories {
        grade,
        genre: genres.join(", "),
        cultural_experience: cultures.join(", "),
    }
}

// ── Tests ──
