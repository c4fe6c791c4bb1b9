use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

static INFO_BLOCK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.col-10.col-md-6.col-lg-4").unwrap());
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9.]+").unwrap());

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReadingStats {
    pub publication_date: String,
    pub word_count: String,
    pub lexile_level: String,
    pub atos_level: String,
    pub quiz_number: String,
    pub quiz_ar_points: String,
}

/// Newline-separated text lines of the first reading-stats column.
pub fn lines(doc: &Html) -> Vec<String> {
    let Some(div) = doc.select(&INFO_BLOCK).next() else {
        return Vec::new();
    };
    let text = div.text().collect::<String>();
    text.trim().lines().map(str::to_string).collect()
}

/// Match each line against the known stat prefixes and keep the remainder.
///
/// The AR line holds both quiz number and points; it must yield exactly two
/// numeric tokens, otherwise the match is ambiguous and both stay empty.
pub fn scan(lines: &[String]) -> ReadingStats {
    let mut stats = ReadingStats::default();
    for line in lines {
        if let Some(rest) = strip_label(line, "Year Published") {
            stats.publication_date = rest;
        } else if let Some(rest) = strip_label(line, "Word Count") {
            stats.word_count = rest.replace(',', "");
        } else if let Some(rest) = strip_label(line, "Lexile Level:") {
            stats.lexile_level = rest;
        } else if let Some(rest) = strip_label(line, "ATOS Reading Level:") {
            stats.atos_level = rest;
        } else if line.contains("AR Point") {
            let cleaned = line.replace(',', "");
            let nums: Vec<&str> = NUMBER_RE.find_iter(&cleaned).map(|m| m.as_str()).collect();
            if let [quiz, points] = nums[..] {
                stats.quiz_number = quiz.to_string();
                stats.quiz_ar_points = points.to_string();
            }
        }
    }
    stats
}

fn strip_label(line: &str, label: &str) -> Option<String> {
    line.contains(label)
        .then(|| line.replace(label, "").trim().to_string())
}

// ── Tests ──
