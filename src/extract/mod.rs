pub mod categories;
pub mod heading;
pub mod stats;
pub mod tags;

use scraper::Html;

use crate::store::BookRecord;

/// Assemble one record from a rendered detail page.
///
/// Each field extractor is independent and fails closed: a missing or
/// malformed element leaves its own fields empty and never touches the rest
/// of the record.
pub fn extract_record(link: &str, doc: &Html) -> BookRecord {
    let mut record = BookRecord {
        title_link: link.to_string(),
        ..Default::default()
    };

    if let Some(title) = heading::title(doc) {
        record.title = title;
    }
    if let Some((author, author_link)) = heading::author(doc) {
        record.author = author;
        record.author_link = author_link;
    }

    let (resources, awards) = tags::resources_and_awards(doc);
    record.total_resources = resources.unwrap_or_default();
    record.awards = awards.unwrap_or_default();

    let cats = categories::scan(&categories::items(doc));
    record.grade = cats.grade;
    record.genre = cats.genre;
    record.cultural_experience = cats.cultural_experience;

    let reading = stats::scan(&stats::lines(doc));
    record.publication_date = reading.publication_date;
    record.word_count = reading.word_count;
    record.lexile_level = reading.lexile_level;
    record.atos_level = reading.atos_level;
    record.quiz_number = reading.quiz_number;
    record.quiz_ar_points = reading.quiz_ar_points;

    record
}

/// Strip embedded newlines, trim, and uppercase the first letter of every
/// word run (lowercasing the rest).
pub(crate) fn title_case(text: &str) -> String {
    let flat = text.replace('\n', "");
    let mut out = String::with_capacity(flat.len());
    let mut prev_alpha = false;
    for ch in flat.trim().chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

// ── Tests ──
