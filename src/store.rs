use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One fully-assembled row of extracted fields for a single detail page.
/// Every field is always present; an empty string means "not found", never
/// a dropped column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Title Link")]
    pub title_link: String,
    #[serde(rename = "Author")]
    pub author: String,
    #[serde(rename = "Author Link")]
    pub author_link: String,
    #[serde(rename = "Total Resources")]
    pub total_resources: String,
    #[serde(rename = "Awards")]
    pub awards: String,
    #[serde(rename = "Grade")]
    pub grade: String,
    #[serde(rename = "Genre")]
    pub genre: String,
    #[serde(rename = "Cultural Experience")]
    pub cultural_experience: String,
    #[serde(rename = "Publication Date")]
    pub publication_date: String,
    #[serde(rename = "Word Count")]
    pub word_count: String,
    #[serde(rename = "Lexile Level")]
    pub lexile_level: String,
    #[serde(rename = "ATOS Level")]
    pub atos_level: String,
    #[serde(rename = "Quiz Number")]
    pub quiz_number: String,
    #[serde(rename = "Quiz AR Points")]
    pub quiz_ar_points: String,
}

/// Durable table of extracted records. `flush` rewrites the whole table from
/// the buffer accumulated so far, so re-flushing the same buffer is a no-op.
pub trait RecordStore {
    fn load(&self) -> Result<Vec<BookRecord>>;
    fn flush(&mut self, records: &[BookRecord]) -> Result<()>;
}

/// CSV-file-backed record store. A missing file is an empty prior run, not
/// an error.
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordStore for CsvStore {
    fn load(&self) -> Result<Vec<BookRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            let record: BookRecord =
                row.with_context(|| format!("bad row in {}", self.path.display()))?;
            records.push(record);
        }
        Ok(records)
    }

    fn flush(&mut self, records: &[BookRecord]) -> Result<()> {
        let mut writer = csv::Writer::from_path(&self.path)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

// ── Reference list file ──

const LINK_HEADER: &str = "Link";

/// Serialize the discovered reference list: one Link column, one url per row.
pub fn write_links(path: &Path, links: &[String]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    writer.write_record([LINK_HEADER])?;
    for link in links {
        writer.write_record([link])?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a reference list back, keyed by its Link column.
pub fn read_links(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open reference list {}", path.display()))?;
    let idx = reader
        .headers()?
        .iter()
        .position(|h| h == LINK_HEADER)
        .with_context(|| format!("{} has no {LINK_HEADER} column", path.display()))?;
    let mut links = Vec::new();
    for row in reader.records() {
        let row = row?;
        if let Some(link) = row.get(idx) {
            links.push(link.to_string());
        }
    }
    Ok(links)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn record(link: &str, title: &str) -> BookRecord {
        BookRecord {
            title: title.to_string(),
            title_link: link.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn missing_table_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("absent.csv"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn flush_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CsvStore::new(dir.path().join("data.csv"));
        let records = vec![record("https://a", "A"), record("https://b", "B")];
        store.flush(&records).unwrap();
        assert_eq!(store.load().unwrap(), records);
    }

    #[test]
    fn reflush_overwrites_not_appends() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CsvStore::new(dir.path().join("data.csv"));
        let records = vec![record("https://a", "A")];
        store.flush(&records).unwrap();
        store.flush(&records).unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn record_with_empty_fields_survives_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CsvStore::new(dir.path().join("data.csv"));
        let records = vec![record("https://a", "")];
        store.flush(&records).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded[0].title, "");
        assert_eq!(loaded[0].title_link, "https://a");
    }

    #[test]
    fn links_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.csv");
        let links = vec!["https://a?id=1".to_string(), "https://b?id=2".to_string()];
        write_links(&path, &links).unwrap();
        assert_eq!(read_links(&path).unwrap(), links);
    }

    #[test]
    fn read_links_rejects_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.csv");
        std::fs::write(&path, "Url\nhttps://a\n").unwrap();
        assert!(read_links(&path).is_err());
    }
}
