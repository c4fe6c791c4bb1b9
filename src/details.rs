use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use scraper::Html;
use tracing::{info, warn};

use crate::browser::BrowserAgent;
use crate::extract;
use crate::store::RecordStore;

/// Flush the accumulated table after this many newly extracted records.
const FLUSH_EVERY: usize = 100;
/// Best-effort render wait before snapshotting a detail page.
const RENDER_WAIT: Duration = Duration::from_secs(2);

/// Outcome counts for the extraction phase.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DetailStats {
    pub total: usize,
    pub extracted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Visit every reference not already in the store and append one record per
/// page, in discovery order.
///
/// A reference whose navigation fails is skipped for this run only; it stays
/// absent from the table and so remains eligible next time. The buffer is
/// seeded with the prior table and flushed whole every `FLUSH_EVERY` new
/// records plus once at the end, so a crash loses at most one batch.
pub async fn extract_details<B, S>(
    agent: &mut B,
    links: &[String],
    store: &mut S,
) -> Result<DetailStats>
where
    B: BrowserAgent,
    S: RecordStore,
{
    let mut records = store.load()?;
    let mut done: HashSet<String> = records.iter().map(|r| r.title_link.clone()).collect();
    if !done.is_empty() {
        info!("resuming: {} records already extracted", done.len());
    }

    let mut stats = DetailStats {
        total: links.len(),
        ..Default::default()
    };
    let pb = ProgressBar::new(links.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let mut since_flush = 0usize;
    for link in links {
        pb.inc(1);
        if !done.insert(link.clone()) {
            stats.skipped += 1;
            continue;
        }

        if let Err(e) = agent.goto(link).await {
            warn!("skipping {link}: {e}");
            stats.failed += 1;
            continue;
        }
        // Give the heading a moment to render; a timeout here is not fatal,
        // the extractors cope with whatever is present.
        let _ = agent.wait_for("h1", RENDER_WAIT).await;
        let html = match agent.content().await {
            Ok(html) => html,
            Err(e) => {
                warn!("skipping {link}: {e}");
                stats.failed += 1;
                continue;
            }
        };

        let record = {
            let doc = Html::parse_document(&html);
            extract::extract_record(link, &doc)
        };
        pb.set_message(record.title.clone());
        records.push(record);
        stats.extracted += 1;
        since_flush += 1;

        if since_flush >= FLUSH_EVERY {
            store.flush(&records)?;
            since_flush = 0;
        }
    }
    pb.finish_and_clear();

    store.flush(&records)?;
    info!(
        "extracted {} new records ({} skipped, {} failed)",
        stats.extracted, stats.skipped, stats.failed
    );
    Ok(stats)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::mock::ScriptedAgent;
    use crate::store::BookRecord;

    /// In-memory store that remembers the size of every flush.
    #[derive(Default)]
    struct MemoryStore {
        records: Vec<BookRecord>,
        flush_sizes: Vec<usize>,
    }

    impl RecordStore for MemoryStore {
        fn load(&self) -> Result<Vec<BookRecord>> {
            Ok(self.records.clone())
        }

        fn flush(&mut self, records: &[BookRecord]) -> Result<()> {
            self.flush_sizes.push(records.len());
            self.records = records.to_vec();
            Ok(())
        }
    }

    fn detail_page(title: &str) -> String {
        format!("<html><body><h1>{title}</h1></body></html>")
    }

    fn links(urls: &[&str]) -> Vec<String> {
        urls.iter().map(|u| u.to_string()).collect()
    }

    #[tokio::test]
    async fn resume_set_is_never_revisited() {
        let mut store = MemoryStore::default();
        store.records.push(BookRecord {
            title: "Already Done".to_string(),
            title_link: "https://t/a".to_string(),
            ..Default::default()
        });
        let mut agent = ScriptedAgent::with_pages(&[
            ("https://t/a", &detail_page("again")),
            ("https://t/b", &detail_page("new book")),
        ]);

        let stats = extract_details(&mut agent, &links(&["https://t/a", "https://t/b"]), &mut store)
            .await
            .unwrap();

        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.extracted, 1);
        assert_eq!(agent.visited, vec!["https://t/b"]);
        // No duplicate record for the resumed reference.
        assert_eq!(store.records.len(), 2);
        assert_eq!(store.records[0].title, "Already Done");
    }

    #[tokio::test]
    async fn duplicate_links_within_a_run_extract_once() {
        let mut store = MemoryStore::default();
        let mut agent = ScriptedAgent::with_pages(&[("https://t/a", &detail_page("one"))]);

        let stats = extract_details(&mut agent, &links(&["https://t/a", "https://t/a"]), &mut store)
            .await
            .unwrap();

        assert_eq!(stats.extracted, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(store.records.len(), 1);
    }

    #[tokio::test]
    async fn failed_navigation_skips_reference_only() {
        let mut store = MemoryStore::default();
        // No canned page for /gone: navigation fails.
        let mut agent = ScriptedAgent::with_pages(&[("https://t/b", &detail_page("survivor"))]);

        let stats = extract_details(&mut agent, &links(&["https://t/gone", "https://t/b"]), &mut store)
            .await
            .unwrap();

        assert_eq!(stats.failed, 1);
        assert_eq!(stats.extracted, 1);
        // The failed reference left no record, so a future run retries it.
        assert!(store.records.iter().all(|r| r.title_link != "https://t/gone"));
        assert_eq!(store.records[0].title, "Survivor");
    }

    #[tokio::test]
    async fn flushes_every_batch_and_at_the_end() {
        let mut store = MemoryStore::default();
        let urls: Vec<String> = (0..250).map(|i| format!("https://t/{i}")).collect();
        let pages: Vec<(String, String)> = urls
            .iter()
            .map(|u| (u.clone(), detail_page("b")))
            .collect();
        let mut agent = ScriptedAgent::default();
        agent.pages = pages.into_iter().collect();

        let stats = extract_details(&mut agent, &urls, &mut store).await.unwrap();

        assert_eq!(stats.extracted, 250);
        assert_eq!(store.flush_sizes, vec![100, 200, 250]);
        assert!(store.flush_sizes.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn final_flush_happens_even_with_partial_batch() {
        let mut store = MemoryStore::default();
        let mut agent = ScriptedAgent::with_pages(&[("https://t/a", &detail_page("only"))]);

        extract_details(&mut agent, &links(&["https://t/a"]), &mut store)
            .await
            .unwrap();

        assert_eq!(store.flush_sizes, vec![1]);
    }
}
