use crate::storage::QueueStore;
use crate::UrlqError;
use std::path::Path;

/// Outcome of loading a URL list into the queue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Lines inserted as `NEW` records
    pub inserted: usize,
    /// Blank lines ignored
    pub skipped: usize,
}

/// Splits newline-delimited text into trimmed, non-empty URLs
///
/// # Returns
///
/// The URLs in file order, plus the number of blank lines skipped
pub fn parse_url_list(content: &str) -> (Vec<String>, usize) {
    let mut urls = Vec::new();
    let mut skipped = 0;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            skipped += 1;
        } else {
            urls.push(line.to_string());
        }
    }

    (urls, skipped)
}

/// Loads a newline-delimited URL file into the queue
///
/// URLs are stored verbatim; scheme normalization happens at fetch time.
///
/// # Arguments
///
/// * `store` - The queue to insert into
/// * `path` - Path to the URL list
///
/// # Returns
///
/// * `Ok(LoadReport)` - How many lines were inserted and skipped
/// * `Err(UrlqError)` - The file could not be read or the insert failed
pub fn load_urls<S: QueueStore + ?Sized>(store: &S, path: &Path) -> Result<LoadReport, UrlqError> {
    let content = std::fs::read_to_string(path)?;
    let (urls, skipped) = parse_url_list(&content);
    let inserted = store.insert_urls(&urls)?;

    tracing::info!(
        "Loaded {} URLs from {} ({} blank lines skipped)",
        inserted,
        path.display(),
        skipped
    );

    Ok(LoadReport { inserted, skipped })
}
