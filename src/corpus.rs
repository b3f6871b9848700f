use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::models::NewsRecord;

#[derive(Debug, Clone)]
pub struct ColumnMap {
    pub country: String,
    pub article: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            country: "category".to_string(),
            article: "article".to_string(),
        }
    }
}

/// Raw rows as header -> cell maps. Cells beyond a short row are absent.
pub fn read_rows<R: Read>(input: R) -> Result<Vec<BTreeMap<String, String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(input);
    let headers = rdr.headers().context("reading CSV header")?.clone();
    debug!("CSV header - columns={}", headers.len());

    let mut rows = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        let rec = match rec {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping unreadable CSV row {}: {}", i + 1, e);
                continue;
            }
        };
        let row: BTreeMap<String, String> = headers
            .iter()
            .zip(rec.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

pub fn to_record(mut row: BTreeMap<String, String>, cols: &ColumnMap) -> NewsRecord {
    NewsRecord {
        country: row.remove(&cols.country),
        article_text: row.remove(&cols.article),
        extra: row,
    }
}

pub fn read_records<R: Read>(input: R, cols: &ColumnMap) -> Result<Vec<NewsRecord>> {
    Ok(read_rows(input)?
        .into_iter()
        .map(|row| to_record(row, cols))
        .collect())
}

pub fn load_corpus(path: &Path, cols: &ColumnMap) -> Result<Vec<NewsRecord>> {
    let start = std::time::Instant::now();
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening corpus {}", path.display()))?;
    let records = read_records(file, cols)
        .with_context(|| format!("reading corpus {}", path.display()))?;

    let missing_country = records.iter().filter(|r| r.country.is_none()).count();
    let missing_article = records.iter().filter(|r| r.article_text.is_none()).count();
    if missing_country > 0 || missing_article > 0 {
        warn!(
            "Corpus has incomplete rows - missing {}={}, missing {}={}",
            cols.country, missing_country, cols.article, missing_article
        );
    }
    info!(
        "Corpus loaded - path={}, records={}, duration={:.2}s",
        path.display(),
        records.len(),
        start.elapsed().as_secs_f32()
    );
    Ok(records)
}
