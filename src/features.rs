use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::models::FeatureRow;

pub const NULL_MARKER: &str = "None";
const PUBLISHED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Destination for `ml_features` rows.
pub trait FeatureSink {
    fn write_row(&mut self, row: &FeatureRow) -> Result<()>;
    fn finish(&mut self) -> Result<()>;
}

pub struct CsvFeatureSink<W: std::io::Write> {
    writer: csv::Writer<W>,
}

impl CsvFeatureSink<std::fs::File> {
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {:?}", parent))?;
        }
        let writer = csv::Writer::from_path(path)
            .with_context(|| format!("opening feature sink {}", path.display()))?;
        Ok(Self { writer })
    }
}

impl<W: std::io::Write> CsvFeatureSink<W> {
    pub fn from_writer(w: W) -> Self {
        Self { writer: csv::Writer::from_writer(w) }
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!(e.to_string()))
    }
}

impl<W: std::io::Write> FeatureSink for CsvFeatureSink<W> {
    fn write_row(&mut self, row: &FeatureRow) -> Result<()> {
        self.writer.serialize(row)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

fn stable_document_id(article: Option<&str>) -> String {
    format!("{:016x}", xxh3_64(article.unwrap_or_default().as_bytes()))
}

pub fn parse_published_at(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, PUBLISHED_AT_FORMAT).ok()
}

/// Literal "None" cells become nulls; a row without `article_id` gets an id
/// hashed from its article text.
pub fn to_feature_row(row: &BTreeMap<String, String>) -> FeatureRow {
    let get = |k: &str| {
        row.get(k)
            .filter(|v| v.as_str() != NULL_MARKER)
            .cloned()
    };

    let article = get("article");
    let document_id = get("article_id")
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| stable_document_id(article.as_deref()));

    FeatureRow {
        document_id,
        article,
        title_sentiment: get("title_sentiment"),
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub written: usize,
    pub generated_ids: usize,
    pub bad_timestamps: usize,
}

pub fn load_features(
    rows: &[BTreeMap<String, String>],
    sink: &mut dyn FeatureSink,
) -> Result<LoadStats> {
    let start = std::time::Instant::now();
    let mut stats = LoadStats::default();

    for (i, row) in rows.iter().enumerate() {
        if let Some(ts) = row.get("published_at").filter(|v| !v.is_empty() && *v != NULL_MARKER) {
            if parse_published_at(ts).is_none() {
                warn!("Row {} has unparsable published_at {:?}", i + 1, ts);
                stats.bad_timestamps += 1;
            }
        }

        let feature = to_feature_row(row);
        if row.get("article_id").map_or(true, |v| v != &feature.document_id) {
            debug!("Row {} has no article_id, using {}", i + 1, feature.document_id);
            stats.generated_ids += 1;
        }
        sink.write_row(&feature)
            .with_context(|| format!("writing feature row {}", i + 1))?;
        stats.written += 1;
    }
    sink.finish()?;

    info!(
        "Feature load completed - rows={}, generated_ids={}, bad_timestamps={}, duration={:.2}s",
        stats.written,
        stats.generated_ids,
        stats.bad_timestamps,
        start.elapsed().as_secs_f32()
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn none_cells_become_null() {
        let f = to_feature_row(&row(&[
            ("article_id", "42"),
            ("article", "Body"),
            ("title_sentiment", "None"),
        ]));
        assert_eq!(f.document_id, "42");
        assert_eq!(f.article.as_deref(), Some("Body"));
        assert_eq!(f.title_sentiment, None);
    }

    #[test]
    fn missing_id_is_derived_from_article() {
        let a = to_feature_row(&row(&[("article", "Same text")]));
        let b = to_feature_row(&row(&[("article_id", "None"), ("article", "Same text")]));
        assert_eq!(a.document_id.len(), 16);
        assert_eq!(a.document_id, b.document_id);
        let c = to_feature_row(&row(&[("article", "Other text")]));
        assert_ne!(a.document_id, c.document_id);
    }

    #[test]
    fn timestamps_use_utc_iso_format() {
        assert!(parse_published_at("2023-10-02T14:05:00Z").is_some());
        assert!(parse_published_at("02/10/2023").is_none());
    }

    #[test]
    fn csv_sink_writes_header_and_rows() {
        let rows = vec![
            row(&[("article_id", "1"), ("article", "a, b"), ("title_sentiment", "Positive")]),
            row(&[("article", "x"), ("published_at", "yesterday")]),
        ];
        let mut sink = CsvFeatureSink::from_writer(Vec::new());
        let stats = load_features(&rows, &mut sink).unwrap();
        assert_eq!(
            stats,
            LoadStats { written: 2, generated_ids: 1, bad_timestamps: 1 }
        );

        let out = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("document_id,article,title_sentiment"));
        assert_eq!(lines.next(), Some("1,\"a, b\",Positive"));
        assert!(lines.next().unwrap().ends_with(",x,"));
    }
}
