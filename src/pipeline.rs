use rayon::prelude::*;
use tracing::{debug, info};

use crate::models::{ClassifiedRecord, NewsRecord};
use crate::normalize::TextNormalizer;
use crate::regions::classify;

#[derive(Debug, Default)]
pub struct BatchOutput {
    pub classified: Vec<ClassifiedRecord>,
    pub cleaned: Option<Vec<Option<String>>>, // None when text cleaning was not requested
    pub unclassified: usize,
    pub skipped_text: usize,
}

/// Positional: `out[i]` always corresponds to `records[i]`.
pub fn classify_batch(records: &[NewsRecord]) -> Vec<ClassifiedRecord> {
    records
        .par_iter()
        .map(|r| ClassifiedRecord {
            region: r.country.as_deref().and_then(classify),
            record: r.clone(),
        })
        .collect()
}

/// Records without an article column get `None`; the rest of the batch is unaffected.
pub fn clean_batch(records: &[NewsRecord], normalizer: &TextNormalizer) -> Vec<Option<String>> {
    records
        .par_iter()
        .map(|r| r.article_text.as_deref().map(|t| normalizer.normalize(t)))
        .collect()
}

pub fn run_batch(
    records: &[NewsRecord],
    normalizer: &TextNormalizer,
    with_text: bool,
) -> BatchOutput {
    let start = std::time::Instant::now();
    debug!("Batch started - records={}, clean_text={}", records.len(), with_text);

    let classified = classify_batch(records);
    let unclassified = classified.iter().filter(|c| c.region.is_none()).count();

    let cleaned = with_text.then(|| clean_batch(records, normalizer));
    let skipped_text = cleaned
        .as_ref()
        .map(|c| c.iter().filter(|t| t.is_none()).count())
        .unwrap_or(0);

    info!(
        "Batch completed - records={}, unclassified={}, skipped_text={}, duration={:.2}s",
        records.len(),
        unclassified,
        skipped_text,
        start.elapsed().as_secs_f32()
    );

    BatchOutput {
        classified,
        cleaned,
        unclassified,
        skipped_text,
    }
}
