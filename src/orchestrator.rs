use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::corpus::{load_corpus, read_rows, ColumnMap};
use crate::eda::{analyze, EdaColumn};
use crate::export::{write_eda, write_predictions};
use crate::features::{load_features, CsvFeatureSink};
use crate::lexicon::{ResourceConfig, Resources};
use crate::models::Region;
use crate::normalize::TextNormalizer;
use crate::pipeline::run_batch;
use crate::render::{render_eda_markdown, render_predictions_markdown};
use crate::sequence::{pad_sequences, Vocabulary};
use crate::serving::ModelClient;

#[derive(Debug, Clone, Serialize)]
pub struct PredictionRow {
    pub row: usize,
    pub region: Option<Region>,
    pub tokens: usize, // real tokens before padding/truncation
    pub prediction: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct PredictParams {
    pub num_words: usize,
    pub oov_token: Option<String>,
    pub max_len: usize,
}

pub fn run_eda(
    corpus: &Path,
    columns: &ColumnMap,
    resources: &ResourceConfig,
    column: EdaColumn,
    output_dir: &Path,
) -> Result<String> {
    let pipeline_start = std::time::Instant::now();
    info!("EDA started - corpus={}, column={}", corpus.display(), column);

    let normalizer = TextNormalizer::new(Resources::load(resources)?);
    let records = load_corpus(corpus, columns)?;
    let batch = run_batch(&records, &normalizer, false);
    if batch.unclassified > 0 {
        debug!("Rows without a region: {}", batch.unclassified);
    }

    let report = analyze(&batch.classified, column, &columns.country);
    let md = render_eda_markdown(&report);
    write_eda(output_dir, &report, &md)?;

    info!(
        "EDA completed - distinct={}, nulls={}, output_dir={}, duration={:.2}s",
        report.distinct,
        report.nulls,
        output_dir.display(),
        pipeline_start.elapsed().as_secs_f32()
    );
    Ok(md)
}

pub async fn run_predict(
    corpus: &Path,
    columns: &ColumnMap,
    resources: &ResourceConfig,
    params: &PredictParams,
    client: &ModelClient,
    output_dir: &Path,
) -> Result<String> {
    let pipeline_start = std::time::Instant::now();
    info!(
        "Prediction started - corpus={}, endpoint={}",
        corpus.display(),
        client.endpoint()
    );

    let normalizer = TextNormalizer::new(Resources::load(resources)?);
    let records = load_corpus(corpus, columns)?;
    if records.is_empty() {
        bail!("corpus {} has no records to predict", corpus.display());
    }

    // 1) clean; rows without article text stay as empty rows so positions hold
    let batch = run_batch(&records, &normalizer, true);
    let cleaned: Vec<String> = batch
        .cleaned
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect();
    if batch.skipped_text > 0 {
        warn!("Rows without article text predicted on empty input: {}", batch.skipped_text);
    }

    // 2) vocabulary + padded matrix
    let vocab = Vocabulary::fit(&cleaned, params.num_words, params.oov_token.as_deref());
    let seqs = vocab.texts_to_sequences(&cleaned);
    let matrix = pad_sequences(&seqs, params.max_len);
    let truncated = seqs.iter().filter(|s| s.len() > params.max_len).count();
    info!(
        "Model input prepared - vocabulary={}, rows={}, width={}, truncated={}",
        vocab.len(),
        matrix.rows,
        matrix.width,
        truncated
    );

    // 3) model
    let predictions = client.predict(&matrix).await?;

    let rows: Vec<PredictionRow> = batch
        .classified
        .iter()
        .zip(seqs.iter())
        .zip(predictions)
        .enumerate()
        .map(|(i, ((c, s), p))| PredictionRow {
            row: i,
            region: c.region,
            tokens: s.len(),
            prediction: p,
        })
        .collect();

    let md = render_predictions_markdown(&rows);
    write_predictions(output_dir, &rows, &vocab, params.max_len, &md)?;

    info!(
        "Prediction completed - rows={}, output_dir={}, duration={:.2}s",
        rows.len(),
        output_dir.display(),
        pipeline_start.elapsed().as_secs_f32()
    );
    Ok(md)
}

pub fn run_load(corpus: &Path, sink_path: &Path) -> Result<()> {
    let start = std::time::Instant::now();
    info!("Feature load started - corpus={}, sink={}", corpus.display(), sink_path.display());

    let file = std::fs::File::open(corpus)
        .with_context(|| format!("opening corpus {}", corpus.display()))?;
    let rows = read_rows(file)?;
    let mut sink = CsvFeatureSink::create(sink_path)?;
    let stats = load_features(&rows, &mut sink)?;

    info!(
        "Feature load finished - rows={}, duration={:.2}s",
        stats.written,
        start.elapsed().as_secs_f32()
    );
    Ok(())
}
