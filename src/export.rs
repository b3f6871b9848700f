// src/export.rs
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;
use std::{fs, path::Path};

use crate::eda::EdaReport;
use crate::orchestrator::PredictionRow;
use crate::sequence::Vocabulary;

fn write_json<P: AsRef<Path>, T: ?Sized + Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, serde_json::to_vec_pretty(value)?)
        .with_context(|| format!("write {:?}", path))
}

pub fn write_eda(out_dir: &Path, report: &EdaReport, markdown: &str) -> Result<()> {
    fs::create_dir_all(out_dir).with_context(|| format!("create {:?}", out_dir))?;
    write_json(out_dir.join(format!("eda.{}.json", report.column)), report)?;
    fs::write(out_dir.join(format!("eda.{}.md", report.column)), markdown.as_bytes())?;
    Ok(())
}

pub fn write_predictions(
    out_dir: &Path,
    rows: &[PredictionRow],
    vocab: &Vocabulary,
    max_len: usize,
    markdown: &str,
) -> Result<()> {
    fs::create_dir_all(out_dir).with_context(|| format!("create {:?}", out_dir))?;
    write_json(
        out_dir.join("predictions.json"),
        &json!({
            "max_len": max_len,
            "num_words": vocab.num_words,
            "vocabulary_size": vocab.len(),
            "rows": rows,
        }),
    )?;
    fs::write(out_dir.join("predictions.md"), markdown.as_bytes())?;
    Ok(())
}
