// src/render.rs
use crate::eda::{Distribution, EdaColumn, EdaReport, SourceSentimentTable, ValueCount, TOP_N};
use crate::orchestrator::PredictionRow;

const BAR_WIDTH: usize = 40;

fn bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let n = ((count as f64 / max as f64) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(n.max(1))
}

fn render_counts(md: &mut String, column: EdaColumn, values: &[ValueCount]) {
    let max = values.iter().map(|v| v.count).max().unwrap_or(0);
    md.push_str(&format!("| {} | Count | |\n|---|---:|---|\n", column));
    for v in values {
        md.push_str(&format!("| {} | {} | {} |\n", v.value, v.count, bar(v.count, max)));
    }
    md.push('\n');
}

fn render_sentiment_table(md: &mut String, t: &SourceSentimentTable) {
    md.push_str(&format!("## Sentiment by Top {} Sources\n", TOP_N));
    md.push_str("| source_name |");
    for s in &t.sentiments {
        md.push_str(&format!(" {} |", s));
    }
    md.push_str("\n|---|");
    md.push_str(&"---:|".repeat(t.sentiments.len()));
    md.push('\n');
    for (source, row) in t.sources.iter().zip(&t.counts) {
        md.push_str(&format!("| {} |", source));
        for c in row {
            md.push_str(&format!(" {} |", c));
        }
        md.push('\n');
    }
    md.push('\n');
}

pub fn render_eda_markdown(r: &EdaReport) -> String {
    let mut md = String::new();
    md.push_str("# News Analysis Dashboard\n\n");
    md.push_str(&format!(
        "Records: {} | distinct {}: {}\n\n",
        r.records, r.column, r.distinct
    ));

    match &r.distribution {
        Distribution::Full { values } => {
            md.push_str("## Sentiment Distribution\n");
            render_counts(&mut md, r.column, values);
        }
        Distribution::TopBottom { top, bottom } => {
            md.push_str(&format!("## Top 10 {}\n", r.column));
            render_counts(&mut md, r.column, top);
            md.push_str(&format!("## Bottom 10 {}\n", r.column));
            render_counts(&mut md, r.column, bottom);
        }
    }

    if let Some(t) = &r.sentiment_by_source {
        render_sentiment_table(&mut md, t);
    }

    if r.nulls > 0 {
        let label = if r.column == EdaColumn::Region { "unknown" } else { "missing" };
        md.push_str(&format!("_{} rows with {} {}_\n", r.nulls, label, r.column));
    }

    md
}

pub fn render_predictions_markdown(rows: &[PredictionRow]) -> String {
    let mut md = String::new();
    md.push_str("# Model Prediction\n\n");
    md.push_str("| # | Region | Tokens | Prediction |\n|---:|---|---:|---|\n");
    for r in rows {
        let scores = r
            .prediction
            .iter()
            .map(|p| format!("{:.4}", p))
            .collect::<Vec<_>>()
            .join(", ");
        md.push_str(&format!(
            "| {} | {} | {} | [{}] |\n",
            r.row,
            r.region.map(|g| g.as_str()).unwrap_or("unknown"),
            r.tokens,
            scores
        ));
    }
    md
}
