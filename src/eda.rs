use anyhow::{bail, Result};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::features::NULL_MARKER;
use crate::models::ClassifiedRecord;

pub const TOP_N: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdaColumn {
    SourceName,
    Category,
    TitleSentiment,
    Region,
}

impl EdaColumn {
    pub const ALL: [EdaColumn; 4] = [
        EdaColumn::SourceName,
        EdaColumn::Category,
        EdaColumn::TitleSentiment,
        EdaColumn::Region,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EdaColumn::SourceName => "source_name",
            EdaColumn::Category => "category",
            EdaColumn::TitleSentiment => "title_sentiment",
            EdaColumn::Region => "region",
        }
    }

    /// Cell for this column. `country_column` names the CSV column that was
    /// lifted into `NewsRecord::country`; every other column is read from the
    /// passthrough fields. Empty and `"None"` cells are null.
    fn value<'a>(&self, rec: &'a ClassifiedRecord, country_column: &str) -> Option<&'a str> {
        let cell = match self {
            EdaColumn::Region => return rec.region.map(|r| r.as_str()),
            c if c.name() == country_column => rec.record.country.as_deref(),
            c => rec.record.field(c.name()),
        };
        cell.filter(|v| !v.is_empty() && *v != NULL_MARKER)
    }
}

impl fmt::Display for EdaColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EdaColumn {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match EdaColumn::ALL.iter().find(|c| c.name() == s) {
            Some(c) => Ok(*c),
            None => bail!(
                "unknown column {:?} (expected one of: source_name, category, title_sentiment, region)",
                s
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Counts non-null values, most frequent first; ties keep first appearance.
pub fn value_counts(
    records: &[ClassifiedRecord],
    column: EdaColumn,
    country_column: &str,
) -> (Vec<ValueCount>, usize) {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut nulls = 0usize;

    for r in records {
        match column.value(r, country_column) {
            Some(v) => {
                let c = counts.entry(v).or_insert(0);
                if *c == 0 {
                    order.push(v);
                }
                *c += 1;
            }
            None => nulls += 1,
        }
    }

    let mut out: Vec<ValueCount> = order
        .into_iter()
        .map(|v| ValueCount {
            value: v.to_string(),
            count: counts[v],
        })
        .collect();
    // stable sort keeps first-appearance order among equal counts
    out.sort_by(|a, b| b.count.cmp(&a.count));
    (out, nulls)
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Distribution {
    Full { values: Vec<ValueCount> },
    TopBottom { top: Vec<ValueCount>, bottom: Vec<ValueCount> },
}

/// Sentiment counts for the most frequent sources. Rows follow the source
/// ranking, columns are the sentiment labels in sorted order, and missing
/// combinations count as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSentimentTable {
    pub sources: Vec<String>,
    pub sentiments: Vec<String>,
    pub counts: Vec<Vec<usize>>, // counts[source][sentiment]
}

pub fn sentiment_by_top_sources(
    records: &[ClassifiedRecord],
    top_n: usize,
    country_column: &str,
) -> SourceSentimentTable {
    let (ranked, _) = value_counts(records, EdaColumn::SourceName, country_column);
    let sources: Vec<String> = ranked.into_iter().take(top_n).map(|v| v.value).collect();

    let mut pairs: Vec<(usize, &str)> = Vec::new();
    for r in records {
        let Some(src) = EdaColumn::SourceName.value(r, country_column) else {
            continue;
        };
        let Some(row) = sources.iter().position(|s| s == src) else {
            continue;
        };
        if let Some(sentiment) = EdaColumn::TitleSentiment.value(r, country_column) {
            pairs.push((row, sentiment));
        }
    }

    let sentiments: Vec<String> = pairs
        .iter()
        .map(|(_, s)| *s)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    let mut counts = vec![vec![0usize; sentiments.len()]; sources.len()];
    for (row, sentiment) in pairs {
        if let Some(col) = sentiments.iter().position(|s| s == sentiment) {
            counts[row][col] += 1;
        }
    }

    SourceSentimentTable { sources, sentiments, counts }
}

#[derive(Debug, Clone, Serialize)]
pub struct EdaReport {
    pub column: EdaColumn,
    pub records: usize,
    pub distinct: usize,
    pub nulls: usize, // for `region`, rows whose country is not in the taxonomy
    pub distribution: Distribution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment_by_source: Option<SourceSentimentTable>,
}

pub fn analyze(records: &[ClassifiedRecord], column: EdaColumn, country_column: &str) -> EdaReport {
    let (counts, nulls) = value_counts(records, column, country_column);
    let distinct = counts.len();

    let distribution = if column == EdaColumn::TitleSentiment {
        Distribution::Full { values: counts }
    } else {
        let top = counts.iter().take(TOP_N).cloned().collect();
        let bottom = counts[counts.len().saturating_sub(TOP_N)..].to_vec();
        Distribution::TopBottom { top, bottom }
    };

    let sentiment_by_source = matches!(column, EdaColumn::SourceName | EdaColumn::TitleSentiment)
        .then(|| sentiment_by_top_sources(records, TOP_N, country_column));

    EdaReport {
        column,
        records: records.len(),
        distinct,
        nulls,
        distribution,
        sentiment_by_source,
    }
}
