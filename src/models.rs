use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Region {
    Africa,
    #[serde(rename = "US")]
    Us,
    China,
    #[serde(rename = "EU")]
    Eu,
    Russia,
    Ukraine,
    #[serde(rename = "Middle East")]
    MiddleEast,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Africa => "Africa",
            Region::Us => "US",
            Region::China => "China",
            Region::Eu => "EU",
            Region::Russia => "Russia",
            Region::Ukraine => "Ukraine",
            Region::MiddleEast => "Middle East",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One corpus row. `None` in a core field means the column was missing for
/// this row; an empty cell is `Some("")`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewsRecord {
    pub country: Option<String>,
    pub article_text: Option<String>,
    pub extra: BTreeMap<String, String>, // passthrough columns, untouched
}

impl NewsRecord {
    pub fn new(country: impl Into<String>, article_text: impl Into<String>) -> Self {
        Self {
            country: Some(country.into()),
            article_text: Some(article_text.into()),
            extra: BTreeMap::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.extra.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedRecord {
    #[serde(flatten)]
    pub record: NewsRecord,
    pub region: Option<Region>,
}

/// Row shape of the `ml_features` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureRow {
    pub document_id: String,
    pub article: Option<String>,
    pub title_sentiment: Option<String>,
}
