use regex::Regex;
use std::sync::LazyLock;

use crate::lexicon::Resources;

// Anything shaped like a web address, with or without scheme / www / path.
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(https?://)?(www\.)?(\S+\.\S+)(/\S*)?").unwrap());
static PUNCT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());

pub fn strip_urls(text: &str) -> String {
    URL_RE.replace_all(text, "").into_owned()
}

/// Whitespace is left as-is.
pub fn strip_punctuation(text: &str) -> String {
    PUNCT_RE.replace_all(text, "").into_owned()
}

/// Cleans article text for grouping and model input:
/// URLs, then punctuation, then stop words, then one lemmatizer pass.
#[derive(Clone)]
pub struct TextNormalizer {
    resources: Resources,
}

impl TextNormalizer {
    pub fn new(resources: Resources) -> Self {
        Self { resources }
    }

    pub fn drop_stopwords(&self, text: &str) -> String {
        text.split_whitespace()
            .filter(|w| !self.resources.stopwords.is_stopword(w))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn normalize(&self, text: &str) -> String {
        let text = strip_urls(text);
        let text = strip_punctuation(&text);
        let text = self.drop_stopwords(&text);
        // Lemmatized as a single unit, not per token. With a single-word
        // lexicon this leaves multi-word text untouched.
        self.resources.lemmatizer.lemmatize(&text)
    }
}
