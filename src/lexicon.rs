//! Linguistic resources behind the text normalizer: the stop-word set and a
//! WordNet-style noun lemmatizer. Both are loaded once at startup, from the
//! embedded defaults or from files, and are read-only afterwards.

use anyhow::{bail, Context, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

const DEFAULT_STOPWORDS: &str = include_str!("../resources/english_stopwords.txt");
const DEFAULT_NOUN_LEXICON: &str = include_str!("../resources/noun_lexicon.txt");
const DEFAULT_NOUN_EXCEPTIONS: &str = include_str!("../resources/noun_exceptions.txt");

/// Noun detachment rules, applied to the end of a form.
const NOUN_SUFFIX_RULES: &[(&str, &str)] = &[
    ("s", ""),
    ("ses", "s"),
    ("ves", "f"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men", "man"),
    ("ies", "y"),
];

pub trait StopWords: Send + Sync {
    fn is_stopword(&self, word: &str) -> bool;
}

pub trait Lemmatize: Send + Sync {
    fn lemmatize(&self, text: &str) -> String;
}

/// Non-comment, non-blank lines of a resource file.
fn resource_lines(body: &str) -> impl Iterator<Item = &str> {
    body.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
}

/// Lemmas of a noun lexicon. Takes plain one-per-line lists as well as
/// WordNet's `index.noun`, whose license header lines are indented and whose
/// entries carry synset data after the lemma.
fn lexicon_entries(body: &str) -> impl Iterator<Item = &str> {
    body.lines()
        .filter(|l| !l.starts_with(' '))
        .flat_map(|l| resource_lines(l).next())
        .filter_map(|l| l.split_whitespace().next())
}

fn read_resource(path: &Path, what: &str) -> Result<String> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("loading {} from {}", what, path.display()))?;
    if resource_lines(&body).next().is_none() {
        bail!("{} at {} has no entries", what, path.display());
    }
    Ok(body)
}

#[derive(Debug, Clone)]
pub struct StopWordSet {
    words: HashSet<String>,
}

impl StopWordSet {
    pub fn parse(body: &str) -> Self {
        let words = resource_lines(body)
            .map(|w| w.nfc().collect::<String>().to_lowercase())
            .collect();
        Self { words }
    }

    pub fn english() -> Self {
        Self::parse(DEFAULT_STOPWORDS)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self::parse(&read_resource(path, "stop-word list")?))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }
}

impl StopWords for StopWordSet {
    fn is_stopword(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }
}

/// Lemmatizer over a noun lexicon. A candidate base form only counts if the
/// lexicon knows it; the shortest known candidate wins, and inputs with no
/// known candidate come back unchanged. Lookups are case-sensitive, and a
/// multi-word input never matches a lexicon entry.
#[derive(Debug, Clone)]
pub struct NounLemmatizer {
    lexicon: HashSet<String>,
    exceptions: HashMap<String, Vec<String>>,
}

impl NounLemmatizer {
    pub fn parse(lexicon: &str, exceptions: &str) -> Result<Self> {
        let lexicon: HashSet<String> = lexicon_entries(lexicon)
            .map(|w| w.nfc().collect::<String>())
            .collect();

        let mut exc = HashMap::new();
        for (n, line) in resource_lines(exceptions).enumerate() {
            let mut parts = line.split_whitespace().map(|w| w.nfc().collect::<String>());
            let inflected = parts.next().unwrap_or_default();
            let bases: Vec<String> = parts.collect();
            if bases.is_empty() {
                bail!("exception entry {} ({:?}) has no base form", n + 1, line);
            }
            exc.insert(inflected, bases);
        }

        Ok(Self { lexicon, exceptions: exc })
    }

    pub fn english() -> Result<Self> {
        Self::parse(DEFAULT_NOUN_LEXICON, DEFAULT_NOUN_EXCEPTIONS)
    }

    pub fn from_files(lexicon: &Path, exceptions: Option<&Path>) -> Result<Self> {
        let lex = read_resource(lexicon, "noun lexicon")?;
        let exc = match exceptions {
            Some(p) => read_resource(p, "noun exception list")?,
            None => DEFAULT_NOUN_EXCEPTIONS.to_string(),
        };
        Self::parse(&lex, &exc)
    }

    pub fn lexicon_len(&self) -> usize {
        self.lexicon.len()
    }

    fn candidates(&self, form: &str) -> Vec<String> {
        let mut forms = vec![form.to_string()];
        match self.exceptions.get(form) {
            Some(bases) => forms.extend(bases.iter().cloned()),
            None => {
                for (old, new) in NOUN_SUFFIX_RULES {
                    if let Some(stem) = form.strip_suffix(old) {
                        forms.push(format!("{}{}", stem, new));
                    }
                }
            }
        }

        let mut seen = HashSet::new();
        forms
            .into_iter()
            .filter(|f| self.lexicon.contains(f) && seen.insert(f.clone()))
            .collect()
    }
}

impl Lemmatize for NounLemmatizer {
    fn lemmatize(&self, text: &str) -> String {
        let mut best: Option<String> = None;
        for c in self.candidates(text) {
            if best.as_ref().map_or(true, |b| c.chars().count() < b.chars().count()) {
                best = Some(c);
            }
        }
        best.unwrap_or_else(|| text.to_string())
    }
}

/// Optional on-disk overrides for the embedded resources.
#[derive(Debug, Clone, Default)]
pub struct ResourceConfig {
    pub stopwords: Option<PathBuf>,
    pub lexicon: Option<PathBuf>,
    pub lemma_exceptions: Option<PathBuf>,
}

/// Process-wide resources, shared read-only with every normalizer.
#[derive(Clone)]
pub struct Resources {
    pub stopwords: Arc<dyn StopWords>,
    pub lemmatizer: Arc<dyn Lemmatize>,
}

impl Resources {
    pub fn load(cfg: &ResourceConfig) -> Result<Self> {
        let start = std::time::Instant::now();

        let stopwords = match &cfg.stopwords {
            Some(p) => {
                debug!("Loading stop words from {}", p.display());
                StopWordSet::from_file(p)?
            }
            None => StopWordSet::english(),
        };

        let lemmatizer = match &cfg.lexicon {
            Some(p) => {
                debug!("Loading noun lexicon from {}", p.display());
                NounLemmatizer::from_files(p, cfg.lemma_exceptions.as_deref())?
            }
            None if cfg.lemma_exceptions.is_some() => {
                bail!("a lemma exception list needs a noun lexicon to go with it")
            }
            None => NounLemmatizer::english()?,
        };

        info!(
            "Resources loaded - stopwords={}, lexicon={}, duration={:.3}s",
            stopwords.len(),
            lemmatizer.lexicon_len(),
            start.elapsed().as_secs_f32()
        );

        Ok(Self {
            stopwords: Arc::new(stopwords),
            lemmatizer: Arc::new(lemmatizer),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_stopwords_cover_standard_list() {
        let sw = StopWordSet::english();
        assert_eq!(sw.len(), 179);
        for w in ["this", "now", "out", "The", "DON'T"] {
            assert!(sw.is_stopword(w), "{w}");
        }
        assert!(!sw.is_stopword("Check"));
    }

    #[test]
    fn stopword_parse_skips_comments_and_blanks() {
        let sw = StopWordSet::parse("# header\n\n  Foo \nbar\n");
        assert_eq!(sw.len(), 2);
        assert!(sw.is_stopword("foo"));
        assert!(sw.is_stopword("BAR"));
    }

    #[test]
    fn noun_rules_reduce_known_plurals() {
        let lem = NounLemmatizer::english().unwrap();
        assert_eq!(lem.lemmatize("elections"), "election");
        assert_eq!(lem.lemmatize("churches"), "church");
        assert_eq!(lem.lemmatize("boxes"), "box");
        assert_eq!(lem.lemmatize("dogs"), "dog");
        assert_eq!(lem.lemmatize("cats"), "cat");
        assert_eq!(lem.lemmatize("countries"), "country");
        assert_eq!(lem.lemmatize("wolves"), "wolf");
        assert_eq!(lem.lemmatize("policies"), "policy");
        assert_eq!(lem.lemmatize("men"), "man");
        assert_eq!(lem.lemmatize("people"), "person");
    }

    #[test]
    fn known_base_forms_and_unknown_words_pass_through() {
        let lem = NounLemmatizer::english().unwrap();
        assert_eq!(lem.lemmatize("news"), "news");
        assert_eq!(lem.lemmatize("zzzs"), "zzzs");
        assert_eq!(lem.lemmatize("Elections"), "Elections");
        assert_eq!(lem.lemmatize(""), "");
    }

    #[test]
    fn multi_word_input_is_returned_unchanged() {
        let lem = NounLemmatizer::english().unwrap();
        assert_eq!(lem.lemmatize("peace talks"), "peace talks");
        assert_eq!(lem.lemmatize("troops elections"), "troops elections");
    }

    #[test]
    fn wordnet_index_format_is_accepted() {
        let index = "  1 This software and database is being provided to you, the LICENSEE, by
  2 Princeton University under the following license.
dog n 7 4 @ ~ #m %p 7 1 02084071 10133978 10042764 09905672 07676602 03907626 02712903
box n 10 6 @ ~ #p %p + ; - 10 1 02883344 13774404 08517449
news n 5 3 @ ~ + 5 1 06642138 06681551 06642672 06643408 06640093
";
        let lem = NounLemmatizer::parse(index, "").unwrap();
        assert_eq!(lem.lexicon_len(), 3);
        assert_eq!(lem.lemmatize("dogs"), "dog");
        assert_eq!(lem.lemmatize("boxes"), "box");
        assert_eq!(lem.lemmatize("news"), "news");
        assert_eq!(lem.lemmatize("Princeton"), "Princeton");
    }

    #[test]
    fn exception_lines_need_a_base_form() {
        assert!(NounLemmatizer::parse("man\n", "men\n").is_err());
    }

    #[test]
    fn missing_resource_file_fails_at_load() {
        let cfg = ResourceConfig {
            stopwords: Some(PathBuf::from("/nonexistent/stopwords.txt")),
            ..Default::default()
        };
        let err = Resources::load(&cfg).err().expect("load should fail");
        assert!(format!("{err:#}").contains("stop-word list"));
    }

    #[test]
    fn default_resources_load() {
        let res = Resources::load(&ResourceConfig::default()).unwrap();
        assert!(res.stopwords.is_stopword("the"));
        assert_eq!(res.lemmatizer.lemmatize("wars"), "war");
    }
}
