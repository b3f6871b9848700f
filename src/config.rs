use std::path::PathBuf;
use tracing::debug;

use crate::lexicon::ResourceConfig;
use crate::serving::DEFAULT_MODEL_URL;

pub const ENV_STOPWORDS: &str = "NEWS_STOPWORDS";
pub const ENV_LEXICON: &str = "NEWS_LEXICON";
pub const ENV_LEMMA_EXCEPTIONS: &str = "NEWS_LEMMA_EXCEPTIONS";
pub const ENV_MODEL_URL: &str = "NEWS_MODEL_URL";
pub const ENV_OUTPUT_DIR: &str = "NEWS_OUTPUT_DIR";

pub const DEFAULT_OUTPUT_DIR: &str = "out";

/// Command-line value first, then the environment variable, then nothing.
fn pick<F>(cli: Option<String>, var: &str, lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    match cli {
        Some(v) => Some(v),
        None => {
            let v = lookup(var).filter(|v| !v.trim().is_empty());
            if let Some(ref v) = v {
                debug!("Using {} from environment: {}", var, v);
            }
            v
        }
    }
}

pub fn env_lookup(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

pub fn resolve_resources<F>(
    stopwords: Option<String>,
    lexicon: Option<String>,
    lemma_exceptions: Option<String>,
    lookup: &F,
) -> ResourceConfig
where
    F: Fn(&str) -> Option<String>,
{
    ResourceConfig {
        stopwords: pick(stopwords, ENV_STOPWORDS, lookup).map(PathBuf::from),
        lexicon: pick(lexicon, ENV_LEXICON, lookup).map(PathBuf::from),
        lemma_exceptions: pick(lemma_exceptions, ENV_LEMMA_EXCEPTIONS, lookup).map(PathBuf::from),
    }
}

pub fn resolve_model_url<F>(cli: Option<String>, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    pick(cli, ENV_MODEL_URL, lookup).unwrap_or_else(|| DEFAULT_MODEL_URL.to_string())
}

pub fn resolve_output_dir<F>(cli: Option<String>, lookup: &F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    PathBuf::from(pick(cli, ENV_OUTPUT_DIR, lookup).unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn cli_beats_env_beats_default() {
        let lookup = env(&[(ENV_MODEL_URL, "http://env:8501/v1/models/m:predict")]);
        assert_eq!(
            resolve_model_url(Some("http://cli/predict".into()), &lookup),
            "http://cli/predict"
        );
        assert_eq!(resolve_model_url(None, &lookup), "http://env:8501/v1/models/m:predict");
        assert_eq!(resolve_model_url(None, &env(&[])), DEFAULT_MODEL_URL);
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let lookup = env(&[(ENV_OUTPUT_DIR, "  ")]);
        assert_eq!(resolve_output_dir(None, &lookup), PathBuf::from(DEFAULT_OUTPUT_DIR));
    }

    #[test]
    fn resource_paths_come_from_env() {
        let lookup = env(&[(ENV_STOPWORDS, "/etc/news/stop.txt")]);
        let cfg = resolve_resources(None, Some("lex.txt".into()), None, &lookup);
        assert_eq!(cfg.stopwords, Some(PathBuf::from("/etc/news/stop.txt")));
        assert_eq!(cfg.lexicon, Some(PathBuf::from("lex.txt")));
        assert_eq!(cfg.lemma_exceptions, None);
    }
}
