//! Model input preparation: a frequency-ranked vocabulary and fixed-width
//! index matrices, matching the preprocessing the classifier was trained with.

use itertools::Itertools;
use std::collections::HashMap;

pub const DEFAULT_NUM_WORDS: usize = 100_000;
pub const DEFAULT_MAX_LEN: usize = 3000;
pub const DEFAULT_OOV_TOKEN: &str = "";

const FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

/// Lowercases, turns filter characters into spaces and splits on spaces.
pub fn text_to_words(text: &str) -> Vec<String> {
    let lowered: String = text
        .to_lowercase()
        .chars()
        .map(|c| if FILTERS.contains(c) { ' ' } else { c })
        .collect();
    lowered
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub num_words: usize, // 0 = no cap
    pub oov_token: Option<String>,
    pub word_index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Ranks words by descending count, ties by first appearance. Index 0 is
    /// reserved for padding; the OOV token, when set, takes index 1.
    pub fn fit<S: AsRef<str>>(texts: &[S], num_words: usize, oov_token: Option<&str>) -> Self {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut first_seen: Vec<String> = Vec::new();
        for t in texts {
            for w in text_to_words(t.as_ref()) {
                let c = counts.entry(w.clone()).or_insert(0);
                if *c == 0 {
                    first_seen.push(w);
                }
                *c += 1;
            }
        }

        let ranked = first_seen
            .into_iter()
            .enumerate()
            .sorted_by_key(|(pos, w)| (std::cmp::Reverse(counts[w]), *pos))
            .map(|(_, w)| w);

        let mut word_index = HashMap::new();
        let mut next = 1;
        if let Some(oov) = oov_token {
            word_index.insert(oov.to_string(), 1);
            next = 2;
        }
        for w in ranked {
            // the OOV token keeps its reserved slot
            if word_index.contains_key(&w) {
                continue;
            }
            word_index.insert(w, next);
            next += 1;
        }

        Self {
            num_words,
            oov_token: oov_token.map(str::to_string),
            word_index,
        }
    }

    fn oov_index(&self) -> Option<usize> {
        self.oov_token
            .as_ref()
            .and_then(|t| self.word_index.get(t).copied())
    }

    pub fn text_to_sequence(&self, text: &str) -> Vec<usize> {
        let oov = self.oov_index();
        text_to_words(text)
            .into_iter()
            .filter_map(|w| match self.word_index.get(&w) {
                Some(&i) if self.num_words == 0 || i < self.num_words => Some(i),
                _ => oov,
            })
            .collect()
    }

    pub fn texts_to_sequences<S: AsRef<str>>(&self, texts: &[S]) -> Vec<Vec<usize>> {
        texts.iter().map(|t| self.text_to_sequence(t.as_ref())).collect()
    }

    pub fn len(&self) -> usize {
        self.word_index.len()
    }
}

/// Row-major `rows x width` matrix of vocabulary indices, 0 = padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedMatrix {
    pub rows: usize,
    pub width: usize,
    pub data: Vec<usize>,
}

impl PaddedMatrix {
    pub fn row(&self, i: usize) -> &[usize] {
        &self.data[i * self.width..(i + 1) * self.width]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[usize]> {
        (0..self.rows).map(move |i| self.row(i))
    }
}

/// Pads after the real tokens and truncates from the end.
pub fn pad_sequences(seqs: &[Vec<usize>], max_len: usize) -> PaddedMatrix {
    let mut data = Vec::with_capacity(seqs.len() * max_len);
    for s in seqs {
        let keep = s.len().min(max_len);
        data.extend_from_slice(&s[..keep]);
        data.extend(std::iter::repeat(0).take(max_len - keep));
    }
    PaddedMatrix {
        rows: seqs.len(),
        width: max_len,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_are_lowercased_and_filtered() {
        assert_eq!(text_to_words("Hello, World!\tfoo-bar"), vec!["hello", "world", "foo", "bar"]);
        assert!(text_to_words("  ...  ").is_empty());
    }

    #[test]
    fn ranking_by_frequency_then_first_seen() {
        let v = Vocabulary::fit(&["b a c", "a c", "c"], 100, None);
        assert_eq!(v.word_index["c"], 1);
        assert_eq!(v.word_index["a"], 2);
        assert_eq!(v.word_index["b"], 3);
    }

    #[test]
    fn oov_token_takes_index_one() {
        let v = Vocabulary::fit(&["x y y"], 100, Some(DEFAULT_OOV_TOKEN));
        assert_eq!(v.word_index[""], 1);
        assert_eq!(v.word_index["y"], 2);
        assert_eq!(v.word_index["x"], 3);
        assert_eq!(v.text_to_sequence("y z x"), vec![2, 1, 3]);
    }

    #[test]
    fn num_words_caps_the_usable_indices() {
        let v = Vocabulary::fit(&["a a a b b c"], 3, None);
        assert_eq!(v.len(), 3);
        assert_eq!(v.text_to_sequence("a b c d"), vec![1, 2]);

        let with_oov = Vocabulary::fit(&["a a a b b c"], 3, Some("<oov>"));
        assert_eq!(with_oov.text_to_sequence("a b c d"), vec![2, 1, 1, 1]);
    }

    #[test]
    fn zero_num_words_keeps_every_index() {
        let v = Vocabulary::fit(&["a a a b b c"], 0, None);
        assert_eq!(v.text_to_sequence("a b c d"), vec![1, 2, 3]);

        let with_oov = Vocabulary::fit(&["a a a b b c"], 0, Some("<oov>"));
        assert_eq!(with_oov.text_to_sequence("c d"), vec![4, 1]);
    }

    #[test]
    fn post_padding_and_post_truncation() {
        let m = pad_sequences(&[vec![5, 6], vec![1, 2, 3, 4, 5], vec![]], 4);
        assert_eq!(m.rows, 3);
        assert_eq!(m.row(0), &[5, 6, 0, 0]);
        assert_eq!(m.row(1), &[1, 2, 3, 4]);
        assert_eq!(m.row(2), &[0, 0, 0, 0]);
        assert_eq!(m.iter_rows().count(), 3);
    }
}
