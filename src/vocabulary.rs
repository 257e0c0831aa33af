//! Word index compatible with the pretrained-embedding workflow: frequency-ranked words,
//! indices starting at 1, and 0 reserved for padding.

use std::{collections::HashMap, path::Path};

use serde::{Deserialize, Serialize};

/// Characters replaced with whitespace before splitting a text into words
pub static FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

/// The index reserved for padding
pub const PAD_INDEX: usize = 0;

/// A frequency-ranked word index
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Words in index order; `words[0]` has index 1
    words: Vec<String>,

    /// A map from words to their indices
    word_index: HashMap<String, usize>,

    /// Only words with an index below this limit are emitted by [`Vocabulary::encode`]
    num_words: Option<usize>,
}

/// Split a text into lowercase words, dropping the filtered punctuation
pub fn text_to_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .map(|c| if FILTERS.contains(c) { ' ' } else { c })
        .collect::<String>()
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

impl Vocabulary {
    /// Build the word index from a corpus. Words are ranked by descending count, with ties
    /// kept in order of first appearance.
    pub fn fit<S: AsRef<str>>(texts: &[S], num_words: Option<usize>) -> Self {
        let mut counts: Vec<(String, usize)> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for text in texts {
            for word in text_to_words(text.as_ref()) {
                match positions.get(&word) {
                    Some(&position) => counts[position].1 += 1,
                    None => {
                        positions.insert(word.clone(), counts.len());
                        counts.push((word, 1));
                    }
                }
            }
        }

        // Stable, so equal counts keep their first-seen order
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        let words: Vec<String> = counts.into_iter().map(|(word, _)| word).collect();
        let word_index = words
            .iter()
            .enumerate()
            .map(|(i, word)| (word.clone(), i + 1))
            .collect();

        Self {
            words,
            word_index,
            num_words,
        }
    }

    /// The index of a word, if it was seen during fitting
    pub fn index(&self, word: &str) -> Option<usize> {
        self.word_index.get(word).copied()
    }

    /// The word at an index
    pub fn word(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.words.get(i))
            .map(String::as_str)
    }

    /// The number of distinct words seen during fitting
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if no words were seen during fitting
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of rows an embedding matrix needs to cover every emitted index, padding included
    pub fn embedding_rows(&self) -> usize {
        let rows = self.words.len() + 1;

        match self.num_words {
            Some(limit) => rows.min(limit),
            None => rows,
        }
    }

    /// Iterate over `(word, index)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.words
            .iter()
            .enumerate()
            .map(|(i, word)| (word.as_str(), i + 1))
    }

    /// Convert a text into word indices, dropping unknown words and words outside the limit
    pub fn encode(&self, text: &str) -> Vec<usize> {
        text_to_words(text)
            .iter()
            .filter_map(|word| self.index(word))
            .filter(|&index| self.num_words.map_or(true, |limit| index < limit))
            .collect()
    }

    /// Save the vocabulary as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer(file, self)?;

        Ok(())
    }

    /// Load a vocabulary saved with [`Vocabulary::save`]
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)?;

        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
}
