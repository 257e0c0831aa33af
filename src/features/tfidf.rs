use std::collections::{BTreeMap, HashMap};

use burn::config::Config;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{CsrMatrix, FeatureError};

/// Two or more alphanumeric characters, as a word
pub static DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

lazy_static! {
    /// Runs of whitespace collapsed before character n-grams are taken
    static ref WHITE_SPACES: Regex = Regex::new(r"\s\s+").unwrap();
}

/// How documents are split into terms
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Analyzer {
    /// N-grams of tokens matched by the token pattern, joined by a single space
    #[default]
    Word,

    /// N-grams of characters
    Char,
}

/// Vectorizer configuration
#[derive(Config, Debug)]
pub struct TfidfConfig {
    /// Word or character n-grams
    #[config(default = "Analyzer::Word")]
    pub analyzer: Analyzer,

    /// Lowercase documents before analysis
    #[config(default = true)]
    pub lowercase: bool,

    /// Smallest and largest n-gram length, inclusive
    #[config(default = "(1, 1)")]
    pub ngram_range: (usize, usize),

    /// Keep only this many terms, the most frequent across the corpus
    pub max_features: Option<usize>,

    /// What a token looks like. Ignored by the character analyzer.
    #[config(default = "DEFAULT_TOKEN_PATTERN.to_string()")]
    pub token_pattern: String,
}

impl TfidfConfig {
    /// Build an unfitted vectorizer
    pub fn init(&self) -> Result<TfidfVectorizer, FeatureError> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(FeatureError::NgramRange { min_n, max_n });
        }

        if self.max_features == Some(0) {
            return Err(FeatureError::MaxFeatures);
        }

        Ok(TfidfVectorizer {
            config: self.clone(),
            token_pattern: Regex::new(&self.token_pattern)?,
            fitted: None,
        })
    }
}

/// Learned vocabulary and inverse document frequencies
#[derive(Clone, Debug)]
struct Fitted {
    /// Terms in column order, which is sorted order
    terms: Vec<String>,
    columns: HashMap<String, usize>,
    idf: Vec<f64>,
}

/// Converts documents to L2-normalised TF-IDF rows
#[derive(Clone, Debug)]
pub struct TfidfVectorizer {
    config: TfidfConfig,
    token_pattern: Regex,
    fitted: Option<Fitted>,
}

impl TfidfVectorizer {
    /// The configuration this vectorizer was built from
    pub fn config(&self) -> &TfidfConfig {
        &self.config
    }

    /// Split a document into its terms, repeats included
    pub fn analyze(&self, document: &str) -> Vec<String> {
        let document = if self.config.lowercase {
            document.to_lowercase()
        } else {
            document.to_string()
        };

        let (min_n, max_n) = self.config.ngram_range;

        match self.config.analyzer {
            Analyzer::Word => {
                let tokens: Vec<&str> = self
                    .token_pattern
                    .find_iter(&document)
                    .map(|m| m.as_str())
                    .collect();

                (min_n..=max_n.min(tokens.len()))
                    .flat_map(|n| tokens.windows(n).map(|window| window.join(" ")))
                    .collect()
            }
            Analyzer::Char => {
                let chars: Vec<char> = WHITE_SPACES.replace_all(&document, " ").chars().collect();

                (min_n..=max_n.min(chars.len()))
                    .flat_map(|n| chars.windows(n).map(|window| window.iter().collect::<String>()))
                    .collect()
            }
        }
    }

    fn count<S: AsRef<str>>(&self, documents: &[S]) -> Vec<HashMap<String, usize>> {
        documents
            .iter()
            .map(|document| {
                let mut counts = HashMap::new();
                for term in self.analyze(document.as_ref()) {
                    *counts.entry(term).or_insert(0) += 1;
                }
                counts
            })
            .collect()
    }

    fn fit_counts(&mut self, counts: &[HashMap<String, usize>]) -> Result<(), FeatureError> {
        // term -> (document frequency, total count)
        let mut stats: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for document in counts {
            for (term, &count) in document {
                let entry = stats.entry(term.as_str()).or_insert((0, 0));
                entry.0 += 1;
                entry.1 += count;
            }
        }

        if stats.is_empty() {
            return Err(FeatureError::EmptyVocabulary);
        }

        let mut kept: Vec<(&str, (usize, usize))> = stats.into_iter().collect();

        if let Some(limit) = self.config.max_features {
            if limit < kept.len() {
                // Stable, so ties keep their sorted term order
                kept.sort_by(|a, b| b.1 .1.cmp(&a.1 .1));
                kept.truncate(limit);
                kept.sort_by(|a, b| a.0.cmp(b.0));
            }
        }

        let n_documents = counts.len() as f64;

        let terms: Vec<String> = kept.iter().map(|(term, _)| term.to_string()).collect();
        let idf = kept
            .iter()
            .map(|(_, (df, _))| ((1.0 + n_documents) / (1.0 + *df as f64)).ln() + 1.0)
            .collect();
        let columns = terms
            .iter()
            .enumerate()
            .map(|(column, term)| (term.clone(), column))
            .collect();

        log::debug!("Fitted {} terms on {} documents", terms.len(), counts.len());

        self.fitted = Some(Fitted {
            terms,
            columns,
            idf,
        });

        Ok(())
    }

    fn transform_counts(&self, counts: &[HashMap<String, usize>]) -> Result<CsrMatrix, FeatureError> {
        let fitted = self.fitted.as_ref().ok_or(FeatureError::NotFitted)?;

        let rows = counts.iter().map(|document| {
            let mut row: Vec<(usize, f64)> = document
                .iter()
                .filter_map(|(term, &count)| {
                    let column = *fitted.columns.get(term)?;
                    Some((column, count as f64 * fitted.idf[column]))
                })
                .collect();

            let norm = row.iter().map(|(_, value)| value * value).sum::<f64>().sqrt();
            if norm > 0.0 {
                row.iter_mut().for_each(|(_, value)| *value /= norm);
            }

            row
        });

        CsrMatrix::from_rows(fitted.terms.len(), rows)
    }

    /// Learn the vocabulary and document frequencies of a corpus
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<(), FeatureError> {
        let counts = self.count(documents);

        self.fit_counts(&counts)
    }

    /// One row per document, one column per fitted term
    pub fn transform<S: AsRef<str>>(&self, documents: &[S]) -> Result<CsrMatrix, FeatureError> {
        if self.fitted.is_none() {
            return Err(FeatureError::NotFitted);
        }

        self.transform_counts(&self.count(documents))
    }

    /// [`TfidfVectorizer::fit`] followed by [`TfidfVectorizer::transform`] on the same corpus
    pub fn fit_transform<S: AsRef<str>>(
        &mut self,
        documents: &[S],
    ) -> Result<CsrMatrix, FeatureError> {
        let counts = self.count(documents);
        self.fit_counts(&counts)?;

        self.transform_counts(&counts)
    }

    /// Terms in column order
    pub fn feature_names(&self) -> Result<&[String], FeatureError> {
        self.fitted
            .as_ref()
            .map(|fitted| fitted.terms.as_slice())
            .ok_or(FeatureError::NotFitted)
    }

    /// Inverse document frequencies in column order
    pub fn idf(&self) -> Result<&[f64], FeatureError> {
        self.fitted
            .as_ref()
            .map(|fitted| fitted.idf.as_slice())
            .ok_or(FeatureError::NotFitted)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "{} is not close to {}",
            actual,
            expected
        );
    }

    #[test]
    fn test_word_ngrams() {
        let vectorizer = TfidfConfig::new()
            .with_ngram_range((1, 2))
            .init()
            .unwrap();

        assert_eq!(
            vectorizer.analyze("The cat, a Cat"),
            vec!["the", "cat", "cat", "the cat", "cat cat"]
        );
    }

    #[test]
    fn test_char_ngrams_collapse_whitespace() {
        let vectorizer = TfidfConfig::new()
            .with_analyzer(Analyzer::Char)
            .with_ngram_range((1, 2))
            .init()
            .unwrap();

        assert_eq!(
            vectorizer.analyze("A \t b"),
            vec!["a", " ", "b", "a ", " b"]
        );
    }

    #[test]
    fn test_invalid_ngram_range() {
        assert!(matches!(
            TfidfConfig::new().with_ngram_range((2, 1)).init(),
            Err(FeatureError::NgramRange { min_n: 2, max_n: 1 })
        ));
    }

    #[test]
    fn test_zero_max_features_rejected() {
        assert!(matches!(
            TfidfConfig::new().with_max_features(Some(0)).init(),
            Err(FeatureError::MaxFeatures)
        ));
        assert!(TfidfConfig::new().with_max_features(Some(1)).init().is_ok());
    }

    #[test]
    fn test_fit_transform_smooth_idf_and_l2_norm() {
        let mut vectorizer = TfidfConfig::new().init().unwrap();
        let matrix = vectorizer
            .fit_transform(&["the cat sat", "the dog"])
            .unwrap();

        assert_eq!(
            vectorizer.feature_names().unwrap(),
            &["cat", "dog", "sat", "the"]
        );

        let rare = (3.0_f64 / 2.0).ln() + 1.0;
        assert_close(vectorizer.idf().unwrap()[0], rare);
        assert_close(vectorizer.idf().unwrap()[3], 1.0);

        let norm = (2.0 * rare * rare + 1.0).sqrt();
        assert_close(matrix.get(0, 0).unwrap(), rare / norm);
        assert_close(matrix.get(0, 1).unwrap(), 0.0);
        assert_close(matrix.get(0, 3).unwrap(), 1.0 / norm);

        let squares: f64 = matrix.to_dense()[1].iter().map(|v| v * v).sum();
        assert_close(squares, 1.0);
    }

    #[test]
    fn test_transform_ignores_unknown_terms() {
        let mut vectorizer = TfidfConfig::new().init().unwrap();
        vectorizer.fit(&["known words"]).unwrap();

        let matrix = vectorizer.transform(&["zebra", "known zebra"]).unwrap();

        assert_eq!(matrix.shape(), (2, 2));
        assert_eq!(matrix.row(0).unwrap().0.len(), 0);
        assert_close(matrix.get(1, 0).unwrap(), 1.0);
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let mut vectorizer = TfidfConfig::new()
            .with_token_pattern("[a-z]".to_string())
            .with_max_features(Some(2))
            .init()
            .unwrap();

        vectorizer.fit(&["c a a a b", "c b"]).unwrap();

        // b and c tie on count, b sorts first
        assert_eq!(vectorizer.feature_names().unwrap(), &["a", "b"]);
    }

    #[test]
    fn test_empty_vocabulary() {
        let mut vectorizer = TfidfConfig::new().init().unwrap();

        assert!(matches!(
            vectorizer.fit(&["", "!!"]),
            Err(FeatureError::EmptyVocabulary)
        ));
    }

    #[test]
    fn test_transform_before_fit() {
        let vectorizer = TfidfConfig::new().init().unwrap();

        assert!(matches!(
            vectorizer.transform(&["anything"]),
            Err(FeatureError::NotFitted)
        ));
        assert!(matches!(
            vectorizer.feature_names(),
            Err(FeatureError::NotFitted)
        ));
    }
}
