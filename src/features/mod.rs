/// Sparse matrices
pub mod sparse;

/// TF-IDF vectorization
pub mod tfidf;

/// Feature importance for linear classifiers
pub mod importance;

pub use importance::{most_informative_features, InformativeFeatures, LinearClassifier};
pub use sparse::CsrMatrix;
pub use tfidf::{Analyzer, TfidfConfig, TfidfVectorizer};

/// Single alphanumeric characters, the word tokens used by [`get_tfidf`]
pub static WORD_TOKEN_PATTERN: &str = "[a-zA-Z0-9]";

/// The default vocabulary limit for each vectorizer
pub const DEFAULT_MAX_FEATURES: usize = 50_000;

/// Feature extraction errors
#[derive(thiserror::Error, Debug)]
pub enum FeatureError {
    /// Fitting found no terms at all
    #[error("empty vocabulary; the documents contain no terms")]
    EmptyVocabulary,

    /// The vectorizer was used before it was fitted
    #[error("the vectorizer has not been fitted")]
    NotFitted,

    /// N-gram lengths must satisfy `1 <= min_n <= max_n`
    #[error("invalid n-gram range ({min_n}, {max_n})")]
    NgramRange {
        /// Smallest n-gram length
        min_n: usize,
        /// Largest n-gram length
        max_n: usize,
    },

    /// A feature limit must keep at least one term
    #[error("max_features must be at least 1")]
    MaxFeatures,

    /// The token pattern is not a valid regular expression
    #[error("invalid token pattern: {0}")]
    Regex(#[from] regex::Error),

    /// A sparse entry lies beyond the last column
    #[error("column {col} is out of bounds for {n_cols} columns")]
    ColumnOutOfBounds {
        /// The offending column
        col: usize,
        /// Number of columns in the matrix
        n_cols: usize,
    },

    /// A sparse row has two entries for one column
    #[error("row {row} has more than one value for column {col}")]
    DuplicateColumn {
        /// The offending row
        row: usize,
        /// The repeated column
        col: usize,
    },

    /// Matrices stacked side by side must have the same number of rows
    #[error("expected {expected} rows, found {found}")]
    RowMismatch {
        /// Rows in the first matrix
        expected: usize,
        /// Rows in the offending matrix
        found: usize,
    },

    /// Every feature name needs exactly one coefficient
    #[error("{coefficients} coefficients for {names} feature names")]
    LengthMismatch {
        /// Number of coefficients
        coefficients: usize,
        /// Number of feature names
        names: usize,
    },
}

/// Stacked word and character TF-IDF features for each split, with the fitted vectorizers
#[derive(Clone, Debug)]
pub struct TfidfFeatures {
    pub train: CsrMatrix,
    pub val: CsrMatrix,
    pub test: CsrMatrix,

    /// Word n-grams, 1 to 3 tokens
    pub word: TfidfVectorizer,

    /// Character n-grams, 1 to 5 characters
    pub char: TfidfVectorizer,
}

/// Fit word and character vectorizers on the training texts and transform all three splits
pub fn get_tfidf<S: AsRef<str>>(
    x_train: &[S],
    x_val: &[S],
    x_test: &[S],
    max_features: usize,
) -> Result<TfidfFeatures, FeatureError> {
    let mut word = TfidfConfig::new()
        .with_analyzer(Analyzer::Word)
        .with_ngram_range((1, 3))
        .with_max_features(Some(max_features))
        .with_token_pattern(WORD_TOKEN_PATTERN.to_string())
        .init()?;

    let mut char = TfidfConfig::new()
        .with_analyzer(Analyzer::Char)
        .with_ngram_range((1, 5))
        .with_max_features(Some(max_features))
        .init()?;

    log::info!("Fitting TF-IDF features on {} texts", x_train.len());

    let train_word = word.fit_transform(x_train)?;
    let val_word = word.transform(x_val)?;
    let test_word = word.transform(x_test)?;

    let train_char = char.fit_transform(x_train)?;
    let val_char = char.transform(x_val)?;
    let test_char = char.transform(x_test)?;

    let features = TfidfFeatures {
        train: CsrMatrix::hstack(&[&train_word, &train_char])?,
        val: CsrMatrix::hstack(&[&val_word, &val_char])?,
        test: CsrMatrix::hstack(&[&test_word, &test_char])?,
        word,
        char,
    };

    log::info!(
        "TF-IDF features: {} word and {} char columns",
        train_word.n_cols(),
        train_char.n_cols()
    );

    Ok(features)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_get_tfidf_stacks_word_and_char_features() {
        let train = ["ab a", "b"];
        let val = ["a"];
        let test = ["zz", "b b", "ab"];

        let features = get_tfidf(&train, &val, &test, DEFAULT_MAX_FEATURES).unwrap();

        // Word tokens are single characters: a, b, "a b", "b a", "a b a"
        let words = features.word.feature_names().unwrap();
        assert_eq!(words, &["a", "a b", "a b a", "b", "b a"]);

        // Characters: " ", " a", "a", "ab", "ab ", "ab a", "b", "b ", "b a"
        let chars = features.char.feature_names().unwrap();
        assert_eq!(chars.len(), 9);

        assert_eq!(features.train.shape(), (2, 14));
        assert_eq!(features.val.shape(), (1, 14));
        assert_eq!(features.test.shape(), (3, 14));

        // "zz" has no known terms
        assert_eq!(features.test.row(0).unwrap().0.len(), 0);

        // Word "a" is column 0, char "a" is column 5 + 2
        assert!(features.val.get(0, 0).unwrap() > 0.0);
        assert!(features.val.get(0, 7).unwrap() > 0.0);
    }

    #[test]
    fn test_max_features_limits_each_vectorizer() {
        let features = get_tfidf(&["abc abd"], &["abc"], &["abd"], 2).unwrap();

        assert_eq!(features.train.n_cols(), 4);
    }
}
