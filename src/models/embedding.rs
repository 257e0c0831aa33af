use std::path::Path;

use burn::{
    module::{Module, Param},
    nn::Embedding,
    tensor::backend::Backend,
};

use crate::{
    utils::{files::line_reader, tensors::float_matrix},
    vocabulary::Vocabulary,
};

/// A dense `[rows, dim]` matrix of pretrained word vectors, row `i` belonging to word index `i`
#[derive(Clone, Debug, PartialEq)]
pub struct EmbeddingMatrix {
    weights: Vec<f32>,
    rows: usize,
    dim: usize,
}

/// Embedding Error
#[derive(thiserror::Error, Debug)]
pub enum EmbeddingError {
    /// The weight buffer does not match the declared shape
    #[error("expected {expected} weights for the embedding matrix, found {found}")]
    Shape {
        /// rows * dim
        expected: usize,
        /// Length of the buffer
        found: usize,
    },

    /// A word vector has a different dimension from the ones before it
    #[error("word vector for {word:?} has {found} components, expected {expected}")]
    Dimension {
        /// The offending word
        word: String,
        /// The dimension of the first vector in the file
        expected: usize,
        /// The dimension of this vector
        found: usize,
    },

    /// A component could not be parsed as a float
    #[error("invalid component in word vector for {word:?}: {source}")]
    Parse {
        /// The offending word
        word: String,
        /// Underlying parse error
        source: std::num::ParseFloatError,
    },

    /// The file contains no word vectors
    #[error("no word vectors found")]
    Empty,

    /// Reading the file failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EmbeddingMatrix {
    /// Wrap row-major weights
    pub fn new(weights: Vec<f32>, rows: usize, dim: usize) -> Result<Self, EmbeddingError> {
        if weights.len() != rows * dim {
            return Err(EmbeddingError::Shape {
                expected: rows * dim,
                found: weights.len(),
            });
        }

        Ok(Self { weights, rows, dim })
    }

    /// An all-zero matrix, used as the placeholder before a trained record is loaded
    pub fn zeros(rows: usize, dim: usize) -> Self {
        Self {
            weights: vec![0.0; rows * dim],
            rows,
            dim,
        }
    }

    /// Read a GloVe / fastText style text file and keep the vectors of known words.
    ///
    /// Each line is `word v1 v2 ... vd`. A leading `count dim` header line is skipped. Rows
    /// for words missing from the file, and the padding row, stay zero.
    pub async fn from_word_vectors(
        path: impl AsRef<Path>,
        vocabulary: &Vocabulary,
    ) -> Result<Self, EmbeddingError> {
        let rows = vocabulary.embedding_rows();
        let mut lines = line_reader(path).await?;

        let mut dim = None;
        let mut weights = Vec::new();
        let mut found = 0;

        while let Some(line) = lines.next_line().await? {
            let mut parts = line.trim_end().split(' ');
            let word = match parts.next() {
                Some(word) if !word.is_empty() => word,
                _ => continue,
            };
            let components: Vec<&str> = parts.collect();

            // fastText header
            if dim.is_none() && components.len() == 1 {
                continue;
            }

            let expected = *dim.get_or_insert_with(|| {
                weights = vec![0.0; rows * components.len()];
                components.len()
            });

            if components.len() != expected {
                return Err(EmbeddingError::Dimension {
                    word: word.to_string(),
                    expected,
                    found: components.len(),
                });
            }

            let index = match vocabulary.index(word) {
                Some(index) if index < rows => index,
                _ => continue,
            };

            for (j, component) in components.iter().enumerate() {
                weights[index * expected + j] =
                    component.parse().map_err(|source| EmbeddingError::Parse {
                        word: word.to_string(),
                        source,
                    })?;
            }

            found += 1;
        }

        let dim = dim.ok_or(EmbeddingError::Empty)?;

        log::info!(
            "Loaded {} of {} word vectors ({} dimensions)",
            found,
            rows.saturating_sub(1),
            dim
        );

        Self::new(weights, rows, dim)
    }

    /// Number of rows (vocabulary size, padding included)
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Vector dimension
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The vector for a word index
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        (index < self.rows).then(|| &self.weights[index * self.dim..(index + 1) * self.dim])
    }

    /// Build a Burn embedding layer initialised with these weights, frozen unless `trainable`
    pub fn init<B: Backend>(&self, trainable: bool, device: &B::Device) -> Embedding<B> {
        let weight = float_matrix::<B>(self.weights.clone(), self.rows, self.dim, device);

        let embedding = Embedding {
            weight: Param::from_tensor(weight),
        };

        if trainable {
            embedding
        } else {
            embedding.no_grad()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use burn::backend::NdArray;
    use pretty_assertions::assert_eq;

    use super::*;

    type TestBackend = NdArray<f32>;

    fn vectors_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_from_word_vectors_fills_known_words() {
        let vocab = Vocabulary::fit(&["cat cat dog"], None);
        let file = vectors_file("3 2\ncat 0.5 1.5\nbird 9 9\ndog -1 2\n");

        let matrix = EmbeddingMatrix::from_word_vectors(file.path(), &vocab)
            .await
            .unwrap();

        assert_eq!(matrix.rows(), 3);
        assert_eq!(matrix.dim(), 2);
        assert_eq!(matrix.row(0), Some(&[0.0, 0.0][..]));
        assert_eq!(matrix.row(1), Some(&[0.5, 1.5][..]));
        assert_eq!(matrix.row(2), Some(&[-1.0, 2.0][..]));
    }

    #[tokio::test]
    async fn test_from_word_vectors_stops_at_num_words() {
        // cat = 1, dog = 2, but only two rows are kept
        let vocab = Vocabulary::fit(&["cat cat dog"], Some(2));
        let file = vectors_file("cat 0.5 1.5\ndog -1 2\n");

        let matrix = EmbeddingMatrix::from_word_vectors(file.path(), &vocab)
            .await
            .unwrap();

        assert_eq!(matrix.rows(), 2);
        assert_eq!(matrix.row(1), Some(&[0.5, 1.5][..]));
        assert_eq!(matrix.row(2), None);
    }

    #[tokio::test]
    async fn test_from_word_vectors_rejects_ragged_rows() {
        let vocab = Vocabulary::fit(&["cat dog"], None);
        let file = vectors_file("cat 0.5 1.5\ndog 1\n");

        let result = EmbeddingMatrix::from_word_vectors(file.path(), &vocab).await;

        assert!(matches!(result, Err(EmbeddingError::Dimension { .. })));
    }

    #[test]
    fn test_new_checks_shape() {
        assert!(EmbeddingMatrix::new(vec![0.0; 5], 2, 3).is_err());
        assert!(EmbeddingMatrix::new(vec![0.0; 6], 2, 3).is_ok());
    }

    #[test]
    fn test_init_copies_weights() {
        let device = Default::default();
        let matrix = EmbeddingMatrix::new(vec![1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();

        let embedding = matrix.init::<TestBackend>(false, &device);

        assert_eq!(
            embedding.weight.val().into_data().convert::<f32>().value,
            vec![1.0, 2.0, 3.0, 4.0]
        );
    }
}
