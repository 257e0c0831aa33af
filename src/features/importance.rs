use std::cmp::Ordering;

use burn::{nn::Linear, tensor::backend::Backend};

use super::{FeatureError, TfidfVectorizer};

/// A linear model with one coefficient per input feature for its first class
pub trait LinearClassifier {
    /// First-class coefficients, in feature order
    fn coefficients(&self) -> Vec<f64>;
}

impl LinearClassifier for [f64] {
    fn coefficients(&self) -> Vec<f64> {
        self.to_vec()
    }
}

impl LinearClassifier for Vec<f64> {
    fn coefficients(&self) -> Vec<f64> {
        self.clone()
    }
}

/// Weights are stored `[d_input, d_output]`, so the first class is column 0
impl<B: Backend> LinearClassifier for Linear<B> {
    fn coefficients(&self) -> Vec<f64> {
        let weight = self.weight.val();
        let [d_input, _] = weight.dims();

        weight
            .slice([0..d_input, 0..1])
            .into_data()
            .convert::<f64>()
            .value
    }
}

/// A feature and its coefficient
pub type WeightedFeature = (f64, String);

/// The features pulling hardest in each direction
#[derive(Clone, Debug, PartialEq)]
pub struct InformativeFeatures {
    /// Lowest coefficients, ascending
    pub lowest: Vec<WeightedFeature>,

    /// Highest coefficients, descending
    pub highest: Vec<WeightedFeature>,
}

/// Pair each feature name across `vectorizers` with its coefficient and return the `n` most
/// negative and `n` most positive
pub fn most_informative_features<C: LinearClassifier + ?Sized>(
    vectorizers: &[&TfidfVectorizer],
    classifier: &C,
    n: usize,
) -> Result<InformativeFeatures, FeatureError> {
    let mut names = Vec::new();
    for vectorizer in vectorizers {
        names.extend(vectorizer.feature_names()?.iter().cloned());
    }

    let coefficients = classifier.coefficients();
    if coefficients.len() != names.len() {
        return Err(FeatureError::LengthMismatch {
            coefficients: coefficients.len(),
            names: names.len(),
        });
    }

    let mut weighted: Vec<WeightedFeature> = coefficients.into_iter().zip(names).collect();
    weighted.sort_by(|a, b| match a.0.total_cmp(&b.0) {
        Ordering::Equal => a.1.cmp(&b.1),
        order => order,
    });

    Ok(InformativeFeatures {
        lowest: weighted.iter().take(n).cloned().collect(),
        highest: weighted.iter().rev().take(n).cloned().collect(),
    })
}

#[cfg(test)]
mod tests {
    use burn::{backend::NdArray, module::Param};
    use pretty_assertions::assert_eq;

    use crate::{features::TfidfConfig, utils::tensors::float_matrix};

    use super::*;

    type TestBackend = NdArray<f32>;

    fn vectorizer(corpus: &[&str]) -> TfidfVectorizer {
        let mut vectorizer = TfidfConfig::new()
            .with_token_pattern("[a-z]+".to_string())
            .init()
            .unwrap();
        vectorizer.fit(corpus).unwrap();
        vectorizer
    }

    #[test]
    fn test_lowest_and_highest() {
        let words = vectorizer(&["good bad ugly"]);
        let coefficients = vec![-1.0, 2.0, 0.5];

        let features = most_informative_features(&[&words], &coefficients, 1).unwrap();

        assert_eq!(features.lowest, vec![(-1.0, "bad".to_string())]);
        assert_eq!(features.highest, vec![(2.0, "good".to_string())]);
    }

    #[test]
    fn test_names_span_vectorizers_and_ties_sort_by_name() {
        let first = vectorizer(&["zeta"]);
        let second = vectorizer(&["alpha beta"]);

        let features =
            most_informative_features(&[&first, &second], &[0.0, 0.0, 3.0][..], 5).unwrap();

        assert_eq!(
            features.lowest,
            vec![
                (0.0, "alpha".to_string()),
                (0.0, "zeta".to_string()),
                (3.0, "beta".to_string()),
            ]
        );
        assert_eq!(features.highest[0], (3.0, "beta".to_string()));
        assert_eq!(features.highest.len(), 3);
    }

    #[test]
    fn test_length_mismatch() {
        let words = vectorizer(&["one two"]);

        assert!(matches!(
            most_informative_features(&[&words], &vec![1.0], 1),
            Err(FeatureError::LengthMismatch {
                coefficients: 1,
                names: 2
            })
        ));
    }

    #[test]
    fn test_linear_layer_first_class() {
        let device = Default::default();
        let layer = Linear::<TestBackend> {
            weight: Param::from_tensor(float_matrix(
                vec![1.0, 10.0, -2.0, 20.0, 0.5, 30.0],
                3,
                2,
                &device,
            )),
            bias: None,
        };

        assert_eq!(layer.coefficients(), vec![1.0, -2.0, 0.5]);
    }
}
