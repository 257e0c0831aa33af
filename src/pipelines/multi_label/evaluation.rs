use std::cmp::Ordering;

use burn::{
    data::{dataloader::batcher::Batcher as _, dataset::Dataset},
    tensor::backend::Backend,
};

use crate::utils::tensors::to_rows;

use super::{Batcher, Classifier, Infer, Item};

/// Per-label and mean ROC AUC over a labelled dataset
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    /// ROC AUC for each label, `None` where the label has only one class in the data
    pub per_label: Vec<Option<f64>>,
}

impl Evaluation {
    /// Mean over the labels that have an AUC
    pub fn mean(&self) -> Option<f64> {
        let scores: Vec<f64> = self.per_label.iter().flatten().copied().collect();

        (!scores.is_empty()).then(|| scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

/// Area under the ROC curve, via the rank statistic with ties sharing their average rank.
///
/// Returns `None` unless both classes are present.
pub fn roc_auc(scores: &[f32], labels: &[f32]) -> Option<f64> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[a]
            .partial_cmp(&scores[b])
            .unwrap_or(Ordering::Equal)
    });

    let mut ranks = vec![0.0; scores.len()];
    let mut start = 0;

    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }

        // Ranks are 1-based
        let rank = (start + end + 1) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = rank;
        }

        start = end;
    }

    let positives = labels.iter().filter(|&&label| label > 0.5).count();
    let negatives = labels.len() - positives;

    if positives == 0 || negatives == 0 {
        return None;
    }

    let positive_ranks: f64 = ranks
        .iter()
        .zip(labels)
        .filter(|(_, label)| **label > 0.5)
        .map(|(rank, _)| rank)
        .sum();

    let positives = positives as f64;

    Some((positive_ranks - positives * (positives + 1.0) / 2.0) / (positives * negatives as f64))
}

/// Column-wise ROC AUC for row-major predictions and targets
pub fn column_auc(predictions: &[Vec<f32>], targets: &[Vec<f32>]) -> Evaluation {
    let num_classes = targets.first().map_or(0, Vec::len);

    let per_label = (0..num_classes)
        .map(|class| {
            let scores: Vec<f32> = predictions.iter().map(|row| row[class]).collect();
            let labels: Vec<f32> = targets.iter().map(|row| row[class]).collect();

            roc_auc(&scores, &labels)
        })
        .collect();

    Evaluation { per_label }
}

/// Run the model over a labelled dataset and score its predictions
pub fn evaluate<B, M, I, D>(model: &M, batcher: &Batcher<B>, dataset: &D, batch_size: usize) -> Evaluation
where
    B: Backend,
    M: Classifier<B>,
    I: Item,
    D: Dataset<I>,
{
    let items: Vec<I> = (0..dataset.len()).filter_map(|i| dataset.get(i)).collect();

    let mut predictions = Vec::with_capacity(items.len());
    let mut targets = Vec::with_capacity(items.len());

    for chunk in items.chunks(batch_size.max(1)) {
        let inputs = chunk.iter().map(|item| item.input().to_string()).collect();
        let batch: Infer<B> = batcher.batch(inputs);

        predictions.extend(to_rows(model.infer(batch)));
        targets.extend(chunk.iter().map(Item::targets));
    }

    column_auc(&predictions, &targets)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_roc_auc_perfect_and_inverted() {
        let labels = [0.0, 0.0, 1.0, 1.0];

        assert_eq!(roc_auc(&[0.1, 0.2, 0.8, 0.9], &labels), Some(1.0));
        assert_eq!(roc_auc(&[0.9, 0.8, 0.2, 0.1], &labels), Some(0.0));
    }

    #[test]
    fn test_roc_auc_with_ties() {
        // 3 of the 4 positive/negative pairs are ordered correctly
        assert_eq!(
            roc_auc(&[0.1, 0.4, 0.35, 0.8], &[0.0, 0.0, 1.0, 1.0]),
            Some(0.75)
        );
        assert_eq!(roc_auc(&[0.5, 0.5], &[0.0, 1.0]), Some(0.5));
    }

    #[test]
    fn test_roc_auc_single_class() {
        assert_eq!(roc_auc(&[0.1, 0.2], &[1.0, 1.0]), None);
    }

    #[test]
    fn test_column_auc_mean_skips_undefined_labels() {
        let predictions = vec![vec![0.1, 0.5], vec![0.9, 0.5]];
        let targets = vec![vec![0.0, 0.0], vec![1.0, 0.0]];

        let evaluation = column_auc(&predictions, &targets);

        assert_eq!(evaluation.per_label, vec![Some(1.0), None]);
        assert_eq!(evaluation.mean(), Some(1.0));
    }
}
