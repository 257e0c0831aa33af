use burn::tensor::{backend::Backend, Data, ElementConversion, Int, Shape, Tensor};

/// Pad (or truncate) token sequences to a fixed length, keeping the end of each sequence.
///
/// Padding and truncation both happen at the front, so the last tokens of a long text
/// always survive and short texts are right-aligned against the padding value.
pub fn pad_sequences(pad_token: usize, tokens_list: &[Vec<usize>], seq_length: usize) -> Vec<usize> {
    let mut padded = vec![pad_token; tokens_list.len() * seq_length];

    for (index, tokens) in tokens_list.iter().enumerate() {
        let kept = &tokens[tokens.len().saturating_sub(seq_length)..];
        let row_end = (index + 1) * seq_length;

        padded[row_end - kept.len()..row_end].copy_from_slice(kept);
    }

    padded
}

/// Generate a padded `[batch_size, seq_length]` token tensor
pub fn pad_to<B: Backend>(
    pad_token: usize,
    tokens_list: &[Vec<usize>],
    seq_length: usize,
    device: &B::Device,
) -> Tensor<B, 2, Int> {
    let batch_size = tokens_list.len();
    let padded = pad_sequences(pad_token, tokens_list, seq_length);

    Tensor::from_data(
        Data::new(
            padded
                .into_iter()
                .map(|e| (e as i64).elem::<B::IntElem>())
                .collect(),
            Shape::new([batch_size, seq_length]),
        ),
        device,
    )
}

/// Build a `[rows, cols]` float tensor from row-major values
pub fn float_matrix<B: Backend>(
    values: Vec<f32>,
    rows: usize,
    cols: usize,
    device: &B::Device,
) -> Tensor<B, 2> {
    Tensor::from_data(
        Data::new(
            values.into_iter().map(|v| v.elem::<B::FloatElem>()).collect(),
            Shape::new([rows, cols]),
        ),
        device,
    )
}

/// Index tensor walking a dimension of the given length backwards
pub fn reversed_indices<B: Backend>(length: usize, device: &B::Device) -> Tensor<B, 1, Int> {
    Tensor::from_data(
        Data::new(
            (0..length)
                .rev()
                .map(|i| (i as i64).elem::<B::IntElem>())
                .collect(),
            Shape::new([length]),
        ),
        device,
    )
}

/// Copy a 2D tensor into row vectors
pub fn to_rows<B: Backend>(tensor: Tensor<B, 2>) -> Vec<Vec<f32>> {
    let [_rows, cols] = tensor.dims();
    let values = tensor.into_data().convert::<f32>().value;

    if cols == 0 {
        return Vec::new();
    }

    values.chunks(cols).map(|row| row.to_vec()).collect()
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;
    use pretty_assertions::assert_eq;

    use super::*;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_pad_sequences_pads_and_truncates_at_the_front() {
        let padded = pad_sequences(0, &[vec![1, 2], vec![3, 4, 5, 6, 7], vec![]], 4);

        assert_eq!(padded, vec![0, 0, 1, 2, 4, 5, 6, 7, 0, 0, 0, 0]);
    }

    #[test]
    fn test_pad_to_builds_tensor() {
        let device = Default::default();
        let tensor = pad_to::<TestBackend>(0, &[vec![9], vec![1, 2, 3]], 3, &device);

        assert_eq!(tensor.dims(), [2, 3]);
        assert_eq!(
            tensor.into_data().convert::<i64>().value,
            vec![0, 0, 9, 1, 2, 3]
        );
    }

    #[test]
    fn test_to_rows_round_trips_matrix_layout() {
        let device = Default::default();
        let tensor = float_matrix::<TestBackend>(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3, &device);

        assert_eq!(
            to_rows(tensor),
            vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]
        );
    }

    #[test]
    fn test_reversed_indices() {
        let device = Default::default();
        let indices = reversed_indices::<TestBackend>(4, &device);

        assert_eq!(indices.into_data().convert::<i64>().value, vec![3, 2, 1, 0]);
    }
}
