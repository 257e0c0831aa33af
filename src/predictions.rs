use std::{io, path::Path};

/// The name of the index column in written frames
pub static INDEX_COLUMN: &str = "id";

/// Prediction frame errors
#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    /// A column must have one value per row
    #[error("expected {expected} rows, found {found}")]
    RowMismatch {
        /// Rows in the frame
        expected: usize,
        /// Rows supplied
        found: usize,
    },

    /// Every label needs a prediction column
    #[error("row {row} has {found} predictions for {expected} labels")]
    MissingColumns {
        /// The offending row
        row: usize,
        /// Number of labels
        expected: usize,
        /// Predictions in the row
        found: usize,
    },

    /// Writing the frame failed
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Flushing the frame failed
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Named `f32` columns over a string row index, in insertion order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PredictionFrame {
    ids: Vec<String>,
    columns: Vec<(String, Vec<f32>)>,
}

impl PredictionFrame {
    /// An empty frame over the given row ids
    pub fn new(ids: Vec<String>) -> Self {
        Self {
            ids,
            columns: Vec::new(),
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the frame has no rows
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Column names, in order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&[f32]> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Add a column, or replace the values of an existing one in place
    pub fn insert(&mut self, name: &str, values: Vec<f32>) -> Result<(), FrameError> {
        if values.len() != self.len() {
            return Err(FrameError::RowMismatch {
                expected: self.len(),
                found: values.len(),
            });
        }

        match self.columns.iter_mut().find(|(column, _)| column == name) {
            Some((_, existing)) => *existing = values,
            None => self.columns.push((name.to_string(), values)),
        }

        Ok(())
    }

    /// Write the frame as CSV, index column first
    pub fn to_writer<W: io::Write>(&self, writer: W) -> Result<(), FrameError> {
        let mut writer = csv::Writer::from_writer(writer);

        writer.write_record(
            std::iter::once(INDEX_COLUMN).chain(self.columns.iter().map(|(name, _)| name.as_str())),
        )?;

        for (row, id) in self.ids.iter().enumerate() {
            let values = self.columns.iter().map(|(_, values)| values[row].to_string());

            writer.write_record(std::iter::once(id.clone()).chain(values))?;
        }

        writer.flush()?;

        Ok(())
    }

    /// Write the frame to a CSV file
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), FrameError> {
        let file = std::fs::File::create(path)?;

        self.to_writer(file)
    }
}

/// Store column `i` of `predictions` under `target_labels[i]`, prefixed with
/// `"{additional_name}_"` when a name is given.
///
/// Nothing is written unless every row has a prediction for every label.
pub fn save_predictions<S: AsRef<str>>(
    frame: &mut PredictionFrame,
    predictions: &[Vec<f32>],
    target_labels: &[S],
    additional_name: Option<&str>,
) -> Result<(), FrameError> {
    if predictions.len() != frame.len() {
        return Err(FrameError::RowMismatch {
            expected: frame.len(),
            found: predictions.len(),
        });
    }

    if let Some((row, values)) = predictions
        .iter()
        .enumerate()
        .find(|(_, values)| values.len() < target_labels.len())
    {
        return Err(FrameError::MissingColumns {
            row,
            expected: target_labels.len(),
            found: values.len(),
        });
    }

    for (i, label) in target_labels.iter().enumerate() {
        let name = match additional_name {
            Some(prefix) => format!("{}_{}", prefix, label.as_ref()),
            None => label.as_ref().to_string(),
        };

        frame.insert(&name, predictions.iter().map(|row| row[i]).collect())?;
    }

    Ok(())
}
