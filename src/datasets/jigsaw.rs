use async_trait::async_trait;
use burn::data::dataset::{self, Dataset as _, InMemDataset};
use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::pipelines::multi_label;

use super::LoadableDataset;

/// The name of the Jigsaw dataset
pub static DATASET: &str = "jigsaw";

/// Class labels, in the column order of the training file
pub static LABELS: [&str; 6] = [
    "toxic",
    "severe_toxic",
    "obscene",
    "threat",
    "insult",
    "identity_hate",
];

/// A labelled comment
#[derive(Clone, Debug, Serialize, Deserialize, new)]
pub struct Item {
    /// Comment id
    pub id: String,

    /// The text for classification
    pub comment_text: String,

    pub toxic: u8,
    pub severe_toxic: u8,
    pub obscene: u8,
    pub threat: u8,
    pub insult: u8,
    pub identity_hate: u8,
}

impl multi_label::Item for Item {
    fn input(&self) -> &str {
        &self.comment_text
    }

    fn targets(&self) -> Vec<f32> {
        [
            self.toxic,
            self.severe_toxic,
            self.obscene,
            self.threat,
            self.insult,
            self.identity_hate,
        ]
        .iter()
        .map(|&flag| f32::from(flag))
        .collect()
    }
}

/// An unlabelled comment, as found in the test file
#[derive(Clone, Debug, Serialize, Deserialize, new)]
pub struct Comment {
    /// Comment id
    pub id: String,

    /// The text for classification
    pub comment_text: String,
}

/// Struct for the Jigsaw dataset
pub struct Dataset {
    /// Underlying In-Memory dataset
    dataset: InMemDataset<Item>,
}

/// Implement the Dataset trait for the Jigsaw dataset
impl dataset::Dataset<Item> for Dataset {
    /// Returns a specific item from the dataset
    fn get(&self, index: usize) -> Option<Item> {
        self.dataset.get(index)
    }

    /// Returns the length of the dataset
    fn len(&self) -> usize {
        self.dataset.len()
    }
}

#[async_trait]
impl LoadableDataset<Item> for Dataset {
    /// Constructs the labelled dataset for a mode (e.g., "train")
    async fn load(data_dir: &str, mode: &str) -> std::io::Result<Self> {
        let path = format!("{}/datasets/{}/{}.csv", data_dir, DATASET, mode);
        let reader = csv::ReaderBuilder::new();

        log::info!("Loading {}", path);

        let dataset: InMemDataset<Item> = InMemDataset::from_csv(path, &reader)?;

        Ok(Self { dataset })
    }
}

impl Dataset {
    /// All comment texts, in file order
    pub fn texts(&self) -> Vec<String> {
        self.dataset.iter().map(|item| item.comment_text).collect()
    }
}

/// Read the unlabelled comments of a mode (e.g., "test")
pub fn load_comments(data_dir: &str, mode: &str) -> anyhow::Result<Vec<Comment>> {
    let path = format!("{}/datasets/{}/{}.csv", data_dir, DATASET, mode);
    let mut reader = csv::Reader::from_path(&path)
        .map_err(|e| anyhow!("Unable to open {}: {}", path, e))?;

    let comments = reader.deserialize().collect::<Result<Vec<Comment>, _>>()?;

    log::info!("Loaded {} comments from {}", comments.len(), path);

    Ok(comments)
}

#[cfg(test)]
mod tests {
    use burn::data::dataset::Dataset as _;
    use pretty_assertions::assert_eq;

    use crate::pipelines::multi_label::Item as _;

    use super::*;

    const TRAIN: &str = "\
id,comment_text,toxic,severe_toxic,obscene,threat,insult,identity_hate
a1,\"You are, frankly,
wonderful\",0,0,0,0,0,0
b2,Go away,1,0,0,0,1,0
";

    fn data_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let dataset_dir = dir.path().join("datasets").join(DATASET);

        std::fs::create_dir_all(&dataset_dir).unwrap();
        std::fs::write(dataset_dir.join("train.csv"), TRAIN).unwrap();
        std::fs::write(
            dataset_dir.join("test.csv"),
            "id,comment_text\nc3,hello there\n",
        )
        .unwrap();

        dir
    }

    #[tokio::test]
    async fn test_load_labelled_comments() {
        let dir = data_dir();
        let dataset = Dataset::load(dir.path().to_str().unwrap(), "train")
            .await
            .unwrap();

        assert_eq!(dataset.len(), 2);

        let item = dataset.get(1).unwrap();
        assert_eq!(item.input(), "Go away");
        assert_eq!(item.targets(), vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(
            dataset.texts()[0],
            "You are, frankly,\nwonderful".to_string()
        );
    }

    #[test]
    fn test_load_unlabelled_comments() {
        let dir = data_dir();
        let comments = load_comments(dir.path().to_str().unwrap(), "test").unwrap();

        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].id, "c3");
        assert_eq!(comments[0].comment_text, "hello there");
    }
}
