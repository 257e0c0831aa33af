use std::fmt::Display;

use crate::datasets::jigsaw;

/// The Dataset enum
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Dataset {
    /// Jigsaw toxic comment dataset
    Jigsaw,
}

impl Dataset {
    /// Class labels, in target order
    pub fn labels(&self) -> Vec<String> {
        match self {
            Dataset::Jigsaw => jigsaw::LABELS.iter().map(|l| l.to_string()).collect(),
        }
    }
}

impl TryFrom<&str> for Dataset {
    type Error = DatasetError;

    /// Try to convert a string to a Dataset
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value.to_lowercase() == jigsaw::DATASET {
            Ok(Dataset::Jigsaw)
        } else {
            Err(Self::Error::Unknown(value.to_string()))
        }
    }
}

impl Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Dataset::Jigsaw => jigsaw::DATASET,
        };

        write!(f, "{}", name)
    }
}

/// Dataset Error
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    /// No dataset found for the given string
    #[error("no dataset found for {0}")]
    Unknown(String),
}
