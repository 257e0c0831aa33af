use std::fmt::Display;

/// Convolutional network over word embeddings
pub static CNN: &str = "cnn";

/// Bidirectional LSTM over word embeddings
pub static LSTM: &str = "lstm";

/// Pooled embeddings through a stack of dense layers
pub static DENSE: &str = "dense";

/// The LSTM, CNN and dense branches merged
pub static CONCAT: &str = "concat";

/// All available architectures
pub static ALL_ARCHITECTURES: &[&str; 4] = &[CNN, LSTM, DENSE, CONCAT];

/// Available Architectures
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Architecture {
    /// See [`crate::models::cnn`]
    Cnn,

    /// See [`crate::models::lstm`]
    Lstm,

    /// See [`crate::models::dense`]
    Dense,

    /// See [`crate::models::concat`]
    Concat,
}

impl TryFrom<&str> for Architecture {
    type Error = ArchitectureError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            v if v == CNN => Ok(Architecture::Cnn),
            v if v == LSTM => Ok(Architecture::Lstm),
            v if v == DENSE => Ok(Architecture::Dense),
            v if v == CONCAT => Ok(Architecture::Concat),
            _ => Err(ArchitectureError::Unknown(value.to_string())),
        }
    }
}

impl Display for Architecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Architecture::Cnn => CNN,
            Architecture::Lstm => LSTM,
            Architecture::Dense => DENSE,
            Architecture::Concat => CONCAT,
        };

        write!(f, "{}", name)
    }
}

/// Architecture Error
#[derive(thiserror::Error, Debug)]
pub enum ArchitectureError {
    /// No architecture found for the given string
    #[error("no architecture found for {0}, expected one of {:?}", ALL_ARCHITECTURES)]
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_names_round_trip() {
        for name in ALL_ARCHITECTURES {
            let architecture = Architecture::try_from(*name).unwrap();

            assert_eq!(architecture.to_string(), *name);
        }
    }

    #[test]
    fn test_unknown_architecture() {
        let error = Architecture::try_from("bert").unwrap_err();

        assert_eq!(
            error.to_string(),
            "no architecture found for bert, expected one of [\"cnn\", \"lstm\", \"dense\", \"concat\"]"
        );
    }
}
